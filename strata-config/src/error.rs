use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for configuration operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(
        code(strata::config::io_error),
        help("pass source files on the command line, or create a strata.toml")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse strata.toml")]
    #[diagnostic(code(strata::config::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid module name '{name}'")]
    #[diagnostic(
        code(strata::config::invalid_module_name),
        help("{reason}. Use only letters, numbers, and underscores, starting with a letter or underscore.")
    )]
    InvalidModuleName {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid module name")]
        span: Option<SourceSpan>,
        name: String,
        reason: String,
    },

    #[error("{message}")]
    #[diagnostic(code(strata::config::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },
}

impl Error {
    /// Create a parse error from a toml error with source context
    pub fn parse(source: toml::de::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    /// Create an invalid module name error
    pub fn invalid_module_name(
        name: impl Into<String>,
        reason: impl Into<String>,
        src: &str,
        filename: &str,
        span: Option<SourceSpan>,
    ) -> Box<Self> {
        Box::new(Error::InvalidModuleName {
            src: NamedSource::new(filename, src.to_string()),
            span,
            name: name.into(),
            reason: reason.into(),
        })
    }

    /// Create a validation error with source context
    pub fn validation(
        message: impl Into<String>,
        src: &str,
        filename: &str,
        span: Option<SourceSpan>,
    ) -> Box<Self> {
        Box::new(Error::Validation {
            src: NamedSource::new(filename, src.to_string()),
            span,
            message: message.into(),
        })
    }
}
