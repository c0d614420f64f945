use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::token::{Span, TokenKind};

/// Result type for syntax operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the source content and filename, reducing parameter passing
/// in error factory functions.
///
/// # Example
///
/// ```ignore
/// let ctx = SourceContext::new(content, "main.st");
/// ctx.unexpected_character('$', span);
/// ctx.unexpected_token("';'", &TokenKind::Eof, span);
/// ```
#[derive(Debug, Clone)]
pub struct SourceContext<'a> {
    src: &'a str,
    filename: &'a str,
}

impl<'a> SourceContext<'a> {
    /// Create a new source context.
    pub fn new(src: &'a str, filename: &'a str) -> Self {
        Self { src, filename }
    }

    /// Get the source content.
    pub fn src(&self) -> &'a str {
        self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &'a str {
        self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename, self.src.to_string())
    }

    /// Create an unexpected character error.
    pub fn unexpected_character(&self, ch: char, span: Span) -> Box<Error> {
        Box::new(Error::UnexpectedCharacter {
            src: self.named_source(),
            span: span.into(),
            ch,
        })
    }

    /// Create an unterminated string error.
    pub fn unterminated_string(&self, span: Span) -> Box<Error> {
        Box::new(Error::UnterminatedString {
            src: self.named_source(),
            span: span.into(),
        })
    }

    /// Create an integer overflow error.
    pub fn integer_overflow(&self, text: impl Into<String>, span: Span) -> Box<Error> {
        Box::new(Error::IntegerOverflow {
            src: self.named_source(),
            span: span.into(),
            text: text.into(),
        })
    }

    /// Create an error for an expression nested deeper than `limit`.
    pub fn nesting_too_deep(&self, limit: usize, span: Span) -> Box<Error> {
        Box::new(Error::NestingTooDeep {
            src: self.named_source(),
            span: span.into(),
            limit,
        })
    }

    /// Create an unexpected token error.
    pub fn unexpected_token(
        &self,
        expected: impl Into<String>,
        found: &TokenKind,
        span: Span,
    ) -> Box<Error> {
        Box::new(Error::UnexpectedToken {
            src: self.named_source(),
            span: span.into(),
            expected: expected.into(),
            found: found.to_string(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(strata::unexpected_character))]
    UnexpectedCharacter {
        #[source_code]
        src: NamedSource<String>,
        #[label("not valid here")]
        span: SourceSpan,
        ch: char,
    },

    #[error("unterminated string literal")]
    #[diagnostic(
        code(strata::unterminated_string),
        help("close the string with a double quote before the end of the line")
    )]
    UnterminatedString {
        #[source_code]
        src: NamedSource<String>,
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("integer literal '{text}' is out of range")]
    #[diagnostic(
        code(strata::integer_overflow),
        help("integers are signed 64-bit values")
    )]
    IntegerOverflow {
        #[source_code]
        src: NamedSource<String>,
        #[label("too large")]
        span: SourceSpan,
        text: String,
    },

    #[error("expression nesting exceeds the limit of {limit}")]
    #[diagnostic(
        code(strata::nesting_too_deep),
        help("split the expression into several declarations")
    )]
    NestingTooDeep {
        #[source_code]
        src: NamedSource<String>,
        #[label("nested too deeply")]
        span: SourceSpan,
        limit: usize,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(strata::unexpected_token))]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected {expected}")]
        span: SourceSpan,
        expected: String,
        found: String,
    },
}

impl Error {
    /// Byte offset in the source where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            Error::UnexpectedCharacter { span, .. }
            | Error::UnterminatedString { span, .. }
            | Error::IntegerOverflow { span, .. }
            | Error::NestingTooDeep { span, .. }
            | Error::UnexpectedToken { span, .. } => span.offset(),
        }
    }
}
