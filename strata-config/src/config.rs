//! Schema and parsing of strata.toml.

use std::{collections::HashSet, path::PathBuf, str::FromStr};

use serde::Deserialize;

use crate::{
    Error, FrontendOptions, Result,
    validate::{find_value_span, validate_module_name},
};

/// Root schema for strata.toml
///
/// ```toml
/// [module]
/// sources = ["src/main.st"]
///
/// [frontend]
/// module_name = "app"
/// action = "emit-ir"
/// output_dir = "build"
/// retain_context = false
/// stats_output_dir = "build/stats"
///
/// [observer]
/// snapshot_dir = ".strata/snapshots"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Inputs of the compilation
    #[serde(default)]
    pub module: ModuleConfig,

    /// Options of the frontend run
    #[serde(default)]
    pub frontend: FrontendOptions,

    /// Built-in observer settings
    #[serde(default)]
    pub observer: ObserverConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    /// Source files, relative to the directory containing strata.toml
    #[serde(default)]
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverConfig {
    /// Directory the snapshot observer writes milestone snapshots to
    pub snapshot_dir: Option<PathBuf>,
}

impl FromStr for Config {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_config(s, "strata.toml")
    }
}

impl Config {
    /// Parse a strata.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_config(content, filename)
    }
}

/// Parse a config from content with the given filename for error reporting.
fn parse_config(content: &str, filename: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).map_err(|e| Error::parse(e, content, filename))?;
    validate_config(&config, content, filename)?;
    Ok(config)
}

/// Validate the config after parsing.
fn validate_config(config: &Config, src: &str, filename: &str) -> Result<()> {
    let name = &config.frontend.module_name;
    if let Some(reason) = validate_module_name(name) {
        return Err(Error::invalid_module_name(
            name,
            reason,
            src,
            filename,
            find_value_span(src, name),
        ));
    }

    let mut seen = HashSet::new();
    for source in &config.module.sources {
        if !seen.insert(source) {
            let shown = source.display().to_string();
            return Err(Error::validation(
                format!("source '{}' is listed more than once", shown),
                src,
                filename,
                find_value_span(src, &shown),
            ));
        }
    }

    Ok(())
}
