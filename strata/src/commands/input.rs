use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use log::debug;
use strata_config::{Config, StrataToml};
use strata_core::SourceFile;

use super::UnwrapOrExit;

const DEFAULT_CONFIG: &str = "strata.toml";

/// Where a command reads its sources and configuration from.
#[derive(Args)]
pub struct InputArgs {
    /// Source files (defaults to the sources listed in strata.toml)
    pub files: Vec<PathBuf>,

    /// Path to strata.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Sources and configuration resolved from the command line.
pub struct Inputs {
    pub config: Config,
    pub sources: Vec<SourceFile>,
}

impl InputArgs {
    /// Load the configuration and read every source file.
    ///
    /// Files given on the command line win over `[module] sources`. Without
    /// files, strata.toml is required. Relative paths in the config are
    /// resolved against its directory.
    pub fn load(&self) -> Result<Inputs> {
        let toml = match &self.config {
            Some(path) => Some(StrataToml::open(path).unwrap_or_exit()),
            None if self.files.is_empty() => Some(StrataToml::open(DEFAULT_CONFIG).unwrap_or_exit()),
            None => None,
        };

        let (config, paths) = match &toml {
            Some(toml) => {
                debug!("using config {}", toml.path().display());
                let paths = if self.files.is_empty() {
                    toml.sources()
                } else {
                    self.files.clone()
                };
                (resolve_config(toml), paths)
            }
            None => (Config::default(), self.files.clone()),
        };

        let sources = paths
            .iter()
            .map(SourceFile::read)
            .collect::<Result<Vec<_>>>()?;

        Ok(Inputs { config, sources })
    }
}

/// Rebase the config's output directories onto the config directory.
fn resolve_config(toml: &StrataToml) -> Config {
    let mut config = toml.config().clone();
    let resolve = |path: &mut Option<PathBuf>| {
        if let Some(p) = path.as_deref() {
            *path = Some(toml.resolve(p));
        }
    };
    resolve(&mut config.frontend.output_dir);
    resolve(&mut config.frontend.stats_output_dir);
    resolve(&mut config.observer.snapshot_dir);
    config
}

