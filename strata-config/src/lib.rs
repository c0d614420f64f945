//! Configuration of the Strata compiler frontend.
//!
//! [`FrontendOptions`] is the configuration value a single frontend run
//! consumes. It can be built in code or read from the `[frontend]` table of a
//! `strata.toml` file through [`StrataToml`].

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod config;
mod error;
mod file;
mod options;
mod validate;

pub use config::{Config, ModuleConfig, ObserverConfig};
pub use error::{Error, Result};
pub use file::StrataToml;
pub use options::{Action, FrontendOptions};
pub use validate::validate_module_name;
