//! Core operations.
//!
//! This module contains the business logic for strata commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod compile;
pub mod explain;

pub use check::check;
pub use compile::{CompileRequest, compile};
pub use explain::explain;

use strata_frontend::{Diagnostic, Severity};

/// Diagnostic messages split by severity, with their locations attached.
#[derive(Debug, Default)]
pub struct Messages {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
}

impl Messages {
    pub fn collect<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> Self {
        let mut messages = Self::default();

        for diag in diagnostics {
            let msg = if let Some(loc) = &diag.location {
                format!("{}\n  --> {}", diag.message, loc)
            } else {
                diag.message.clone()
            };

            match diag.severity {
                Severity::Error => messages.errors.push(msg),
                Severity::Warning => messages.warnings.push(msg),
                Severity::Info => messages.infos.push(msg),
            }
        }

        messages
    }
}
