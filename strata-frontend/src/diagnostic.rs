//! Diagnostic types for the compilation pipeline.
//!
//! This module provides types for collecting errors, warnings, and informational
//! messages during compilation phases.

use std::fmt;

use serde::Serialize;
use strata_core::SourceFile;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// An error that makes the current phase fail.
    Error,
    /// A warning that doesn't prevent compilation but should be addressed.
    Warning,
    /// Informational message about the compilation process.
    Info,
}

impl Severity {
    /// Returns true if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns true if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// What a diagnostic points at.
///
/// Phases before lowering point into the sources; the diagnostic passes point
/// at declarations of the lowered module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DiagnosticLocation {
    Source {
        file: String,
        line: usize,
        column: usize,
    },
    Global {
        name: String,
    },
    Function {
        name: String,
    },
}

impl DiagnosticLocation {
    /// The position of byte `offset` in `source`.
    pub fn in_source(source: &SourceFile, offset: usize) -> Self {
        let location = source.location(offset);
        DiagnosticLocation::Source {
            file: source.name().to_string(),
            line: location.line,
            column: location.column,
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        DiagnosticLocation::Global { name: name.into() }
    }

    pub fn function(name: impl Into<String>) -> Self {
        DiagnosticLocation::Function { name: name.into() }
    }
}

impl fmt::Display for DiagnosticLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLocation::Source { file, line, column } => {
                write!(f, "{}:{}:{}", file, line, column)
            }
            DiagnosticLocation::Global { name } => write!(f, "global @{}", name),
            DiagnosticLocation::Function { name } => write!(f, "fn @{}", name),
        }
    }
}

/// A diagnostic message from a compilation phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The phase that produced this diagnostic.
    pub phase: String,
    /// The diagnostic message.
    pub message: String,
    pub location: Option<DiagnosticLocation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            phase: phase.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            phase: phase.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Create a new info diagnostic.
    pub fn info(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            phase: phase.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Add a location to this diagnostic.
    pub fn at(mut self, location: DiagnosticLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}
