//! Options for one frontend run.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// What the frontend should produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Stop after semantic analysis.
    Typecheck,
    /// Lower and emit the textual IR (`.sir`).
    #[default]
    EmitIr,
    /// Lower and emit the IR as JSON (`.sir.json`).
    EmitIrJson,
}

impl Action {
    /// Returns the action identifier as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Typecheck => "typecheck",
            Action::EmitIr => "emit-ir",
            Action::EmitIrJson => "emit-ir-json",
        }
    }

    /// Whether the action runs lowering and the lowering diagnostics.
    pub fn lowers(&self) -> bool {
        !matches!(self, Action::Typecheck)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "typecheck" => Ok(Action::Typecheck),
            "emit-ir" | "ir" => Ok(Action::EmitIr),
            "emit-ir-json" | "json" => Ok(Action::EmitIrJson),
            _ => Err(format!(
                "unknown action '{}', expected 'typecheck', 'emit-ir' or 'emit-ir-json'",
                s
            )),
        }
    }
}

/// Configuration of a single frontend run.
///
/// Each run owns its own options; nothing here is process-wide.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontendOptions {
    /// Name of the module being compiled.
    pub module_name: String,
    /// What to produce.
    pub action: Action,
    /// Directory emitted artifacts are written to. Artifacts stay in memory when unset.
    pub output_dir: Option<PathBuf>,
    /// Keep the compilation context alive after compilation and hand it to
    /// the caller instead of freeing it.
    pub retain_context: bool,
    /// Directory to write usage statistics to. Enabling statistics also keeps
    /// the compilation context alive, since the report reads it.
    pub stats_output_dir: Option<PathBuf>,
}

impl Default for FrontendOptions {
    fn default() -> Self {
        Self {
            module_name: "main".to_string(),
            action: Action::default(),
            output_dir: None,
            retain_context: false,
            stats_output_dir: None,
        }
    }
}

impl FrontendOptions {
    /// Whether usage statistics are collected for this run.
    pub fn stats_enabled(&self) -> bool {
        self.stats_output_dir.is_some()
    }
}
