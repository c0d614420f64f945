//! Pipeline phase trait.

use eyre::Result;
use thiserror::Error;

use crate::{CompilerInstance, Diagnostic, context::CompilationContext};

/// Information about a pipeline phase.
#[derive(Debug, Clone)]
pub struct PhaseInfo {
    /// The phase name.
    pub name: &'static str,
    /// A human-readable description.
    pub description: &'static str,
}

/// A phase in the compilation pipeline.
///
/// Phases are executed in order by the [`Frontend`](crate::Frontend). Each
/// phase can read and modify the compiler instance, adding to the context,
/// the lowered module, the artifacts or the diagnostics.
///
/// Built-in phases:
/// - `ParsePhase` - parses every source file
/// - `SemaPhase` - resolves names and checks types
/// - `LowerPhase` - lowers checked declarations to IR
/// - `DiagnosePhase` - runs diagnostic passes over the IR
/// - `EmitPhase` - renders and writes the output artifact
pub trait Phase: Send + Sync {
    /// The name of this phase (used in diagnostics and logs).
    fn name(&self) -> &'static str;

    /// A human-readable description of what this phase does.
    fn description(&self) -> &'static str;

    /// Run this phase on the compiler instance.
    ///
    /// # Errors
    ///
    /// Returns a [`StageFailure`] when the phase recorded error diagnostics,
    /// or any other error if the phase fails fatally.
    fn run(&self, instance: &mut CompilerInstance) -> Result<()>;

    /// Get information about this phase.
    fn info(&self) -> PhaseInfo {
        PhaseInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}

/// A phase that recorded at least one error.
///
/// Carried inside the `eyre::Report` returned by a failed run; recover it
/// with `report.downcast_ref::<StageFailure>()`.
#[derive(Debug, Error)]
#[error("{stage} failed with {error_count} error(s)")]
pub struct StageFailure {
    /// Name of the failing phase.
    pub stage: &'static str,
    /// Every diagnostic collected up to the failure.
    pub diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl StageFailure {
    pub fn new(stage: &'static str, diagnostics: Vec<Diagnostic>) -> Self {
        let error_count = diagnostics.iter().filter(|d| d.severity.is_error()).count();
        Self {
            stage,
            diagnostics,
            error_count,
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_error())
    }
}

/// Fail `stage` when the context holds error diagnostics (warnings are allowed).
pub(crate) fn fail_on_errors(stage: &'static str, ctx: &CompilationContext) -> Result<()> {
    if ctx.has_errors() {
        return Err(StageFailure::new(stage, ctx.diagnostics.clone()).into());
    }
    Ok(())
}
