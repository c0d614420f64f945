//! Lifecycle observers.

use std::fmt;

use eyre::Result;
use serde::Serialize;
use strata_ir::IrModule;

use crate::CompilerInstance;

/// A point in the pipeline at which one observer hook fires.
///
/// Milestones are ordered; a run reaches them in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Milestone {
    Configured,
    SemanticAnalysis,
    CodeLowering,
    LoweringDiagnostics,
    Compiled,
}

impl Milestone {
    pub const ALL: [Milestone; 5] = [
        Milestone::Configured,
        Milestone::SemanticAnalysis,
        Milestone::CodeLowering,
        Milestone::LoweringDiagnostics,
        Milestone::Compiled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Milestone::Configured => "configured",
            Milestone::SemanticAnalysis => "semantic-analysis",
            Milestone::CodeLowering => "code-lowering",
            Milestone::LoweringDiagnostics => "lowering-diagnostics",
            Milestone::Compiled => "compiled",
        }
    }

    /// Name of the [`FrontendObserver`] method fired at this milestone.
    pub fn hook_name(&self) -> &'static str {
        match self {
            Milestone::Configured => "configured_compiler",
            Milestone::SemanticAnalysis => "performed_semantic_analysis",
            Milestone::CodeLowering => "performed_code_lowering",
            Milestone::LoweringDiagnostics => "performed_lowering_diagnostics",
            Milestone::Compiled => "performed_compilation",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Milestone::Configured => "Options validated and compilation context created",
            Milestone::SemanticAnalysis => "Sources parsed and type-checked",
            Milestone::CodeLowering => "Declarations lowered to IR",
            Milestone::LoweringDiagnostics => "Diagnostic passes ran over the IR",
            Milestone::Compiled => "Compilation finished; context not yet released",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives notifications as a run progresses.
///
/// Every hook has a no-op default. Hooks run synchronously on the calling
/// thread, in milestone order, at most once per run. Returning an error
/// aborts the run.
///
/// # Example
///
/// ```ignore
/// struct DeclCounter(usize);
///
/// impl FrontendObserver for DeclCounter {
///     fn name(&self) -> &'static str { "decl-counter" }
///
///     fn performed_compilation(&mut self, instance: &CompilerInstance) -> Result<()> {
///         self.0 = instance.context().decls.len();
///         Ok(())
///     }
/// }
/// ```
pub trait FrontendObserver {
    /// The name of this observer (for logging and error context).
    fn name(&self) -> &'static str;

    /// Called once the instance is configured, before any phase runs.
    #[allow(unused_variables)]
    fn configured_compiler(&mut self, instance: &CompilerInstance) -> Result<()> {
        Ok(())
    }

    /// Called after parsing and semantic analysis succeeded.
    #[allow(unused_variables)]
    fn performed_semantic_analysis(&mut self, instance: &CompilerInstance) -> Result<()> {
        Ok(())
    }

    /// Called after lowering produced the IR module.
    #[allow(unused_variables)]
    fn performed_code_lowering(&mut self, module: &IrModule) -> Result<()> {
        Ok(())
    }

    /// Called after the diagnostic passes accepted the IR module.
    #[allow(unused_variables)]
    fn performed_lowering_diagnostics(&mut self, module: &IrModule) -> Result<()> {
        Ok(())
    }

    /// Called once compilation succeeded, before the context is released.
    ///
    /// The context is still readable here whether or not it will be retained.
    #[allow(unused_variables)]
    fn performed_compilation(&mut self, instance: &CompilerInstance) -> Result<()> {
        Ok(())
    }
}

/// Observer used when none is registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FrontendObserver for NoopObserver {
    fn name(&self) -> &'static str {
        "noop"
    }
}
