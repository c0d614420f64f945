//! Diagnose phase - runs diagnostic passes over the lowered module.

mod pass;
pub mod passes;

use eyre::{Result, eyre};
pub use pass::{DiagnosticPass, PassInfo};
pub use passes::{DivisionByZeroPass, InfiniteRecursionPass, UnusedFunctionPass};

use crate::{CompilerInstance, Phase, phase::fail_on_errors};

/// Phase that checks the lowered module using configurable passes.
pub struct DiagnosePhase {
    passes: Vec<Box<dyn DiagnosticPass>>,
}

impl DiagnosePhase {
    /// Create a new diagnose phase with the built-in passes.
    pub fn new() -> Self {
        Self {
            passes: vec![
                Box::new(DivisionByZeroPass),
                Box::new(InfiniteRecursionPass),
                Box::new(UnusedFunctionPass),
            ],
        }
    }

    /// Create a diagnose phase with no passes.
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    /// Add a custom pass to the phase.
    pub fn with_pass(mut self, pass: impl DiagnosticPass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Get information about all passes that will be run.
    pub fn pass_info(&self) -> Vec<PassInfo> {
        self.passes.iter().map(|p| p.info()).collect()
    }
}

impl Default for DiagnosePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for DiagnosePhase {
    fn name(&self) -> &'static str {
        "diagnose"
    }

    fn description(&self) -> &'static str {
        "Run diagnostic passes over the lowered IR"
    }

    fn run(&self, instance: &mut CompilerInstance) -> Result<()> {
        let module = instance
            .module
            .as_ref()
            .ok_or_else(|| eyre!("no lowered module to diagnose"))?;
        let ctx = &mut *instance.context;

        for pass in &self.passes {
            pass.check(module, &mut ctx.diagnostics);
        }

        // Fail if there are any errors (warnings are allowed)
        fail_on_errors(self.name(), ctx)
    }
}
