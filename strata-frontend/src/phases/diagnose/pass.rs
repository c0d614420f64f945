//! Diagnostic pass trait for lowered IR.

use strata_ir::IrModule;

use crate::Diagnostic;

/// Information about a diagnostic pass.
#[derive(Debug, Clone)]
pub struct PassInfo {
    /// The pass name.
    pub name: &'static str,
    /// A human-readable description.
    pub description: &'static str,
}

/// A pass that inspects the lowered module for issues.
pub trait DiagnosticPass: Send + Sync {
    /// The name of this pass.
    fn name(&self) -> &'static str;

    /// A human-readable description of what this pass checks.
    fn description(&self) -> &'static str;

    /// Check the module and add any diagnostics.
    fn check(&self, module: &IrModule, diagnostics: &mut Vec<Diagnostic>);

    /// Get information about this pass.
    fn info(&self) -> PassInfo {
        PassInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
