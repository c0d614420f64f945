//! Pass for unconditional self-recursion.

use strata_ir::IrModule;

use super::super::DiagnosticPass;
use crate::{Diagnostic, DiagnosticLocation};

/// Pass that warns about functions calling themselves before any branch.
///
/// Such a call happens on every path through the function, so the function
/// can never return.
pub struct InfiniteRecursionPass;

impl DiagnosticPass for InfiniteRecursionPass {
    fn name(&self) -> &'static str {
        "infinite-recursion"
    }

    fn description(&self) -> &'static str {
        "Warn about functions that recurse on every path"
    }

    fn check(&self, module: &IrModule, diagnostics: &mut Vec<Diagnostic>) {
        for function in &module.functions {
            let recurses = function
                .body
                .iter()
                .take_while(|instr| !instr.is_branch())
                .any(|instr| instr.callee() == Some(function.name.as_str()));

            if recurses {
                diagnostics.push(
                    Diagnostic::warning(
                        "diagnose",
                        format!("function '{}' calls itself on every path", function.name),
                    )
                    .at(DiagnosticLocation::function(&function.name)),
                );
            }
        }
    }
}
