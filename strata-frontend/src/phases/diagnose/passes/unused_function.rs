//! Pass for functions nothing calls.

use strata_ir::IrModule;

use super::super::DiagnosticPass;
use crate::{Diagnostic, DiagnosticLocation};

/// Name of the entry point, exempt from the check.
const ENTRY_POINT: &str = "main";

/// Pass that warns about functions never called from another declaration.
pub struct UnusedFunctionPass;

impl DiagnosticPass for UnusedFunctionPass {
    fn name(&self) -> &'static str {
        "unused-function"
    }

    fn description(&self) -> &'static str {
        "Warn about functions that are never called"
    }

    fn check(&self, module: &IrModule, diagnostics: &mut Vec<Diagnostic>) {
        for function in &module.functions {
            if function.name == ENTRY_POINT {
                continue;
            }

            // Self-calls do not count as uses.
            let called = module
                .globals
                .iter()
                .flat_map(|g| g.init.iter())
                .chain(
                    module
                        .functions
                        .iter()
                        .filter(|other| other.name != function.name)
                        .flat_map(|other| other.body.iter()),
                )
                .any(|instr| instr.callee() == Some(function.name.as_str()));

            if !called {
                diagnostics.push(
                    Diagnostic::warning(
                        "diagnose",
                        format!("function '{}' is never called", function.name),
                    )
                    .at(DiagnosticLocation::function(&function.name)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use strata_ir::{Instr, IrFunction, IrType};

    use super::*;

    fn function(name: &str, body: Vec<Instr>) -> IrFunction {
        IrFunction {
            name: name.to_string(),
            params: Vec::new(),
            ret: IrType::I64,
            body,
        }
    }

    fn call(func: &str) -> Instr {
        Instr::Call {
            func: func.to_string(),
            argc: 0,
        }
    }

    #[test]
    fn test_unused_functions() {
        let mut module = IrModule::new("main");
        module
            .functions
            .push(function("main", vec![call("helper"), Instr::Return]));
        module
            .functions
            .push(function("helper", vec![Instr::ConstInt(1), Instr::Return]));
        module
            .functions
            .push(function("loop_forever", vec![call("loop_forever"), Instr::Return]));

        let mut diagnostics = Vec::new();
        UnusedFunctionPass.check(&module, &mut diagnostics);

        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["function 'loop_forever' is never called"]);
    }
}
