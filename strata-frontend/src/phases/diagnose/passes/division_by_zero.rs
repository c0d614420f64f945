//! Pass for constant division by zero.

use strata_ir::{Instr, IrModule};

use super::super::DiagnosticPass;
use crate::{Diagnostic, DiagnosticLocation};

/// Pass that errors on a division whose divisor is the constant `0`.
pub struct DivisionByZeroPass;

impl DiagnosticPass for DivisionByZeroPass {
    fn name(&self) -> &'static str {
        "division-by-zero"
    }

    fn description(&self) -> &'static str {
        "Reject division by a constant zero"
    }

    fn check(&self, module: &IrModule, diagnostics: &mut Vec<Diagnostic>) {
        let bodies = module
            .globals
            .iter()
            .map(|g| (DiagnosticLocation::global(&g.name), &g.init))
            .chain(
                module
                    .functions
                    .iter()
                    .map(|f| (DiagnosticLocation::function(&f.name), &f.body)),
            );

        for (location, body) in bodies {
            for (index, pair) in body.windows(2).enumerate() {
                if matches!(pair, [Instr::ConstInt(0), Instr::Div]) {
                    diagnostics.push(
                        Diagnostic::error(
                            "diagnose",
                            format!("division by zero at instruction {}", index + 1),
                        )
                        .at(location.clone()),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use strata_ir::{IrFunction, IrGlobal, IrType};

    use super::*;

    #[test]
    fn test_constant_zero_divisor() {
        let mut module = IrModule::new("main");
        module.globals.push(IrGlobal {
            name: "bad".to_string(),
            ty: IrType::I64,
            init: vec![
                Instr::ConstInt(1),
                Instr::ConstInt(0),
                Instr::Div,
                Instr::Return,
            ],
        });
        module.functions.push(IrFunction {
            name: "half".to_string(),
            params: vec![IrType::I64],
            ret: IrType::I64,
            body: vec![
                Instr::LoadLocal(0),
                Instr::ConstInt(2),
                Instr::Div,
                Instr::Return,
            ],
        });

        let mut diagnostics = Vec::new();
        DivisionByZeroPass.check(&module, &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].severity.is_error());
        assert_eq!(diagnostics[0].message, "division by zero at instruction 2");
        assert_eq!(
            diagnostics[0].location,
            Some(DiagnosticLocation::global("bad"))
        );
    }
}
