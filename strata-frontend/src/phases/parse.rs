//! Parse phase - turns every source file into a source unit.

use eyre::Result;
use strata_syntax::parse_str;

use crate::{CompilerInstance, Diagnostic, DiagnosticLocation, Phase, phase::fail_on_errors};

/// Phase that parses all inputs.
///
/// Every file is parsed even when an earlier one fails, so one run reports
/// the first syntax error of each file.
pub struct ParsePhase;

impl Phase for ParsePhase {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn description(&self) -> &'static str {
        "Parse source files into syntax trees"
    }

    fn run(&self, instance: &mut CompilerInstance) -> Result<()> {
        let ctx = &mut *instance.context;

        for source in &ctx.sources {
            match parse_str(source.text(), source.name()) {
                Ok(unit) => ctx.units.push(unit),
                Err(err) => ctx.diagnostics.push(
                    Diagnostic::error(self.name(), err.to_string())
                        .at(DiagnosticLocation::in_source(source, err.offset())),
                ),
            }
        }

        fail_on_errors(self.name(), ctx)
    }
}
