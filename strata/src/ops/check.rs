//! Check operation - type checking without lowering.

use eyre::Result;
use strata_config::FrontendOptions;
use strata_core::SourceFile;
use strata_frontend::{Frontend, StageFailure};

use super::Messages;
use crate::reports::{CheckReport, DeclInfo};

/// Execute the check operation.
///
/// Runs the frontend up to semantic analysis with the context retained, so
/// the report can list every checked declaration. Stage failures become part
/// of the report; any other error is returned.
pub fn check(mut options: FrontendOptions, sources: Vec<SourceFile>) -> Result<CheckReport> {
    options.retain_context = true;
    let module_name = options.module_name.clone();

    let outcome = match Frontend::new(options).run(sources) {
        Ok(outcome) => outcome,
        Err(err) => {
            let failure = err.downcast::<StageFailure>()?;
            return Ok(CheckReport {
                module_name,
                messages: Messages::collect(&failure.diagnostics),
                declarations: Vec::new(),
            });
        }
    };

    let declarations = outcome
        .context()
        .map(|ctx| {
            ctx.decls
                .values()
                .map(|decl| DeclInfo {
                    name: decl.name.clone(),
                    ty: ctx.types.display(decl.ty),
                    location: decl.location.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(CheckReport {
        module_name,
        messages: Messages::collect(&outcome.diagnostics),
        declarations,
    })
}
