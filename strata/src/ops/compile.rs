//! Compile operation - the full frontend run.

use std::path::PathBuf;

use eyre::Result;
use log::info;
use strata_config::FrontendOptions;
use strata_core::SourceFile;
use strata_frontend::{Frontend, SnapshotObserver, StageFailure};

use super::Messages;
use crate::reports::{ArtifactInfo, CompileReport, ContextSummary, Failure};

/// Everything a compile needs.
pub struct CompileRequest {
    pub options: FrontendOptions,
    pub sources: Vec<SourceFile>,
    /// Where the snapshot observer writes, if it is enabled.
    pub snapshot_dir: Option<PathBuf>,
}

/// Execute the compile operation.
///
/// A phase that records errors produces a failed report. Invalid inputs and
/// observer errors are returned as errors.
pub fn compile(request: CompileRequest) -> Result<CompileReport> {
    let CompileRequest {
        options,
        sources,
        snapshot_dir,
    } = request;

    let module_name = options.module_name.clone();
    let mut report = CompileReport::new(&module_name);

    let mut snapshots = snapshot_dir.as_ref().map(SnapshotObserver::with_output_dir);
    let frontend = match snapshots.as_mut() {
        Some(observer) => Frontend::new(options).observer(observer),
        None => Frontend::new(options),
    };

    let result = frontend.run(sources);

    if let (Some(observer), Some(dir)) = (&snapshots, snapshot_dir) {
        report.snapshots = Some((dir, observer.snapshots().len()));
    }

    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            let failure = err.downcast::<StageFailure>()?;
            report.messages = Messages::collect(&failure.diagnostics);
            report.failure = Some(Failure {
                stage: failure.stage,
                error_count: failure.error_count(),
            });
            return Ok(report);
        }
    };

    report.messages = Messages::collect(&outcome.diagnostics);
    report.artifacts = outcome
        .artifacts
        .drain(..)
        .map(|artifact| ArtifactInfo {
            file_name: artifact.file_name,
            path: artifact.path,
            content: artifact.content,
        })
        .collect();
    report.teardown = Some(outcome.teardown);

    report.stats_path = outcome.stats_path.take();

    // The report is the last reader of a retained context.
    if let Some(retained) = outcome.take_context() {
        report.context = Some(ContextSummary {
            declarations: retained.decls.len(),
            functions: retained.functions().count(),
            globals: retained.globals().count(),
            types: retained.types.len(),
        });
        info!("releasing context of module '{}'", module_name);
        drop(retained);
    }

    Ok(report)
}
