//! Compile command report data structures.

use std::path::PathBuf;

use strata_frontend::TeardownDecision;

use super::output::{Output, Report};
use crate::ops::Messages;

/// An emitted artifact.
#[derive(Debug)]
pub struct ArtifactInfo {
    pub file_name: String,
    /// Where it was written; `None` when it stayed in memory.
    pub path: Option<PathBuf>,
    pub content: String,
}

/// The phase that stopped a compile.
#[derive(Debug)]
pub struct Failure {
    pub stage: &'static str,
    pub error_count: usize,
}

/// What a retained context held when the run finished.
#[derive(Debug, Clone, Copy)]
pub struct ContextSummary {
    pub declarations: usize,
    pub functions: usize,
    pub globals: usize,
    pub types: usize,
}

/// Report data from a compile.
#[derive(Debug)]
pub struct CompileReport {
    pub module_name: String,
    pub messages: Messages,
    pub failure: Option<Failure>,
    pub artifacts: Vec<ArtifactInfo>,
    pub teardown: Option<TeardownDecision>,
    pub context: Option<ContextSummary>,
    pub stats_path: Option<PathBuf>,
    /// Snapshot directory and number of snapshots written to it.
    pub snapshots: Option<(PathBuf, usize)>,
}

impl CompileReport {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            messages: Messages::default(),
            failure: None,
            artifacts: Vec::new(),
            teardown: None,
            context: None,
            stats_path: None,
            snapshots: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

impl Report for CompileReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.messages.errors {
            out.error(error);
        }
        for warning in &self.messages.warnings {
            out.warning(warning);
        }

        if let Some(failure) = &self.failure {
            out.error(&format!(
                "could not compile '{}': {} failed with {} error(s)",
                self.module_name, failure.stage, failure.error_count
            ));
            return;
        }

        // In-memory artifacts are printed, written ones are listed.
        let written: Vec<_> = self
            .artifacts
            .iter()
            .filter_map(|a| a.path.as_ref())
            .collect();
        for artifact in self.artifacts.iter().filter(|a| a.path.is_none()) {
            out.divider(&artifact.file_name);
            out.preformatted(artifact.content.trim_end());
        }
        if !written.is_empty() {
            out.section("Wrote");
            for path in written {
                out.added_item(&path.display().to_string());
            }
        }

        if let Some(teardown) = &self.teardown {
            out.key_value("Context", &teardown.to_string());
        }
        if let Some(summary) = &self.context {
            out.key_value_indented("declarations", &summary.declarations.to_string());
            out.key_value_indented("functions", &summary.functions.to_string());
            out.key_value_indented("globals", &summary.globals.to_string());
            out.key_value_indented("types", &summary.types.to_string());
        }
        if let Some(path) = &self.stats_path {
            out.key_value("Statistics", &path.display().to_string());
        }
        if let Some((dir, count)) = &self.snapshots {
            out.key_value("Snapshots", &format!("{} in {}", count, dir.display()));
        }
    }
}

#[cfg(test)]
mod tests {
    use strata_frontend::RetainReason;

    use super::*;
    use crate::reports::output::testing::RecordedOutput;

    #[test]
    fn test_render_in_memory_artifact() {
        let mut report = CompileReport::new("main");
        report.artifacts.push(ArtifactInfo {
            file_name: "main.sir".to_string(),
            path: None,
            content: "module main\n".to_string(),
        });
        report.teardown = Some(TeardownDecision::Freed);

        let mut out = RecordedOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.lines,
            vec!["-- main.sir --", "module main", "Context: freed"]
        );
    }

    #[test]
    fn test_render_retained_context() {
        let mut report = CompileReport::new("main");
        report.artifacts.push(ArtifactInfo {
            file_name: "main.sir".to_string(),
            path: Some(PathBuf::from("build/main.sir")),
            content: String::new(),
        });
        report.teardown = Some(TeardownDecision::Retained(RetainReason::Requested));
        report.context = Some(ContextSummary {
            declarations: 3,
            functions: 2,
            globals: 1,
            types: 4,
        });

        let mut out = RecordedOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.lines,
            vec![
                "Wrote:",
                "  + build/main.sir",
                "Context: retained (retention was requested)",
                "  declarations: 3",
                "  functions: 2",
                "  globals: 1",
                "  types: 4",
            ]
        );
    }

    #[test]
    fn test_render_failure() {
        let mut report = CompileReport::new("main");
        report.messages.errors.push("expected expression".to_string());
        report.failure = Some(Failure {
            stage: "parse",
            error_count: 1,
        });

        let mut out = RecordedOutput::default();
        report.render(&mut out);
        assert_eq!(
            out.lines,
            vec![
                "error: expected expression",
                "error: could not compile 'main': parse failed with 1 error(s)",
            ]
        );
    }
}
