//! Usage statistics of a run.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use eyre::Result;
use serde::Serialize;
use strata_core::OutputFile;
use strata_ir::IrModule;

use crate::context::CompilationContext;

/// Wall time spent in one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTiming {
    pub phase: &'static str,
    pub micros: u64,
}

/// Counters read from the retained context after compilation.
#[derive(Debug, Clone, Serialize)]
pub struct FrontendStats {
    pub module_name: String,
    pub source_files: usize,
    pub source_lines: usize,
    pub declarations: usize,
    pub functions: usize,
    pub globals: usize,
    pub interned_types: usize,
    pub errors: usize,
    pub warnings: usize,
    pub ir_instructions: usize,
    pub phases: Vec<PhaseTiming>,
}

impl FrontendStats {
    /// File name of the report for `module_name`.
    pub fn file_name(module_name: &str) -> String {
        format!("stats-{}.json", module_name)
    }

    /// Write the report as pretty JSON into `dir`, returning its path.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(Self::file_name(&self.module_name));
        let json = serde_json::to_string_pretty(self)? + "\n";
        OutputFile::new(&path, json).write()?;
        Ok(path)
    }
}

/// Collects phase timings while a run is in progress.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    timings: Vec<PhaseTiming>,
}

impl StatsRecorder {
    pub(crate) fn record(&mut self, phase: &'static str, elapsed: Duration) {
        self.timings.push(PhaseTiming {
            phase,
            micros: elapsed.as_micros().try_into().unwrap_or(u64::MAX),
        });
    }

    pub(crate) fn finish(
        self,
        ctx: &CompilationContext,
        module: Option<&IrModule>,
    ) -> FrontendStats {
        FrontendStats {
            module_name: ctx.module_name.clone(),
            source_files: ctx.sources.len(),
            source_lines: ctx.source_lines(),
            declarations: ctx.decls.len(),
            functions: ctx.functions().count(),
            globals: ctx.globals().count(),
            interned_types: ctx.types.len(),
            errors: ctx.error_count(),
            warnings: ctx.warning_count(),
            ir_instructions: module.map_or(0, IrModule::instruction_count),
            phases: self.timings,
        }
    }
}

#[cfg(test)]
mod tests {
    use strata_core::SourceFile;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_finish_and_write() {
        let mut ctx = CompilationContext::new(
            "app",
            vec![SourceFile::new("a.st", "let a = 1;\nlet b = 2;")],
        );
        ctx.add_warning("diagnose", "unused");

        let mut recorder = StatsRecorder::default();
        recorder.record("parse", Duration::from_micros(15));
        let stats = recorder.finish(&ctx, None);

        assert_eq!(stats.source_files, 1);
        assert_eq!(stats.source_lines, 2);
        assert_eq!(stats.interned_types, 3);
        assert_eq!(stats.warnings, 1);
        assert_eq!(stats.ir_instructions, 0);
        assert_eq!(
            stats.phases,
            vec![PhaseTiming {
                phase: "parse",
                micros: 15
            }]
        );

        let temp = TempDir::new().unwrap();
        let path = stats.write_to_dir(temp.path()).unwrap();
        assert_eq!(path, temp.path().join("stats-app.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["module_name"], "app");
        assert_eq!(json["phases"][0]["phase"], "parse");
    }
}
