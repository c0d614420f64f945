//! Integration tests for observer notification and context teardown.
//!
//! These tests drive full runs through `Frontend` and check which hooks fire,
//! in which order, and whether the compilation context outlives the run.

use std::fs;

use eyre::{Result, bail};
use strata_config::{Action, FrontendOptions};
use strata_core::SourceFile;
use strata_frontend::{
    CompilerInstance, Frontend, FrontendObserver, Milestone, RetainReason, StageFailure,
    TeardownDecision,
};
use strata_ir::IrModule;
use tempfile::TempDir;

const PROGRAM: &str = r#"
let answer = 40 + 2;
let greeting: string = "hello";

fn add(a: int, b: int) -> int = a + b;
fn main() -> int = add(answer, 1);
"#;

/// Records every hook call and what the context looked like at the end.
#[derive(Default)]
struct RecordingObserver {
    events: Vec<Milestone>,
    answer_type_at_compiled: Option<String>,
    functions_at_lowering: usize,
}

impl FrontendObserver for RecordingObserver {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn configured_compiler(&mut self, instance: &CompilerInstance) -> Result<()> {
        assert!(instance.context().decls.is_empty());
        self.events.push(Milestone::Configured);
        Ok(())
    }

    fn performed_semantic_analysis(&mut self, _instance: &CompilerInstance) -> Result<()> {
        self.events.push(Milestone::SemanticAnalysis);
        Ok(())
    }

    fn performed_code_lowering(&mut self, module: &IrModule) -> Result<()> {
        self.functions_at_lowering = module.functions.len();
        self.events.push(Milestone::CodeLowering);
        Ok(())
    }

    fn performed_lowering_diagnostics(&mut self, _module: &IrModule) -> Result<()> {
        self.events.push(Milestone::LoweringDiagnostics);
        Ok(())
    }

    fn performed_compilation(&mut self, instance: &CompilerInstance) -> Result<()> {
        self.answer_type_at_compiled = instance.context().type_of("answer");
        self.events.push(Milestone::Compiled);
        Ok(())
    }
}

/// Fails at one milestone.
struct FailingObserver {
    fail_at: Milestone,
    events: Vec<Milestone>,
}

impl FailingObserver {
    fn new(fail_at: Milestone) -> Self {
        Self {
            fail_at,
            events: Vec::new(),
        }
    }

    fn reach(&mut self, milestone: Milestone) -> Result<()> {
        self.events.push(milestone);
        if milestone == self.fail_at {
            bail!("refusing to continue after {}", milestone);
        }
        Ok(())
    }
}

impl FrontendObserver for FailingObserver {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn configured_compiler(&mut self, _instance: &CompilerInstance) -> Result<()> {
        self.reach(Milestone::Configured)
    }

    fn performed_code_lowering(&mut self, _module: &IrModule) -> Result<()> {
        self.reach(Milestone::CodeLowering)
    }

    fn performed_compilation(&mut self, _instance: &CompilerInstance) -> Result<()> {
        self.reach(Milestone::Compiled)
    }
}

fn sources(src: &str) -> Vec<SourceFile> {
    vec![SourceFile::new("main.st", src)]
}

fn options(retain_context: bool) -> FrontendOptions {
    FrontendOptions {
        retain_context,
        ..FrontendOptions::default()
    }
}

#[test]
fn test_context_freed_by_default() {
    let mut observer = RecordingObserver::default();

    let outcome = Frontend::new(options(false))
        .observer(&mut observer)
        .run(sources(PROGRAM))
        .expect("run should succeed");

    assert_eq!(outcome.teardown, TeardownDecision::Freed);
    assert!(outcome.context().is_none());
    // The final hook still saw a live context.
    assert_eq!(observer.answer_type_at_compiled.as_deref(), Some("int"));
}

#[test]
fn test_retained_context_is_handed_to_caller() {
    let mut observer = RecordingObserver::default();

    let mut outcome = Frontend::new(options(true))
        .observer(&mut observer)
        .run(sources(PROGRAM))
        .expect("run should succeed");

    assert_eq!(
        outcome.teardown,
        TeardownDecision::Retained(RetainReason::Requested)
    );
    assert_eq!(observer.answer_type_at_compiled.as_deref(), Some("int"));

    let ctx = outcome.context().expect("context should be retained");
    assert_eq!(ctx.type_of("answer").as_deref(), Some("int"));
    assert_eq!(ctx.type_of("greeting").as_deref(), Some("string"));
    assert_eq!(ctx.functions().count(), 2);

    let retained = outcome.take_context().unwrap();
    assert_eq!(retained.reason(), RetainReason::Requested);
    assert!(outcome.context().is_none());

    let ctx = retained.into_inner();
    assert_eq!(ctx.decls.len(), 4);
}

#[test]
fn test_hooks_fire_once_in_order() {
    let mut observer = RecordingObserver::default();

    Frontend::new(options(false))
        .observer(&mut observer)
        .run(sources(PROGRAM))
        .expect("run should succeed");

    assert_eq!(observer.events, Milestone::ALL.to_vec());
    assert_eq!(observer.functions_at_lowering, 2);
}

#[test]
fn test_typecheck_skips_lowering_hooks() {
    let mut observer = RecordingObserver::default();
    let options = FrontendOptions {
        action: Action::Typecheck,
        ..FrontendOptions::default()
    };

    let outcome = Frontend::new(options)
        .observer(&mut observer)
        .run(sources(PROGRAM))
        .expect("run should succeed");

    assert_eq!(
        observer.events,
        vec![
            Milestone::Configured,
            Milestone::SemanticAnalysis,
            Milestone::Compiled
        ]
    );
    assert!(outcome.module.is_none());
    assert!(outcome.artifacts.is_empty());
}

#[test]
fn test_sema_failure_skips_final_hook() {
    let mut observer = RecordingObserver::default();

    let err = Frontend::new(options(true))
        .observer(&mut observer)
        .run(sources("let a: int = \"not a number\";"))
        .expect_err("sema should fail");

    let failure = err
        .downcast_ref::<StageFailure>()
        .expect("error should carry the failing stage");
    assert_eq!(failure.stage, "sema");
    assert_eq!(
        failure.errors().next().map(|d| d.message.as_str()),
        Some("global 'a' has type string, expected int")
    );
    assert_eq!(observer.events, vec![Milestone::Configured]);
    assert!(observer.answer_type_at_compiled.is_none());
}

#[test]
fn test_statistics_retain_context_without_flag() {
    let temp = TempDir::new().unwrap();
    let options = FrontendOptions {
        module_name: "app".to_string(),
        stats_output_dir: Some(temp.path().join("stats")),
        ..FrontendOptions::default()
    };

    let outcome = Frontend::new(options)
        .run(sources(PROGRAM))
        .expect("run should succeed");

    assert_eq!(
        outcome.teardown,
        TeardownDecision::Retained(RetainReason::Statistics)
    );
    assert!(outcome.context().is_some());

    let stats = outcome.stats.as_ref().expect("stats should be collected");
    assert_eq!(stats.declarations, 4);
    assert_eq!(stats.functions, 2);
    assert_eq!(stats.globals, 2);
    let phases: Vec<_> = stats.phases.iter().map(|p| p.phase).collect();
    assert_eq!(phases, vec!["parse", "sema", "lower", "diagnose", "emit"]);

    assert_eq!(
        outcome.stats_path.as_deref(),
        Some(temp.path().join("stats/stats-app.json").as_path())
    );
    let report = fs::read_to_string(temp.path().join("stats/stats-app.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(json["module_name"], "app");
    assert_eq!(json["globals"], 2);
}

#[test]
fn test_stats_write_failure_keeps_context() {
    let temp = TempDir::new().unwrap();
    // A regular file where the statistics directory should be created.
    fs::write(temp.path().join("blocker"), "").unwrap();
    let mut observer = RecordingObserver::default();
    let options = FrontendOptions {
        module_name: "app".to_string(),
        stats_output_dir: Some(temp.path().join("blocker/stats")),
        ..FrontendOptions::default()
    };

    let outcome = Frontend::new(options)
        .observer(&mut observer)
        .run(sources(PROGRAM))
        .expect("a failed statistics write should not fail the run");

    assert_eq!(observer.events, Milestone::ALL.to_vec());
    assert!(outcome.teardown.is_retained());
    assert!(outcome.context().is_some());
    assert!(outcome.stats.is_some());
    assert!(outcome.stats_path.is_none());

    let warning = outcome
        .warnings()
        .find(|d| d.phase == "stats")
        .expect("the failed write should be reported");
    assert!(warning.message.starts_with("could not write statistics to"));
}

#[test]
fn test_deep_nesting_fails_in_parse() {
    let mut observer = RecordingObserver::default();
    let src = format!("let x = {}1{};", "(".repeat(1000), ")".repeat(1000));

    let err = Frontend::new(options(false))
        .observer(&mut observer)
        .run(sources(&src))
        .expect_err("deep nesting should be rejected");

    let failure = err
        .downcast_ref::<StageFailure>()
        .expect("error should carry the failing stage");
    assert_eq!(failure.stage, "parse");
    assert!(
        failure
            .errors()
            .any(|d| d.message.contains("expression nesting exceeds the limit"))
    );
    assert_eq!(observer.events, vec![Milestone::Configured]);
}

#[test]
fn test_hook_error_aborts_run() {
    let temp = TempDir::new().unwrap();
    let mut observer = FailingObserver::new(Milestone::CodeLowering);
    let options = FrontendOptions {
        output_dir: Some(temp.path().to_path_buf()),
        retain_context: true,
        ..FrontendOptions::default()
    };

    let err = Frontend::new(options)
        .observer(&mut observer)
        .run(sources(PROGRAM))
        .expect_err("hook error should abort the run");

    assert_eq!(
        err.to_string(),
        "observer 'failing' failed in performed_code_lowering"
    );
    assert_eq!(
        err.root_cause().to_string(),
        "refusing to continue after code-lowering"
    );
    assert_eq!(
        observer.events,
        vec![Milestone::Configured, Milestone::CodeLowering]
    );
    // Nothing was emitted.
    assert!(!temp.path().join("main.sir").exists());
}

#[test]
fn test_invalid_inputs_fire_no_hooks() {
    let mut observer = RecordingObserver::default();

    let err = Frontend::new(options(true))
        .observer(&mut observer)
        .run(Vec::new())
        .expect_err("no inputs should fail");

    assert_eq!(err.to_string(), "no input files");
    assert!(observer.events.is_empty());
}

#[test]
fn test_diagnostic_pass_failure() {
    let mut observer = RecordingObserver::default();

    let err = Frontend::new(options(false))
        .observer(&mut observer)
        .run(sources("fn main() -> int = 1 / 0;"))
        .expect_err("division by zero should fail");

    assert_eq!(err.downcast_ref::<StageFailure>().unwrap().stage, "diagnose");
    assert_eq!(
        observer.events,
        vec![
            Milestone::Configured,
            Milestone::SemanticAnalysis,
            Milestone::CodeLowering
        ]
    );
}

#[test]
fn test_warnings_reach_outcome() {
    let outcome = Frontend::new(FrontendOptions::default())
        .run(sources(
            "fn main() -> int = 1;\nfn spin(n: int) -> int = spin(n);",
        ))
        .expect("warnings should not fail the run");

    let mut warnings: Vec<_> = outcome.warnings().map(|d| d.message.as_str()).collect();
    warnings.sort();
    assert_eq!(
        warnings,
        vec![
            "function 'spin' calls itself on every path",
            "function 'spin' is never called",
        ]
    );
}
