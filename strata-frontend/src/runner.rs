//! Frontend driver.

use std::{path::PathBuf, time::Instant};

use eyre::{Result, WrapErr, eyre};
use log::{debug, info, warn};
use strata_config::FrontendOptions;
use strata_core::SourceFile;
use strata_ir::IrModule;

use crate::{
    Artifact, CompilerInstance, Diagnostic, FrontendObserver, Milestone, NoopObserver, Phase,
    PhaseInfo,
    context::CompilationContext,
    phases::{
        DiagnosePhase, DiagnosticPass, EmitPhase, LowerPhase, ParsePhase, PassInfo, SemaPhase,
    },
    stats::{FrontendStats, StatsRecorder},
    teardown::{RetainedContext, TeardownDecision, free_context_if_possible},
};

/// Drives one compilation from configuration to teardown.
///
/// The run walks `Configured → SemanticAnalysis → CodeLowering →
/// LoweringDiagnostics → Compiled`, notifying the observer at each milestone,
/// then decides whether the compilation context is freed or handed back to
/// the caller.
///
/// # Example
///
/// ```ignore
/// let mut observer = MyObserver::default();
/// let outcome = Frontend::new(options)
///     .observer(&mut observer)
///     .run(vec![SourceFile::read("main.st")?])?;
///
/// if let Some(ctx) = outcome.context() {
///     println!("{} declarations", ctx.decls.len());
/// }
/// ```
pub struct Frontend<'obs> {
    options: FrontendOptions,
    observer: Option<&'obs mut dyn FrontendObserver>,
    diagnose: DiagnosePhase,
}

impl<'obs> Frontend<'obs> {
    /// Create a frontend with the built-in phases and diagnostic passes.
    pub fn new(options: FrontendOptions) -> Self {
        Self {
            options,
            observer: None,
            diagnose: DiagnosePhase::new(),
        }
    }

    /// Register the observer notified at every milestone of the run.
    pub fn observer(mut self, observer: &'obs mut dyn FrontendObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Add a diagnostic pass to run after the built-in ones.
    pub fn pass(mut self, pass: impl DiagnosticPass + 'static) -> Self {
        self.diagnose = self.diagnose.with_pass(pass);
        self
    }

    /// The phases a run executes, in order.
    pub fn phase_info(&self) -> Vec<PhaseInfo> {
        vec![
            ParsePhase.info(),
            SemaPhase.info(),
            LowerPhase.info(),
            self.diagnose.info(),
            EmitPhase.info(),
        ]
    }

    /// The diagnostic passes run over the lowered module.
    pub fn pass_info(&self) -> Vec<PassInfo> {
        self.diagnose.pass_info()
    }

    /// Compile `sources`.
    ///
    /// # Errors
    ///
    /// Fails before any hook runs when the options or inputs are invalid.
    /// Fails with a [`StageFailure`](crate::StageFailure) when a phase records
    /// errors, and with the observer's error when a hook fails. On every
    /// failure the compilation context is released and `performed_compilation`
    /// is not called.
    pub fn run(self, sources: Vec<SourceFile>) -> Result<FrontendOutcome> {
        let Frontend {
            options,
            observer,
            diagnose,
        } = self;

        match observer {
            Some(observer) => drive(options, &diagnose, sources, observer, true),
            None => drive(options, &diagnose, sources, &mut NoopObserver, false),
        }
    }
}

/// Result of a successful run.
#[derive(Debug)]
pub struct FrontendOutcome {
    /// The lowered module, unless the action stops after type checking.
    pub module: Option<IrModule>,
    /// Emitted artifacts.
    pub artifacts: Vec<Artifact>,
    /// Warnings and infos collected during the run.
    pub diagnostics: Vec<Diagnostic>,
    /// What happened to the compilation context.
    pub teardown: TeardownDecision,
    /// Statistics, when enabled.
    pub stats: Option<FrontendStats>,
    /// Where the statistics were written, when a directory was configured
    /// and the write succeeded. A failed write is reported as a warning.
    pub stats_path: Option<PathBuf>,
    context: Option<RetainedContext>,
}

impl FrontendOutcome {
    /// The retained compilation context, if the run kept it.
    pub fn context(&self) -> Option<&CompilationContext> {
        self.context.as_deref()
    }

    /// Take ownership of the retained context; dropping it releases it.
    pub fn take_context(&mut self) -> Option<RetainedContext> {
        self.context.take()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_warning())
    }
}

fn drive(
    options: FrontendOptions,
    diagnose: &DiagnosePhase,
    sources: Vec<SourceFile>,
    observer: &mut dyn FrontendObserver,
    observed: bool,
) -> Result<FrontendOutcome> {
    let mut recorder = options.stats_enabled().then(StatsRecorder::default);
    let mut instance = CompilerInstance::setup(options, sources)?;
    let mut hooks = Hooks {
        observer,
        reached: None,
    };

    info!(
        "compiling module '{}' ({})",
        instance.options.module_name, instance.options.action
    );

    hooks.notify(Milestone::Configured, |o| o.configured_compiler(&instance))?;

    run_phase(&ParsePhase, &mut instance, &mut recorder)?;
    run_phase(&SemaPhase, &mut instance, &mut recorder)?;
    hooks.notify(Milestone::SemanticAnalysis, |o| {
        o.performed_semantic_analysis(&instance)
    })?;

    if instance.options.action.lowers() {
        run_phase(&LowerPhase, &mut instance, &mut recorder)?;
        hooks.notify(Milestone::CodeLowering, |o| {
            o.performed_code_lowering(lowered(&instance)?)
        })?;

        run_phase(diagnose, &mut instance, &mut recorder)?;
        hooks.notify(Milestone::LoweringDiagnostics, |o| {
            o.performed_lowering_diagnostics(lowered(&instance)?)
        })?;

        run_phase(&EmitPhase, &mut instance, &mut recorder)?;
    }

    // The context is still owned by the instance here, retained or not.
    hooks.notify(Milestone::Compiled, |o| o.performed_compilation(&instance))?;

    let (options, context, module, artifacts) = instance.into_parts();
    let mut diagnostics = context.diagnostics.clone();
    let (teardown, retained) = free_context_if_possible(context, &options);

    if teardown.is_retained() && !observed {
        debug!("context retained with no observer registered");
    }

    // A failed write is only a warning; the retained context is still returned.
    let mut stats_path = None;
    let stats = match (recorder, retained.as_deref()) {
        (Some(recorder), Some(ctx)) => {
            let stats = recorder.finish(ctx, module.as_ref());
            if let Some(dir) = &options.stats_output_dir {
                match stats.write_to_dir(dir) {
                    Ok(path) => {
                        info!("wrote statistics to {}", path.display());
                        stats_path = Some(path);
                    }
                    Err(err) => {
                        warn!("failed to write statistics to {}: {:#}", dir.display(), err);
                        diagnostics.push(Diagnostic::warning(
                            "stats",
                            format!("could not write statistics to {}: {}", dir.display(), err),
                        ));
                    }
                }
            }
            Some(stats)
        }
        _ => None,
    };

    Ok(FrontendOutcome {
        module,
        artifacts,
        diagnostics,
        teardown,
        stats,
        stats_path,
        context: retained,
    })
}

/// Run a single phase, timing it when statistics are enabled.
fn run_phase(
    phase: &dyn Phase,
    instance: &mut CompilerInstance,
    recorder: &mut Option<StatsRecorder>,
) -> Result<()> {
    debug!("running phase '{}'", phase.name());
    let start = Instant::now();

    phase.run(instance)?;

    if let Some(recorder) = recorder {
        recorder.record(phase.name(), start.elapsed());
    }
    Ok(())
}

fn lowered(instance: &CompilerInstance) -> Result<&IrModule> {
    instance
        .module()
        .ok_or_else(|| eyre!("lowering did not produce a module"))
}

/// Fires observer hooks, checking that milestones only move forward.
struct Hooks<'a> {
    observer: &'a mut dyn FrontendObserver,
    reached: Option<Milestone>,
}

impl Hooks<'_> {
    fn notify(
        &mut self,
        milestone: Milestone,
        hook: impl FnOnce(&mut dyn FrontendObserver) -> Result<()>,
    ) -> Result<()> {
        debug_assert!(
            self.reached.is_none_or(|reached| reached < milestone),
            "milestone {} reached after {:?}",
            milestone,
            self.reached
        );
        self.reached = Some(milestone);

        let name = self.observer.name();
        debug!(
            "milestone '{}': calling {}::{}",
            milestone,
            name,
            milestone.hook_name()
        );
        hook(&mut *self.observer)
            .wrap_err_with(|| format!("observer '{}' failed in {}", name, milestone.hook_name()))
    }
}
