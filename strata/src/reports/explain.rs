//! Explain command report data structures.

use super::output::{Output, Report};

/// A phase or diagnostic pass.
#[derive(Debug)]
pub struct StepInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// An observer hook and the milestone that fires it.
#[derive(Debug)]
pub struct HookInfo {
    pub milestone: &'static str,
    pub hook: &'static str,
    pub description: &'static str,
}

/// Report describing how a compile runs.
#[derive(Debug)]
pub struct ExplainReport {
    pub phases: Vec<StepInfo>,
    pub hooks: Vec<HookInfo>,
    pub passes: Vec<StepInfo>,
}

impl Report for ExplainReport {
    fn render(&self, out: &mut dyn Output) {
        out.title("Strata Frontend Pipeline");
        out.newline();

        out.section("Phases");
        for (i, phase) in self.phases.iter().enumerate() {
            out.numbered_item(i + 1, &format!("{} - {}", phase.name, phase.description));
        }
        out.newline();

        out.section("Observer Hooks");
        for (i, hook) in self.hooks.iter().enumerate() {
            out.numbered_item(
                i + 1,
                &format!("{} ({}) - {}", hook.hook, hook.milestone, hook.description),
            );
        }
        out.newline();

        out.section("Diagnostic Passes");
        for pass in &self.passes {
            out.list_item(&format!("{}: {}", pass.name, pass.description));
        }
        out.newline();

        out.preformatted(
            "The context is freed after performed_compilation unless retain_context \
             is set or statistics are enabled.",
        );
    }
}
