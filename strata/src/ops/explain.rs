//! Explain operation - describe the pipeline.

use strata_config::FrontendOptions;
use strata_frontend::{Frontend, Milestone};

use crate::reports::{ExplainReport, HookInfo, StepInfo};

/// Execute the explain operation.
pub fn explain() -> ExplainReport {
    let frontend = Frontend::new(FrontendOptions::default());

    ExplainReport {
        phases: frontend
            .phase_info()
            .into_iter()
            .map(|p| StepInfo {
                name: p.name,
                description: p.description,
            })
            .collect(),
        hooks: Milestone::ALL
            .iter()
            .map(|m| HookInfo {
                milestone: m.as_str(),
                hook: m.hook_name(),
                description: m.description(),
            })
            .collect(),
        passes: frontend
            .pass_info()
            .into_iter()
            .map(|p| StepInfo {
                name: p.name,
                description: p.description,
            })
            .collect(),
    }
}
