//! Release or retention of the compilation context at the end of a run.
//!
//! The context is released as soon as compilation finishes unless something
//! still needs it: the statistics report reads it, and callers may ask to keep
//! it through [`FrontendOptions::retain_context`]. A retained context is handed
//! to the caller as a [`RetainedContext`]; dropping that handle releases it.

use std::{fmt, ops::Deref};

use log::{debug, info};
use serde::Serialize;
use strata_config::FrontendOptions;

use crate::context::CompilationContext;

/// Why a context outlives its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetainReason {
    /// Statistics reporting reads the context after compilation.
    Statistics,
    /// The caller set `retain_context`.
    Requested,
    StatisticsAndRequested,
}

/// What happened to the context after compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "kebab-case")]
pub enum TeardownDecision {
    Freed,
    Retained(RetainReason),
}

impl TeardownDecision {
    /// Decide from the run's options alone.
    pub fn decide(options: &FrontendOptions) -> Self {
        match (options.stats_enabled(), options.retain_context) {
            (false, false) => TeardownDecision::Freed,
            (true, false) => TeardownDecision::Retained(RetainReason::Statistics),
            (false, true) => TeardownDecision::Retained(RetainReason::Requested),
            (true, true) => TeardownDecision::Retained(RetainReason::StatisticsAndRequested),
        }
    }

    pub fn is_retained(&self) -> bool {
        matches!(self, TeardownDecision::Retained(_))
    }
}

impl fmt::Display for RetainReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetainReason::Statistics => write!(f, "statistics are enabled"),
            RetainReason::Requested => write!(f, "retention was requested"),
            RetainReason::StatisticsAndRequested => {
                write!(f, "statistics are enabled and retention was requested")
            }
        }
    }
}

impl fmt::Display for TeardownDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeardownDecision::Freed => write!(f, "freed"),
            TeardownDecision::Retained(reason) => write!(f, "retained ({})", reason),
        }
    }
}

/// Owning handle to a compilation context kept alive past its run.
#[derive(Debug)]
pub struct RetainedContext {
    context: Box<CompilationContext>,
    reason: RetainReason,
}

impl RetainedContext {
    pub fn reason(&self) -> RetainReason {
        self.reason
    }

    /// Take ownership of the context itself.
    pub fn into_inner(self) -> Box<CompilationContext> {
        self.context
    }
}

impl Deref for RetainedContext {
    type Target = CompilationContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// Free `context` unless the options require keeping it.
///
/// Returns the decision and, when retained, the handle owning the context.
pub fn free_context_if_possible(
    context: Box<CompilationContext>,
    options: &FrontendOptions,
) -> (TeardownDecision, Option<RetainedContext>) {
    let decision = TeardownDecision::decide(options);
    match decision {
        TeardownDecision::Freed => {
            debug!("releasing compilation context of '{}'", context.module_name);
            drop(context);
            (decision, None)
        }
        TeardownDecision::Retained(reason) => {
            info!(
                "keeping compilation context of '{}': {}",
                context.module_name, reason
            );
            (decision, Some(RetainedContext { context, reason }))
        }
    }
}
