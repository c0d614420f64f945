//! Compilation pipeline of the Strata frontend.
//!
//! A run parses the inputs, checks them, lowers them to IR, runs diagnostic
//! passes and emits the result:
//!
//! ```text
//! Configured → SemanticAnalysis → CodeLowering → LoweringDiagnostics → Compiled
//!     → teardown decision → freed | retained
//! ```
//!
//! A [`FrontendObserver`] registered on the [`Frontend`] is notified at every
//! milestone. The [`CompilationContext`] is released once compilation is done
//! unless statistics are enabled or the options ask to retain it, in which
//! case the caller receives it in the [`FrontendOutcome`].

mod context;
mod decl;
mod diagnostic;
mod instance;
mod observer;
mod phase;
pub mod phases;
mod runner;
mod snapshot;
mod stats;
pub mod teardown;
mod types;

pub use context::CompilationContext;
pub use decl::{Decl, DeclKind, TypedExpr, TypedExprKind};
pub use diagnostic::{Diagnostic, DiagnosticLocation, Severity};
pub use instance::{Artifact, CompilerInstance};
pub use observer::{FrontendObserver, Milestone, NoopObserver};
pub use phase::{Phase, PhaseInfo, StageFailure};
pub use phases::{DiagnosticPass, PassInfo};
pub use runner::{Frontend, FrontendOutcome};
pub use snapshot::{DeclSnapshot, MilestoneSnapshot, SnapshotObserver};
pub use stats::{FrontendStats, PhaseTiming};
pub use teardown::{RetainReason, RetainedContext, TeardownDecision};
pub use types::{Type, TypeId, TypeTable};
