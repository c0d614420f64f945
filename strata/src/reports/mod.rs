//! Report data structures for commands.
//!
//! Commands build reports, then render them to an Output target.

mod check;
mod compile;
mod explain;
mod output;

pub use check::{CheckReport, DeclInfo};
pub use compile::{ArtifactInfo, CompileReport, ContextSummary, Failure};
pub use explain::{ExplainReport, HookInfo, StepInfo};
pub use output::{Report, TerminalOutput};
