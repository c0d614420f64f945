//! Built-in pipeline phases.
//!
//! This module provides the standard phases of a run, in execution order:
//!
//! - [`ParsePhase`] - parses every source file
//! - [`SemaPhase`] - resolves names and checks types
//! - [`LowerPhase`] - lowers checked declarations to IR
//! - [`DiagnosePhase`] - runs diagnostic passes over the IR
//! - [`EmitPhase`] - renders and writes the output artifact

mod diagnose;
mod emit;
mod lower;
mod parse;
mod sema;

pub use diagnose::{
    DiagnosePhase, DiagnosticPass, DivisionByZeroPass, InfiniteRecursionPass, PassInfo,
    UnusedFunctionPass,
};
pub use emit::EmitPhase;
pub use lower::LowerPhase;
pub use parse::ParsePhase;
pub use sema::SemaPhase;
