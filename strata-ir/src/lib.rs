//! Intermediate representation produced by lowering.
//!
//! This crate provides the stack-machine IR that the Strata frontend lowers
//! type-checked declarations into. The IR is the input of the lowering
//! diagnostic passes and of emission.
//!
//! # Architecture
//!
//! ```text
//! source → strata-syntax (parsing) → semantic analysis → strata-ir (lowering) → emission
//! ```
//!
//! The IR types are designed to be:
//! - Self-contained (no dependency on the syntax tree or the type checker)
//! - Serializable (emitted as JSON, captured by snapshots)
//! - Printable in a stable textual form (emitted as `.sir`)

mod instr;
mod module;

pub use instr::Instr;
pub use module::{IrFunction, IrGlobal, IrModule, IrType};
