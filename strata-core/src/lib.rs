//! Core utilities and types for the Strata compiler frontend.
//!
//! This crate provides the source-file and output-file primitives shared
//! across the Strata workspace.

mod file;
mod source;

// Output files
pub use file::{OutputFile, write_file};
// Source inputs
pub use source::{LineIndex, Location, SourceFile};
