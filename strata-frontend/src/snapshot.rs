//! Snapshot observer for visualization and debugging.
//!
//! This module provides an observer that captures the compiler state at every
//! milestone, enabling inspection of the compilation process.

use std::path::{Path, PathBuf};

use eyre::Result;
use log::debug;
use serde::Serialize;
use strata_core::OutputFile;
use strata_ir::IrModule;

use crate::{
    CompilerInstance, Diagnostic, FrontendObserver, Milestone,
    decl::{Decl, DeclKind},
    types::TypeTable,
};

/// A declaration as seen by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclSnapshot {
    pub name: String,
    pub kind: DeclKind,
    /// The type as written in source, e.g. `fn(int) -> bool`.
    pub ty: String,
    pub location: String,
}

impl DeclSnapshot {
    fn new(decl: &Decl, types: &TypeTable) -> Self {
        Self {
            name: decl.name.clone(),
            kind: decl.kind,
            ty: types.display(decl.ty),
            location: decl.location.clone(),
        }
    }
}

/// The compiler state at one milestone.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneSnapshot {
    /// The milestone that was reached.
    pub milestone: Milestone,

    /// Checked declarations (available from "semantic-analysis").
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<DeclSnapshot>,

    /// The lowered module (available from "code-lowering").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<IrModule>,

    /// Diagnostics collected so far.
    pub diagnostics: Vec<Diagnostic>,
}

impl MilestoneSnapshot {
    fn of_instance(milestone: Milestone, instance: &CompilerInstance) -> Self {
        let ctx = instance.context();
        Self {
            milestone,
            declarations: ctx
                .decls
                .values()
                .map(|decl| DeclSnapshot::new(decl, &ctx.types))
                .collect(),
            module: instance.module().cloned(),
            diagnostics: ctx.diagnostics.clone(),
        }
    }

    fn of_module(milestone: Milestone, module: &IrModule) -> Self {
        Self {
            milestone,
            declarations: Vec::new(),
            module: Some(module.clone()),
            diagnostics: Vec::new(),
        }
    }

    /// File name of this snapshot, numbered by its position in the run.
    pub fn file_name(&self, index: usize) -> String {
        format!("{:02}-{}.json", index, self.milestone)
    }
}

/// An observer that captures the compiler state at every milestone.
///
/// The snapshot taken at `performed_compilation` reads the context before it
/// is released, so it works whether or not the context is retained.
///
/// # Example
///
/// ```ignore
/// let mut snapshots = SnapshotObserver::with_output_dir(".strata/snapshots");
/// let outcome = Frontend::new(options).observer(&mut snapshots).run(sources)?;
///
/// let compiled = snapshots.last().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct SnapshotObserver {
    /// Collected snapshots.
    snapshots: Vec<MilestoneSnapshot>,
    /// Output directory for snapshots.
    output_dir: Option<PathBuf>,
}

impl SnapshotObserver {
    /// Create a new snapshot observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new snapshot observer that writes to a directory.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: Vec::new(),
            output_dir: Some(output_dir.into()),
        }
    }

    /// Get all collected snapshots.
    pub fn snapshots(&self) -> &[MilestoneSnapshot] {
        &self.snapshots
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<&MilestoneSnapshot> {
        self.snapshots.last()
    }

    /// Write all snapshots to a directory.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        for (index, snapshot) in self.snapshots.iter().enumerate() {
            write_snapshot(dir.as_ref(), index, snapshot)?;
        }
        Ok(())
    }

    fn capture(&mut self, snapshot: MilestoneSnapshot) -> Result<()> {
        let index = self.snapshots.len();

        // If output directory is configured, write immediately
        if let Some(dir) = &self.output_dir {
            write_snapshot(dir, index, &snapshot)?;
        }

        self.snapshots.push(snapshot);
        Ok(())
    }
}

fn write_snapshot(dir: &Path, index: usize, snapshot: &MilestoneSnapshot) -> Result<()> {
    let path = dir.join(snapshot.file_name(index));
    let json = serde_json::to_string_pretty(snapshot)?;
    OutputFile::new(&path, json).write()?;
    debug!("wrote snapshot {}", path.display());
    Ok(())
}

impl FrontendObserver for SnapshotObserver {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn configured_compiler(&mut self, instance: &CompilerInstance) -> Result<()> {
        self.capture(MilestoneSnapshot::of_instance(
            Milestone::Configured,
            instance,
        ))
    }

    fn performed_semantic_analysis(&mut self, instance: &CompilerInstance) -> Result<()> {
        self.capture(MilestoneSnapshot::of_instance(
            Milestone::SemanticAnalysis,
            instance,
        ))
    }

    fn performed_code_lowering(&mut self, module: &IrModule) -> Result<()> {
        self.capture(MilestoneSnapshot::of_module(Milestone::CodeLowering, module))
    }

    fn performed_lowering_diagnostics(&mut self, module: &IrModule) -> Result<()> {
        self.capture(MilestoneSnapshot::of_module(
            Milestone::LoweringDiagnostics,
            module,
        ))
    }

    fn performed_compilation(&mut self, instance: &CompilerInstance) -> Result<()> {
        self.capture(MilestoneSnapshot::of_instance(Milestone::Compiled, instance))
    }
}
