//! Compilation context shared by every phase of a run.

use indexmap::IndexMap;
use strata_core::SourceFile;
use strata_syntax::SourceUnit;

use crate::{
    decl::{Decl, DeclKind},
    diagnostic::{Diagnostic, Severity},
    types::TypeTable,
};

/// Long-lived state of one compilation.
///
/// Holds the sources, the parsed units, the type table, the checked
/// declarations and the diagnostics. The context is released at the end of a
/// run unless the run is configured to keep it (see [`crate::teardown`]).
#[derive(Debug)]
pub struct CompilationContext {
    /// Name of the module being compiled.
    pub module_name: String,
    /// Input files, in the order given.
    pub sources: Vec<SourceFile>,
    /// Parsed units, one per source (populated by ParsePhase).
    pub units: Vec<SourceUnit>,
    /// Interned semantic types.
    pub types: TypeTable,
    /// Checked declarations in source order (populated by SemaPhase).
    pub decls: IndexMap<String, Decl>,
    /// Diagnostics collected during compilation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new(module_name: impl Into<String>, sources: Vec<SourceFile>) -> Self {
        Self {
            module_name: module_name.into(),
            sources,
            units: Vec::new(),
            types: TypeTable::new(),
            decls: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Look up a checked declaration.
    pub fn decl(&self, name: &str) -> Option<&Decl> {
        self.decls.get(name)
    }

    pub fn globals(&self) -> impl Iterator<Item = &Decl> {
        self.decls.values().filter(|d| d.kind == DeclKind::Global)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Decl> {
        self.decls.values().filter(|d| d.kind == DeclKind::Function)
    }

    /// Source-level rendering of a declaration's type.
    pub fn type_of(&self, name: &str) -> Option<String> {
        self.decl(name).map(|d| self.types.display(d.ty))
    }

    /// Total number of source lines across inputs.
    pub fn source_lines(&self) -> usize {
        self.sources.iter().map(|s| s.line_count()).sum()
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }

    /// Add an error diagnostic.
    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    /// Add a warning diagnostic.
    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    /// Add a diagnostic with a location.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    /// Get all warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_context() -> CompilationContext {
        CompilationContext::new(
            "main",
            vec![SourceFile::new("main.st", "let a = 1;\nlet b = 2;")],
        )
    }

    #[test]
    fn test_context_creation() {
        let ctx = make_context();

        assert_eq!(ctx.module_name, "main");
        assert!(ctx.units.is_empty());
        assert!(ctx.decls.is_empty());
        assert!(ctx.diagnostics.is_empty());
        assert_eq!(ctx.source_lines(), 2);
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = make_context();

        ctx.add_error("test", "test error");
        ctx.add_warning("test", "test warning");

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
        assert_eq!(ctx.errors().count(), 1);
    }

    #[test]
    fn test_context_no_errors() {
        let mut ctx = make_context();

        ctx.add_warning("test", "just a warning");
        ctx.add_diagnostic(Diagnostic::info("test", "just info"));

        assert!(!ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.warnings().count(), 1);
    }
}
