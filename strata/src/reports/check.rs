//! Check command report data structures.

use super::output::{Output, Report};
use crate::ops::Messages;

/// A checked declaration.
#[derive(Debug)]
pub struct DeclInfo {
    pub name: String,
    pub ty: String,
    pub location: String,
}

/// Report data from type checking.
#[derive(Debug)]
pub struct CheckReport {
    pub module_name: String,
    pub messages: Messages,
    /// Declarations in source order; empty when checking failed.
    pub declarations: Vec<DeclInfo>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.messages.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.messages.errors {
            out.error(error);
        }
        for warning in &self.messages.warnings {
            out.warning(warning);
        }
        for info in &self.messages.infos {
            out.preformatted(&format!("info: {}", info));
        }

        if !self.is_valid() {
            return;
        }

        out.preformatted(&format!("✓ module '{}' is well-typed", self.module_name));
        if self.declarations.is_empty() {
            return;
        }

        out.newline();
        out.section(&format!("{} declaration(s)", self.declarations.len()));
        for decl in &self.declarations {
            out.list_item(&format!("{}: {} ({})", decl.name, decl.ty, decl.location));
        }
    }
}
