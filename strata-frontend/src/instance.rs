//! The configured compiler of one run.

use std::path::PathBuf;

use eyre::{Result, bail};
use log::debug;
use serde::Serialize;
use strata_config::{FrontendOptions, validate_module_name};
use strata_core::SourceFile;
use strata_ir::IrModule;

use crate::context::CompilationContext;

/// An emitted output of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// File name, e.g. `main.sir`.
    pub file_name: String,
    pub content: String,
    /// Where the artifact was written, if an output directory was configured.
    pub path: Option<PathBuf>,
}

/// Options, context and products of one compilation.
///
/// Observers receive a shared reference to the instance; they may read the
/// context but never free it.
#[derive(Debug)]
pub struct CompilerInstance {
    pub(crate) options: FrontendOptions,
    pub(crate) context: Box<CompilationContext>,
    pub(crate) module: Option<IrModule>,
    pub(crate) artifacts: Vec<Artifact>,
}

impl CompilerInstance {
    /// Validate the options and inputs and create the compilation context.
    pub fn setup(options: FrontendOptions, sources: Vec<SourceFile>) -> Result<Self> {
        if sources.is_empty() {
            bail!("no input files");
        }
        if let Some(reason) = validate_module_name(&options.module_name) {
            bail!("invalid module name '{}': {}", options.module_name, reason);
        }

        debug!(
            "configured module '{}' with {} input(s)",
            options.module_name,
            sources.len()
        );
        let context = Box::new(CompilationContext::new(&options.module_name, sources));
        Ok(Self {
            options,
            context,
            module: None,
            artifacts: Vec::new(),
        })
    }

    pub fn options(&self) -> &FrontendOptions {
        &self.options
    }

    pub fn context(&self) -> &CompilationContext {
        &self.context
    }

    /// The lowered module, once lowering has run.
    pub fn module(&self) -> Option<&IrModule> {
        self.module.as_ref()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        FrontendOptions,
        Box<CompilationContext>,
        Option<IrModule>,
        Vec<Artifact>,
    ) {
        (self.options, self.context, self.module, self.artifacts)
    }
}
