//! Emit phase - renders the lowered module and writes it out.

use eyre::{Result, eyre};
use log::info;
use strata_config::Action;
use strata_core::OutputFile;

use crate::{Artifact, CompilerInstance, Phase};

/// Phase that produces the output artifact of the configured action.
///
/// Without an output directory the artifact is kept in memory only.
pub struct EmitPhase;

impl Phase for EmitPhase {
    fn name(&self) -> &'static str {
        "emit"
    }

    fn description(&self) -> &'static str {
        "Render the IR and write the output artifact"
    }

    fn run(&self, instance: &mut CompilerInstance) -> Result<()> {
        let module = instance
            .module
            .as_ref()
            .ok_or_else(|| eyre!("no lowered module to emit"))?;

        let (file_name, content) = match instance.options.action {
            Action::EmitIr => (format!("{}.sir", module.name), module.to_string()),
            Action::EmitIrJson => (
                format!("{}.sir.json", module.name),
                serde_json::to_string_pretty(module)? + "\n",
            ),
            Action::Typecheck => return Ok(()),
        };

        let path = match &instance.options.output_dir {
            Some(dir) => {
                let file = OutputFile::new(dir.join(&file_name), content.as_str());
                let path = file.write()?.to_path_buf();
                info!("wrote {}", path.display());
                Some(path)
            }
            None => None,
        };

        instance.artifacts.push(Artifact {
            file_name,
            content,
            path,
        });
        Ok(())
    }
}
