use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use strata_config::Action;

use super::input::InputArgs;
use crate::{
    ops::{self, CompileRequest},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CompileCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory to write the emitted IR to (prints it when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Name of the compiled module
    #[arg(long)]
    pub module_name: Option<String>,

    /// Output format: ir or json
    #[arg(long)]
    pub emit: Option<Action>,

    /// Keep the compilation context after compiling and report on it
    #[arg(long)]
    pub retain_context: bool,

    /// Directory to write usage statistics to
    #[arg(long)]
    pub stats_output_dir: Option<PathBuf>,

    /// Directory to write a JSON snapshot of every pipeline milestone to
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,
}

impl CompileCommand {
    pub fn run(&self) -> Result<()> {
        let inputs = self.input.load()?;
        let mut options = inputs.config.frontend;

        if let Some(name) = &self.module_name {
            options.module_name = name.clone();
        }
        if let Some(action) = self.emit {
            options.action = action;
        }
        if let Some(dir) = &self.output {
            options.output_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.stats_output_dir {
            options.stats_output_dir = Some(dir.clone());
        }
        options.retain_context |= self.retain_context;

        let request = CompileRequest {
            options,
            sources: inputs.sources,
            snapshot_dir: self
                .snapshot_dir
                .clone()
                .or(inputs.config.observer.snapshot_dir),
        };

        let report = ops::compile(request)?;
        report.render(&mut TerminalOutput::new());

        if !report.is_success() {
            std::process::exit(1);
        }
        Ok(())
    }
}
