use clap::Args;
use eyre::Result;
use strata_config::Action;

use super::input::InputArgs;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub input: InputArgs,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let inputs = self.input.load()?;
        let mut options = inputs.config.frontend;
        options.action = Action::Typecheck;
        // Nothing is written by a check.
        options.output_dir = None;
        options.stats_output_dir = None;

        let report = ops::check(options, inputs.sources)?;
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
