use clap::Args;
use eyre::Result;

use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ExplainCommand {}

impl ExplainCommand {
    pub fn run(&self) -> Result<()> {
        let report = ops::explain();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
