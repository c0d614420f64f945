mod check;
mod compile;
mod completions;
mod explain;
mod input;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use compile::CompileCommand;
use completions::CompletionsCommand;
use eyre::Result;
use explain::ExplainCommand;

/// Extension trait for exiting on config errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for strata_config::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Compile Strata sources to stack IR")]
pub(crate) struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Log level selected with `-v`/`-q`.
    pub fn log_level(&self) -> log::LevelFilter {
        self.verbose.log_level_filter()
    }

    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Compile(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Explain(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile sources and emit IR
    Compile(CompileCommand),

    /// Type-check sources without lowering or emitting
    Check(CheckCommand),

    /// Describe the pipeline phases, observer hooks and diagnostic passes
    Explain(ExplainCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
