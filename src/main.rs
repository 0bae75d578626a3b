//! CLI entry point for setget.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod progress;
mod settings;
mod terminal;

use cli::Cli;

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Everything succeeded.
    Success,
    /// The run completed but some items ended in warnings.
    Partial,
    /// A fatal error stopped the command.
    Failure,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    terminal::init_tracing(terminal::default_log_level(cli.verbose, cli.quiet));
    debug!(?cli, "CLI arguments parsed");

    let exit = match commands::dispatch(cli).await {
        Ok(exit) => exit,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ProcessExit::Failure
        }
    };
    ExitCode::from(exit.code())
}
