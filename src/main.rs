//! CLI entry point for the CZDS zone file downloader.

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

mod app;
mod app_config;
mod cli;

use cli::Args;

/// Process outcome, mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every requested zone file was saved.
    Success,
    /// Nothing was saved, or the run aborted.
    Failure,
    /// Some zone files were saved and some failed.
    Partial,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 3,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let _ = err.print();
                return ExitCode::from(ProcessExit::Failure.code());
            }
            _ => err.exit(),
        },
    };

    init_tracing(&args);

    match app::runtime::run_downloader(&args).await {
        Ok(outcome) => ExitCode::from(outcome.code()),
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::from(ProcessExit::Failure.code())
        }
    }
}

/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (info)
fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
