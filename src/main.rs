//! # tidycsv command-line entry point
//!
//! ```bash
//! tidycsv clean -i raw.csv -o clean.csv --op remove_null,remove_duplicates
//! tidycsv clean -i raw.csv -o clean.csv --all
//! tidycsv operations
//! tidycsv config --default-op remove_null,remove_duplicates
//! ```
//!
//! The cleaning log is printed to stdout; diagnostics go to stderr and to the
//! rolling log files (set `RUST_LOG=debug` for per-step detail).

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::Parser as _;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tidycsv::logging::init() {
        eprintln!("Warning: file logging unavailable: {e:#}");
    }

    let cli = cli::Cli::parse();

    match cli::run_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
