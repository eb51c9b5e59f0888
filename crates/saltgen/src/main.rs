//! saltgen binary
//!
//! Prints a Rundeck resource document for the minions matched by the
//! target. Exit status: 0 on success (even with no nodes), 42 without a
//! target, 255 without a minion configuration file, 1 otherwise.

use clap::Parser;
use saltgen::error::{SaltgenError, EXIT_FAILURE};
use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            let code = err
                .downcast_ref::<SaltgenError>()
                .map(SaltgenError::exit_code)
                .unwrap_or(EXIT_FAILURE);
            ExitCode::from(code)
        }
    }
}
