use std::process::ExitCode;

use clap::Parser;
use tmd_core::logging;

mod cli;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_stderr {
        logging::init_logging_stderr();
    } else if let Err(err) = logging::init_logging() {
        eprintln!("tmd: logging to stderr ({:#})", err);
        logging::init_logging_stderr();
    }

    match cli.run() {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("tmd error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
