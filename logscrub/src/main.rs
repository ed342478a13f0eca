// logscrub/src/main.rs
//! logscrub entry point.
//!
//! Loads configuration, installs the process logger, and redacts every
//! archive named on the command line.
//!
//! Exit status: 0 when every file was redacted, 1 when at least one pass
//! failed, 2 when nothing could be processed at all.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use log::error;

use logscrub::cli::Cli;
use logscrub::logger::LoggingContext;
use logscrub::run_redact;
use logscrub_core::ScrubConfig;

fn main() -> ExitCode {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("logscrub: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = ScrubConfig::load().context("Failed to load configuration")?;
    let logging = LoggingContext::init(&config.log_file, &config.log_level)?;

    let stderr = io::stderr();
    let color = stderr.is_terminal();
    let outcome = run_redact(config, &cli.files, &mut stderr.lock(), color);

    let code = match outcome {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            logging.shutdown();
            return Err(e);
        }
    };
    logging.shutdown();
    Ok(code)
}
