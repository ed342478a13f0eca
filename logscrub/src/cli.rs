// logscrub/src/cli.rs
//! This file defines the command-line interface (CLI) for the logscrub application.
//! License: MIT OR Apache-2.0

use clap::Parser;
use std::path::PathBuf;

/// Top-level CLI definition.
///
/// There are no flags beyond `--help` and `--version`; runtime settings come
/// from the config file and `LOGSCRUB_*` environment variables.
#[derive(Parser, Debug)]
#[command(
    name = "logscrub",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact credit-card and SSN tokens from gzip log archives",
    long_about = "logscrub decompresses each gzip log archive, masks every CC=\"dddd-dddd-dddd-dddd\" and SSN=\"ddd-dd-dddd\" token in place through a memory mapping, recompresses the result under a .redacted.gz suffix and appends the statistics to a .audit file next to it. The original archives are never modified.",
)]
pub struct Cli {
    /// Gzip-compressed log files to redact.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}
