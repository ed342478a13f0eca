// logscrub/src/logger.rs
//! Process logging context.
//!
//! All crates log through the `log` facade. The binary installs `env_logger`
//! once at startup, pointed at the append-only process log, and flushes it
//! at shutdown through [`LoggingContext::shutdown`].

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Extra `RUST_LOG`-style directives applied on top of the configured level.
pub const LOG_FILTER_ENV_VAR: &str = "LOGSCRUB_LOG";

/// Handle to the installed process logger.
#[derive(Debug)]
pub struct LoggingContext {
    _installed: (),
}

impl LoggingContext {
    /// Installs the global logger, appending to `log_file` at `level`.
    ///
    /// Fails if the log file cannot be opened, the level is unknown, or a
    /// logger is already installed in this process.
    pub fn init(log_file: &Path, level: &str) -> Result<Self> {
        let level = parse_level(level)?;
        if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

        let mut builder = Builder::new();
        builder
            .filter_level(level)
            .write_style(WriteStyle::Never)
            .target(Target::Pipe(Box::new(file)))
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} ({}) {} {}",
                    record.target(),
                    record.level(),
                    Local::now().format("%m/%d/%Y %I:%M:%S %p"),
                    record.args()
                )
            });
        if let Ok(directives) = std::env::var(LOG_FILTER_ENV_VAR) {
            builder.parse_filters(&directives);
        }
        builder
            .try_init()
            .context("A global logger is already installed")?;

        Ok(Self { _installed: () })
    }

    /// Flushes buffered records. Call once, right before exiting.
    pub fn shutdown(self) {
        log::logger().flush();
    }
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim()).map_err(|_| anyhow!("Unknown log level '{}'", level))
}
