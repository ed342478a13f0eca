//! Configuration management for `logscrub-core`.
//!
//! [`ScrubConfig`] is deserialized from YAML, resolved from a small list of
//! candidate locations, and then overridden by `LOGSCRUB_*` environment
//! variables. Every field has a default, so running without any config file
//! is the normal case.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ScrubError;

/// Env var naming an explicit config file. The file must exist when set.
pub const CONFIG_ENV_VAR: &str = "LOGSCRUB_CONFIG";
pub const LOG_FILE_ENV_VAR: &str = "LOGSCRUB_LOG_FILE";
pub const LOG_LEVEL_ENV_VAR: &str = "LOGSCRUB_LOG_LEVEL";
pub const WORKERS_ENV_VAR: &str = "LOGSCRUB_WORKERS";

const LOCAL_CONFIG_FILE: &str = "logscrub.yaml";

/// Runtime settings for a redaction run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Append-only process log.
    pub log_file: PathBuf,
    /// Level filter for the process log (`error` .. `trace`).
    pub log_level: String,
    /// Worker pool size. `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Appended to the decompressed file name to form the redacted archive.
    pub output_suffix: String,
    /// Appended to the decompressed file name to form the audit file.
    pub audit_suffix: String,
    /// gzip level, 0-9.
    pub compression_level: u32,
    /// Keep the redacted plain-text file next to the redacted archive.
    pub keep_decompressed: bool,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("redacted.log"),
            log_level: "debug".to_string(),
            workers: None,
            output_suffix: ".redacted.gz".to_string(),
            audit_suffix: ".audit".to_string(),
            compression_level: 6,
            keep_decompressed: false,
        }
    }
}

impl ScrubConfig {
    /// Loads a configuration from a YAML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading logscrub config from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ScrubConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolves the config file, applies environment overrides and validates.
    ///
    /// Lookup order: `$LOGSCRUB_CONFIG`, `./logscrub.yaml`,
    /// `<config_dir>/logscrub/config.yaml`, built-in defaults.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(explicit) => {
                let path = PathBuf::from(explicit);
                if !path.is_file() {
                    return Err(anyhow!(
                        "{} points to '{}', which does not exist",
                        CONFIG_ENV_VAR,
                        path.display()
                    ));
                }
                Self::load_from_file(&path)?
            }
            None => match config_candidate_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => {
                    info!("Using config file {}", path.display());
                    Self::load_from_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `LOGSCRUB_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ScrubError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(log_file) = lookup(LOG_FILE_ENV_VAR) {
            self.log_file = PathBuf::from(log_file);
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV_VAR) {
            self.log_level = level;
        }
        if let Some(workers) = lookup(WORKERS_ENV_VAR) {
            let parsed = workers.trim().parse::<usize>().map_err(|e| {
                ScrubError::Config(format!("{} must be a positive integer, got '{}': {}", WORKERS_ENV_VAR, workers, e))
            })?;
            self.workers = Some(parsed);
        }
        Ok(())
    }

    /// Rejects settings that would break the pass pipeline.
    pub fn validate(&self) -> Result<(), ScrubError> {
        if self.workers == Some(0) {
            return Err(ScrubError::Config("workers must be at least 1".to_string()));
        }
        if self.compression_level > 9 {
            return Err(ScrubError::Config(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        if self.output_suffix.is_empty() || self.audit_suffix.is_empty() {
            return Err(ScrubError::Config("output_suffix and audit_suffix must not be empty".to_string()));
        }
        if self.output_suffix == ".gz" {
            return Err(ScrubError::Config(
                "output_suffix '.gz' would overwrite the input archive".to_string(),
            ));
        }
        if self.output_suffix == self.audit_suffix {
            return Err(ScrubError::Config("output_suffix and audit_suffix must differ".to_string()));
        }
        Ok(())
    }

    /// The effective pool size for `jobs` files.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let available = std::thread::available_parallelism().map_or(1, |n| n.get());
        self.workers.unwrap_or(available).min(jobs).max(1)
    }
}

/// Candidate config file locations, most specific first.
pub fn config_candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("logscrub").join("config.yaml"));
    }
    paths
}
