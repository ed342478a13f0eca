//! audit.rs - Persists a pass's statistics as a human-readable audit file.
//!
//! One audit file per decompressed input, named `<file><suffix>`. Runs append,
//! so repeated passes over the same input accumulate a history.
//!
//! License: MIT OR APACHE 2.0

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::archive::with_suffix;
use crate::errors::{ScrubError, Stage};
use crate::result::{format_elapsed, RedactionResult};

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Writes [`RedactionResult`]s next to the files they describe.
#[derive(Debug, Clone)]
pub struct AuditReporter {
    suffix: String,
}

impl Default for AuditReporter {
    fn default() -> Self {
        Self::new(".audit")
    }
}

impl AuditReporter {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self { suffix: suffix.into() }
    }

    /// The audit path for a decompressed file.
    fn audit_path(&self, file: &Path) -> PathBuf {
        with_suffix(file, &self.suffix)
    }

    /// Renders the five audit lines for `result`.
    pub fn render(result: &RedactionResult) -> String {
        let lines = [
            format!("Total number of lines processed: {}", result.lines_processed()),
            format!("Total number of lines redacted: {}", result.lines_redacted()),
            format!(
                "Total number of lines with Credit Card data redacted: {}",
                result.credit_card_redactions()
            ),
            format!("Total number of lines with SSN data redacted: {}", result.ssn_redactions()),
            format!("Total time spent redacting: {}", format_elapsed(result.elapsed())),
        ];
        let mut out = String::new();
        for line in lines {
            out.push_str(&line);
            out.push_str(LINE_ENDING);
        }
        out
    }

    /// Appends the audit record for `file` and returns the audit path.
    pub fn append(&self, file: &Path, result: &RedactionResult) -> Result<PathBuf, ScrubError> {
        let path = self.audit_path(file);
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ScrubError::io(Stage::Audit, &path, e))?;
        let mut writer = BufWriter::new(handle);
        writer
            .write_all(Self::render(result).as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| ScrubError::io(Stage::Audit, &path, e))?;
        debug!("Wrote audit metadata to {}", path.display());
        Ok(path)
    }
}
