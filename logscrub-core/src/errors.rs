//! errors.rs - Custom error types for the logscrub-core library.
//!
//! Every failure a redaction pass can hit is a variant of [`ScrubError`], so the
//! batch layer can report it per file without aborting sibling passes.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The step of a pass an I/O failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Open,
    Map,
    Flush,
    Decompress,
    Compress,
    Audit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Open => "open",
            Stage::Map => "map",
            Stage::Flush => "flush",
            Stage::Decompress => "decompress",
            Stage::Compress => "compress",
            Stage::Audit => "audit",
        };
        f.write_str(name)
    }
}

/// This enum represents all possible error types in the `logscrub-core` library.
///
/// `#[non_exhaustive]` keeps downstream matches from breaking when new
/// variants are added.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    #[error("No input files supplied; nothing to redact")]
    InputMissing,

    #[error("Failed to decompress '{}': {source}", path.display())]
    DecompressionFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot map '{}' on this platform: {reason}", path.display())]
    UnsupportedPlatform { path: PathBuf, reason: String },

    #[error("'{}' is not a regular, seekable file", path.display())]
    NotSeekable { path: PathBuf },

    #[error("Layout violation in '{source_id}' at offset {offset}: mask is {actual} bytes but the matched span is {expected} bytes")]
    LayoutViolation {
        source_id: String,
        offset: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Byte range {start}..{end} is outside a region of {len} bytes")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("I/O failure during {stage} of '{}': {source}", path.display())]
    IoFailure {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compile pattern '{0}': {1}")]
    PatternCompilation(String, regex::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Worker panicked while processing '{}'", path.display())]
    WorkerPanicked { path: PathBuf },

    #[error("'{}' decompresses to '{}', which '{}' earlier in this batch already uses", path.display(), target.display(), first.display())]
    DuplicateTarget {
        path: PathBuf,
        target: PathBuf,
        first: PathBuf,
    },
}

impl ScrubError {
    /// Shorthand for wrapping an `io::Error` raised at a given stage.
    pub fn io(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrubError::IoFailure {
            stage,
            path: path.into(),
            source,
        }
    }

    /// The stage a failure belongs to, where one applies.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ScrubError::IoFailure { stage, .. } => Some(*stage),
            ScrubError::DecompressionFailure { .. } | ScrubError::DuplicateTarget { .. } => {
                Some(Stage::Decompress)
            }
            ScrubError::UnsupportedPlatform { .. } | ScrubError::NotSeekable { .. } => Some(Stage::Map),
            ScrubError::LayoutViolation { .. } | ScrubError::RangeOutOfBounds { .. } => Some(Stage::Flush),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_failure_message_names_stage_and_path() {
        let err = ScrubError::io(
            Stage::Flush,
            "/tmp/app.log",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        let msg = err.to_string();
        assert!(msg.contains("flush"));
        assert!(msg.contains("/tmp/app.log"));
        assert!(msg.contains("disk full"));
        assert_eq!(err.stage(), Some(Stage::Flush));
    }

    #[test]
    fn test_duplicate_target_names_both_inputs() {
        let err = ScrubError::DuplicateTarget {
            path: PathBuf::from("logs/app.log.GZ"),
            target: PathBuf::from("logs/app.log"),
            first: PathBuf::from("logs/app.log.gz"),
        };
        let msg = err.to_string();
        assert!(msg.contains("logs/app.log.GZ"));
        assert!(msg.contains("'logs/app.log'"));
        assert!(msg.contains("logs/app.log.gz"));
        assert_eq!(err.stage(), Some(Stage::Decompress));
    }

    #[test]
    fn test_layout_violation_is_loud() {
        let err = ScrubError::LayoutViolation {
            source_id: "app.log".to_string(),
            offset: 42,
            expected: 24,
            actual: 23,
        };
        assert_eq!(
            err.to_string(),
            "Layout violation in 'app.log' at offset 42: mask is 23 bytes but the matched span is 24 bytes"
        );
    }
}
