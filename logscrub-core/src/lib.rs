// logscrub-core/src/lib.rs
//! # logscrub Core Library
//!
//! `logscrub-core` redacts credit-card and SSN tokens from very large log
//! files in place. A file is memory-mapped read-write, scanned one line at a
//! time, and every matched token is overwritten with a mask of the same byte
//! length. Only the lines that changed are flushed back, so write I/O tracks
//! the number of redactions rather than the file size, and resident memory
//! does not grow with the file.
//!
//! ## Modules
//!
//! * `matcher`: Compiled fixed-grammar matchers for each [`SensitiveClass`].
//! * `region`: The [`ByteRegion`] trait, a range-checked mutable byte buffer.
//! * `engine`: The [`RedactionEngine`], which walks a region and masks tokens.
//! * `session`: [`FileSession`] and [`MappedFile`], scoped read-write mappings.
//! * `result`: The immutable [`RedactionResult`] record.
//! * `archive`: gzip decompression and recompression around a pass.
//! * `audit`: The [`AuditReporter`], which appends results to `.audit` files.
//! * `batch`: The [`BatchCoordinator`] worker pool.
//! * `config`: [`ScrubConfig`] loading and validation.
//! * `errors`: The [`ScrubError`] taxonomy.
//!
//! ## Usage Example
//!
//! ```rust
//! use logscrub_core::RedactionEngine;
//!
//! fn main() -> Result<(), logscrub_core::ScrubError> {
//!     let engine = RedactionEngine::shared()?;
//!     let mut buf = b"user=42 CC=\"1234-5678-9012-3456\" action=login\n".to_vec();
//!
//!     let result = engine.redact(&mut buf, "example")?;
//!
//!     assert_eq!(buf, b"user=42 CC=\"xxxx-xxxx-xxxx-xxxx\" action=login\n");
//!     assert_eq!(result.credit_card_redactions(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`ScrubError`]. Configuration loading returns
//! `anyhow::Result` so file and parse context can be attached.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod archive;
pub mod audit;
pub mod batch;
pub mod config;
pub mod engine;
pub mod errors;
pub mod matcher;
pub mod region;
pub mod result;
pub mod session;

/// Re-exports the configuration type and its env var names.
pub use config::{ScrubConfig, CONFIG_ENV_VAR, LOG_FILE_ENV_VAR, LOG_LEVEL_ENV_VAR, WORKERS_ENV_VAR};

/// Re-exports the error taxonomy.
pub use errors::{ScrubError, Stage};

pub use matcher::{PatternMatcher, SensitiveClass};
pub use region::ByteRegion;
pub use engine::RedactionEngine;
pub use session::{FileSession, MappedFile};
pub use result::{format_elapsed, RedactionResult};
pub use audit::AuditReporter;

/// Re-exports the batch driver and its outcome types.
pub use batch::{BatchCoordinator, BatchSummary, FileOutcome, PassReport};
