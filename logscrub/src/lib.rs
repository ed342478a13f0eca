// logscrub/src/lib.rs
//! # logscrub CLI Application
//!
//! Command-line front end for `logscrub-core`: argument parsing, the process
//! logging context, and the `redact` command that drives the batch worker pool.

pub mod cli;
pub mod commands;
pub mod logger;

pub use commands::redact::run_redact;
