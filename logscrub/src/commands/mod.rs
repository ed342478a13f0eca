//! Command implementations for the logscrub binary.

pub mod redact;
