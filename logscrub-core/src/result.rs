//! Per-pass statistics produced by the redaction engine.

use std::time::Duration;

/// The aggregate record of one redaction pass.
///
/// Fields are private so a result cannot be altered once the engine hands it
/// out. `lines_redacted` counts lines, not tokens: a line carrying both a
/// credit-card and an SSN token adds one to it and one to each class counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RedactionResult {
    lines_processed: u64,
    lines_redacted: u64,
    credit_card_redactions: u64,
    ssn_redactions: u64,
    elapsed: Duration,
}

impl RedactionResult {
    pub fn new(
        lines_processed: u64,
        lines_redacted: u64,
        credit_card_redactions: u64,
        ssn_redactions: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            lines_processed,
            lines_redacted,
            credit_card_redactions,
            ssn_redactions,
            elapsed,
        }
    }

    pub fn lines_processed(&self) -> u64 {
        self.lines_processed
    }

    pub fn lines_redacted(&self) -> u64 {
        self.lines_redacted
    }

    pub fn credit_card_redactions(&self) -> u64 {
        self.credit_card_redactions
    }

    pub fn ssn_redactions(&self) -> u64 {
        self.ssn_redactions
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total tokens masked across both classes.
    pub fn total_redactions(&self) -> u64 {
        self.credit_card_redactions + self.ssn_redactions
    }
}

/// Renders a duration as `H:MM:SS`, with a six-digit fraction when non-zero.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs / 60) % 60, secs % 60);
    let micros = elapsed.subsec_micros();
    if micros == 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}:{:02}.{:06}", hours, minutes, seconds, micros)
    }
}
