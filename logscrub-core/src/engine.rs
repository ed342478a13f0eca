//! engine.rs - The in-place, line-oriented redaction engine.
//!
//! The engine walks a [`ByteRegion`] one line at a time. For every line it
//! runs each class matcher against the *live* bytes, overwrites any match
//! with the class mask, and flushes just that line's range before moving on.
//! Memory use is bounded by the longest line borrowed from the region and
//! write I/O is bounded by the number of redacted lines.
//!
//! License: MIT OR APACHE 2.0

use std::ops::Range;
use std::time::Instant;

use log::debug;

use crate::errors::ScrubError;
use crate::matcher::{PatternMatcher, SensitiveClass};
use crate::region::ByteRegion;
use crate::result::{format_elapsed, RedactionResult};

/// Applies the compiled class matchers to a region, in place.
#[derive(Debug, Clone, Copy)]
pub struct RedactionEngine<'m> {
    matcher: &'m PatternMatcher,
}

#[derive(Debug, Default)]
struct Counters {
    lines_processed: u64,
    lines_redacted: u64,
    credit_card: u64,
    ssn: u64,
}

impl Counters {
    fn record(&mut self, class: SensitiveClass) {
        match class {
            SensitiveClass::CreditCard => self.credit_card += 1,
            SensitiveClass::Ssn => self.ssn += 1,
        }
    }
}

impl RedactionEngine<'static> {
    /// An engine over the process-wide compiled patterns.
    pub fn shared() -> Result<Self, ScrubError> {
        Ok(Self::new(PatternMatcher::shared()?))
    }
}

impl<'m> RedactionEngine<'m> {
    pub fn new(matcher: &'m PatternMatcher) -> Self {
        Self { matcher }
    }

    /// Redacts every line of `region` and returns the pass statistics.
    ///
    /// `source_id` names the region in log events and errors. Lines are
    /// processed top to bottom; a line is flushed before the next one is read,
    /// so an interrupted pass leaves every earlier line fully redacted.
    pub fn redact<R>(&self, region: &mut R, source_id: &str) -> Result<RedactionResult, ScrubError>
    where
        R: ByteRegion + ?Sized,
    {
        let started = Instant::now();
        debug!("Redacting sensitive information on file {}", source_id);

        let len = region.len();
        let mut counters = Counters::default();
        let mut line_start = 0usize;
        let mut line_number = 1u64;

        while line_start < len {
            let line_end = next_line_end(&*region, line_start)?;
            let line = line_start..line_end;
            let mut line_redacted = false;

            for class in SensitiveClass::ALL {
                // Re-read for every class: an earlier mask may have changed these bytes.
                let span = {
                    let current = region.read(line.clone())?;
                    self.matcher.find(class, current)
                };
                if let Some(span) = span {
                    let absolute = (line_start + span.start)..(line_start + span.end);
                    debug!(
                        "Redacting line {} of file {} containing {} sensitive data. Offset slice [{}, {}]",
                        line_number, source_id, class, absolute.start, absolute.end
                    );
                    apply_mask(region, class, absolute, &line, source_id)?;
                    counters.record(class);
                    line_redacted = true;
                }
            }

            if line_redacted {
                counters.lines_redacted += 1;
                region.flush_range(line.clone())?;
            }

            counters.lines_processed += 1;
            line_start = line_end;
            line_number += 1;
        }

        let result = RedactionResult::new(
            counters.lines_processed,
            counters.lines_redacted,
            counters.credit_card,
            counters.ssn,
            started.elapsed(),
        );

        debug!("Total lines processed for file {} : {}", source_id, result.lines_processed());
        debug!("Total lines redacted for file {} : {}", source_id, result.lines_redacted());
        debug!("Total lines with SSN redacted for file {} : {}", source_id, result.ssn_redactions());
        debug!("Total lines with CC redacted for file {} : {}", source_id, result.credit_card_redactions());
        debug!("Total time spent redacting file {}: {}", source_id, format_elapsed(result.elapsed()));

        Ok(result)
    }
}

/// Offset one past the next line-feed at or after `start`, or the region end.
fn next_line_end<R>(region: &R, start: usize) -> Result<usize, ScrubError>
where
    R: ByteRegion + ?Sized,
{
    let len = region.len();
    let rest = region.read(start..len)?;
    Ok(rest
        .iter()
        .position(|&b| b == b'\n')
        .map_or(len, |pos| start + pos + 1))
}

/// Overwrites `span` with the class mask after checking the layout invariants.
fn apply_mask<R>(
    region: &mut R,
    class: SensitiveClass,
    span: Range<usize>,
    line: &Range<usize>,
    source_id: &str,
) -> Result<(), ScrubError>
where
    R: ByteRegion + ?Sized,
{
    let mask = class.mask();
    let expected = span.end - span.start;
    if mask.len() != expected || span.start < line.start || span.end > line.end {
        return Err(ScrubError::LayoutViolation {
            source_id: source_id.to_string(),
            offset: span.start,
            expected,
            actual: mask.len(),
        });
    }
    region.overwrite(span.start, mask)
}
