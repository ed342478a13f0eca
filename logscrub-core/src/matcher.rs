//! matcher.rs - Fixed-grammar matchers for the sensitive-data classes.
//!
//! Each [`SensitiveClass`] has a byte-level pattern and a mask of exactly the
//! same length as any text the pattern can match. Patterns are compiled once
//! per process and shared by every worker through a global cache.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::ops::Range;

use lazy_static::lazy_static;
use log::debug;
use regex::bytes::{Regex, RegexBuilder};

use crate::errors::ScrubError;

/// A category of regulated data with a fixed textual grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensitiveClass {
    /// `CC="dddd-dddd-dddd-dddd"`
    CreditCard,
    /// `SSN="ddd-dd-dddd"`
    Ssn,
}

impl SensitiveClass {
    /// Classes in the order the engine applies them to a line.
    pub const ALL: [SensitiveClass; 2] = [SensitiveClass::CreditCard, SensitiveClass::Ssn];

    pub fn name(self) -> &'static str {
        match self {
            SensitiveClass::CreditCard => "credit_card",
            SensitiveClass::Ssn => "ssn",
        }
    }

    /// Human-readable label used in logs and audit output.
    pub fn label(self) -> &'static str {
        match self {
            SensitiveClass::CreditCard => "Credit Card",
            SensitiveClass::Ssn => "SSN",
        }
    }

    /// The ASCII-only grammar. `[0-9]` rather than `\d` so non-ASCII digits never match.
    pub fn pattern(self) -> &'static str {
        match self {
            SensitiveClass::CreditCard => r#"CC="[0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9]{4}""#,
            SensitiveClass::Ssn => r#"SSN="[0-9]{3}-[0-9]{2}-[0-9]{4}""#,
        }
    }

    /// The replacement text. Its length equals the length of every match.
    pub fn mask(self) -> &'static [u8] {
        match self {
            SensitiveClass::CreditCard => br#"CC="xxxx-xxxx-xxxx-xxxx""#,
            SensitiveClass::Ssn => br#"SSN="xxx-xx-xxxx""#,
        }
    }
}

impl fmt::Display for SensitiveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A compiled matcher for one sensitive-data class.
#[derive(Debug)]
pub struct CompiledPattern {
    pub class: SensitiveClass,
    pub regex: Regex,
}

/// The full set of compiled class matchers.
///
/// Matching is stateless: [`PatternMatcher::find`] borrows the line and never
/// writes to it, so one instance can be shared across threads.
#[derive(Debug)]
pub struct PatternMatcher {
    patterns: Vec<CompiledPattern>,
}

lazy_static! {
    /// Process-wide compiled pattern set. Compilation of the built-in grammars
    /// cannot fail at runtime; the `Result` is kept so a broken grammar surfaces
    /// as an error instead of a panic.
    static ref DEFAULT_MATCHER: Result<PatternMatcher, String> =
        PatternMatcher::compile().map_err(|e| e.to_string());
}

impl PatternMatcher {
    /// Compiles every class in [`SensitiveClass::ALL`].
    pub fn compile() -> Result<Self, ScrubError> {
        debug!("Compiling {} sensitive-data patterns.", SensitiveClass::ALL.len());
        let mut patterns = Vec::with_capacity(SensitiveClass::ALL.len());
        for class in SensitiveClass::ALL {
            let regex = RegexBuilder::new(class.pattern())
                .unicode(false)
                .size_limit(1 << 20)
                .build()
                .map_err(|e| ScrubError::PatternCompilation(class.name().to_string(), e))?;
            debug!("Pattern '{}' compiled successfully.", class.name());
            patterns.push(CompiledPattern { class, regex });
        }
        Ok(Self { patterns })
    }

    /// Returns the shared, lazily compiled matcher.
    pub fn shared() -> Result<&'static PatternMatcher, ScrubError> {
        DEFAULT_MATCHER
            .as_ref()
            .map_err(|msg| ScrubError::Config(format!("built-in patterns failed to compile: {msg}")))
    }

    /// Finds the first token of `class` in `line`, as a line-relative span.
    ///
    /// Only the first match is reported. A second token of the same class on
    /// the same line is left untouched.
    pub fn find(&self, class: SensitiveClass, line: &[u8]) -> Option<Range<usize>> {
        self.patterns
            .iter()
            .find(|p| p.class == class)
            .and_then(|p| p.regex.find(line))
            .map(|m| m.range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> &'static PatternMatcher {
        PatternMatcher::shared().unwrap()
    }

    #[test]
    fn test_masks_have_match_length() {
        let cc = br#"CC="1234-5678-9012-3456""#;
        let ssn = br#"SSN="123-45-6789""#;
        assert_eq!(SensitiveClass::CreditCard.mask().len(), cc.len());
        assert_eq!(SensitiveClass::Ssn.mask().len(), ssn.len());
    }

    #[test]
    fn test_credit_card_span_is_line_relative() {
        let line = b"user=42 CC=\"1234-5678-9012-3456\" action=login\n";
        let span = matcher().find(SensitiveClass::CreditCard, line).unwrap();
        assert_eq!(span, 8..32);
        assert_eq!(&line[span], br#"CC="1234-5678-9012-3456""#);
    }

    #[test]
    fn test_ssn_match() {
        let line = b"SSN=\"123-45-6789\" CC=\"1111-2222-3333-4444\"";
        assert_eq!(matcher().find(SensitiveClass::Ssn, line), Some(0..17));
    }

    #[test]
    fn test_malformed_tokens_do_not_match() {
        let m = matcher();
        assert!(m.find(SensitiveClass::CreditCard, br#"CC="1234-5678-9012-345""#).is_none());
        assert!(m.find(SensitiveClass::CreditCard, br#"CC="1234567890123456""#).is_none());
        assert!(m.find(SensitiveClass::CreditCard, br#"CC=1234-5678-9012-3456"#).is_none());
        assert!(m.find(SensitiveClass::Ssn, br#"SSN="12-345-6789""#).is_none());
        assert!(m.find(SensitiveClass::Ssn, br#"SSN='123-45-6789'"#).is_none());
    }

    #[test]
    fn test_masks_never_match_their_own_grammar() {
        let m = matcher();
        for class in SensitiveClass::ALL {
            assert!(m.find(class, class.mask()).is_none(), "{} mask re-matched", class);
        }
    }

    #[test]
    fn test_only_first_token_per_class_is_reported() {
        let line = br#"SSN="111-11-1111" SSN="222-22-2222""#;
        assert_eq!(matcher().find(SensitiveClass::Ssn, line), Some(0..17));
    }

    #[test]
    fn test_non_ascii_digits_are_rejected() {
        let line = "SSN=\"١٢٣-45-6789\"".as_bytes();
        assert!(matcher().find(SensitiveClass::Ssn, line).is_none());
    }
}
