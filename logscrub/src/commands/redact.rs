//! The `redact` command: runs the batch pipeline and reports per-file outcomes.

use anyhow::{Context, Result};
use log::{error, info};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::PathBuf;

use logscrub_core::{BatchCoordinator, BatchSummary, FileOutcome, RedactionEngine, ScrubConfig, ScrubError};

/// Redacts `files` according to `config` and writes a summary to `out`.
///
/// Returns the batch summary so the caller can pick an exit status. Fails
/// only for errors that stop the whole run (no input, broken patterns).
pub fn run_redact(
    config: ScrubConfig,
    files: &[PathBuf],
    out: &mut dyn Write,
    color: bool,
) -> Result<BatchSummary> {
    if files.is_empty() {
        error!("Terminating processing! Please provide at least one log file to process!");
        return Err(ScrubError::InputMissing.into());
    }

    let engine = RedactionEngine::shared().context("Failed to prepare the redaction engine")?;
    let coordinator = BatchCoordinator::new(config, engine);
    let summary = coordinator.run(files)?;

    for outcome in &summary.outcomes {
        print_outcome(out, outcome, color)?;
    }
    let totals = format!("{} succeeded, {} failed", summary.succeeded(), summary.failed());
    if color && !summary.is_success() {
        writeln!(out, "{}", totals.red())?;
    } else if color {
        writeln!(out, "{}", totals.green())?;
    } else {
        writeln!(out, "{}", totals)?;
    }
    info!("Logscrub run completed: {}.", totals);
    Ok(summary)
}

fn print_outcome(out: &mut dyn Write, outcome: &FileOutcome, color: bool) -> Result<()> {
    match &outcome.outcome {
        Ok(report) => {
            let r = &report.result;
            let marker = if color { "ok".green().to_string() } else { "ok".to_string() };
            writeln!(
                out,
                "[{}] {} -> {} ({}/{} lines redacted, {} credit card, {} SSN)",
                marker,
                outcome.input.display(),
                report.archive.display(),
                r.lines_redacted(),
                r.lines_processed(),
                r.credit_card_redactions(),
                r.ssn_redactions()
            )?;
        }
        Err(e) => {
            let marker = if color { "failed".red().to_string() } else { "failed".to_string() };
            writeln!(out, "[{}] {}: {}", marker, outcome.input.display(), e)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_no_files_is_input_missing() {
        let mut out = Vec::new();
        let err = run_redact(ScrubConfig::default(), &[], &mut out, false).unwrap_err();
        assert!(matches!(err.downcast_ref::<ScrubError>(), Some(ScrubError::InputMissing)));
        assert!(out.is_empty());
    }

    #[test_log::test]
    fn test_failed_file_is_reported_without_color() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.log.gz");
        let mut out = Vec::new();

        let summary = run_redact(ScrubConfig::default(), &[missing], &mut out, false).unwrap();

        assert_eq!(summary.failed(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[failed]"));
        assert!(text.contains("missing.log.gz"));
        assert!(text.ends_with("0 succeeded, 1 failed\n"));
    }
}
