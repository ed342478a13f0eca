// logscrub-core/tests/batch_tests.rs
//! Integration tests for the gzip batch pipeline.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use test_log::test;

use logscrub_core::{BatchCoordinator, RedactionEngine, ScrubConfig, ScrubError};

fn write_gz(path: &Path, content: &str) -> Result<()> {
    let mut enc = GzEncoder::new(File::create(path)?, Compression::default());
    enc.write_all(content.as_bytes())?;
    enc.finish()?;
    Ok(())
}

fn read_gz(path: &Path) -> Result<String> {
    let mut text = String::new();
    MultiGzDecoder::new(File::open(path)?).read_to_string(&mut text)?;
    Ok(text)
}

fn coordinator(workers: usize) -> Result<BatchCoordinator<'static>> {
    let config = ScrubConfig {
        workers: Some(workers),
        ..ScrubConfig::default()
    };
    Ok(BatchCoordinator::new(config, RedactionEngine::shared()?))
}

#[test]
fn test_single_archive_pipeline() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("app.log.gz");
    write_gz(&archive, "user=42 CC=\"1234-5678-9012-3456\" action=login\nplain\n")?;
    let original_bytes = fs::read(&archive)?;

    let summary = coordinator(1)?.run(&[archive.clone()])?;

    assert!(summary.is_success());
    let report = summary.outcomes[0].outcome.as_ref().map_err(|e| anyhow::anyhow!("{e}"))?;
    assert_eq!(report.decompressed, dir.path().join("app.log"));
    assert_eq!(report.archive, dir.path().join("app.log.redacted.gz"));
    assert_eq!(report.audit, dir.path().join("app.log.audit"));
    assert_eq!(report.result.credit_card_redactions(), 1);
    assert_eq!(report.result.lines_processed(), 2);

    assert_eq!(fs::read(&archive)?, original_bytes);
    assert!(!report.decompressed.exists());
    assert_eq!(
        read_gz(&report.archive)?,
        "user=42 CC=\"xxxx-xxxx-xxxx-xxxx\" action=login\nplain\n"
    );

    let audit = fs::read_to_string(&report.audit)?;
    let lines: Vec<&str> = audit.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Total number of lines processed: 2");
    assert_eq!(lines[1], "Total number of lines redacted: 1");
    assert_eq!(lines[2], "Total number of lines with Credit Card data redacted: 1");
    assert_eq!(lines[3], "Total number of lines with SSN data redacted: 0");
    assert!(lines[4].starts_with("Total time spent redacting: 0:00:"));
    Ok(())
}

#[test]
fn test_failure_does_not_abort_siblings() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let good_a = dir.path().join("a.log.gz");
    let broken = dir.path().join("broken.log.gz");
    let good_b = dir.path().join("b.log.gz");
    write_gz(&good_a, "SSN=\"123-45-6789\"\n")?;
    fs::write(&broken, b"definitely not gzip")?;
    write_gz(&good_b, "SSN=\"123-45-6789\" CC=\"1111-2222-3333-4444\"\n")?;

    let inputs: Vec<PathBuf> = vec![good_a.clone(), broken.clone(), good_b.clone()];
    let summary = coordinator(3)?.run(&inputs)?;

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    for (outcome, input) in summary.outcomes.iter().zip(&inputs) {
        assert_eq!(&outcome.input, input);
    }
    assert!(matches!(
        summary.outcomes[1].outcome,
        Err(ScrubError::DecompressionFailure { .. })
    ));
    assert!(!dir.path().join("broken.log.audit").exists());
    assert!(!dir.path().join("broken.log.redacted.gz").exists());

    assert_eq!(read_gz(&dir.path().join("a.log.redacted.gz"))?, "SSN=\"xxx-xx-xxxx\"\n");
    assert_eq!(
        read_gz(&dir.path().join("b.log.redacted.gz"))?,
        "SSN=\"xxx-xx-xxxx\" CC=\"xxxx-xxxx-xxxx-xxxx\"\n"
    );
    Ok(())
}

#[test]
fn test_many_files_on_small_pool() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut inputs = Vec::new();
    for i in 0..8 {
        let path = dir.path().join(format!("part-{i}.log.gz"));
        write_gz(&path, &format!("row={i} CC=\"1234-5678-9012-3456\"\nrow={i} ok\n"))?;
        inputs.push(path);
    }

    let summary = coordinator(2)?.run(&inputs)?;

    assert!(summary.is_success());
    for outcome in &summary.outcomes {
        let report = outcome.outcome.as_ref().map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(report.result.lines_redacted(), 1);
        assert!(report.archive.exists());
    }
    Ok(())
}

#[test]
fn test_existing_output_fails_that_pass_only() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("app.log.gz");
    write_gz(&archive, "SSN=\"123-45-6789\"\n")?;
    fs::write(dir.path().join("app.log.redacted.gz"), b"previous run")?;

    let summary = coordinator(1)?.run(&[archive])?;

    assert_eq!(summary.failed(), 1);
    assert!(matches!(
        summary.outcomes[0].outcome,
        Err(ScrubError::IoFailure { stage: logscrub_core::Stage::Compress, .. })
    ));
    assert_eq!(fs::read(dir.path().join("app.log.redacted.gz"))?, b"previous run");
    assert!(!dir.path().join("app.log.audit").exists());
    Ok(())
}

#[test]
fn test_duplicated_input_runs_once() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("big.log.gz");
    let line = "SSN=\"123-45-6789\" CC=\"1234-5678-9012-3456\"\n";
    write_gz(&archive, &line.repeat(20_000))?;

    let inputs = vec![archive.clone(), archive.clone(), dir.path().join(".").join("big.log.gz")];
    let summary = coordinator(3)?.run(&inputs)?;

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 2);
    let report = summary.outcomes[0].outcome.as_ref().map_err(|e| anyhow::anyhow!("{e}"))?;
    assert_eq!(report.result.lines_processed(), 20_000);
    assert_eq!(report.result.lines_redacted(), 20_000);
    assert_eq!(report.result.credit_card_redactions(), 20_000);
    assert_eq!(report.result.ssn_redactions(), 20_000);
    for outcome in &summary.outcomes[1..] {
        match &outcome.outcome {
            Err(ScrubError::DuplicateTarget { target, first, .. }) => {
                assert_eq!(target.file_name(), Some(OsStr::new("big.log")));
                assert_eq!(first, &archive);
            }
            other => panic!("expected a duplicate target failure, got {other:?}"),
        }
    }

    let redacted = read_gz(&report.archive)?;
    assert!(!redacted.contains("1234-5678"));
    assert!(!redacted.contains("123-45"));
    assert_eq!(
        redacted,
        "SSN=\"xxx-xx-xxxx\" CC=\"xxxx-xxxx-xxxx-xxxx\"\n".repeat(20_000)
    );
    let audit = fs::read_to_string(dir.path().join("big.log.audit"))?;
    assert_eq!(audit.lines().count(), 5);
    Ok(())
}

// Case-insensitive filesystems would store both fixtures in one file.
#[cfg(target_os = "linux")]
#[test]
fn test_extension_case_variants_share_a_target() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let lower = dir.path().join("a.log.gz");
    let upper = dir.path().join("a.log.GZ");
    write_gz(&lower, "CC=\"1234-5678-9012-3456\"\n")?;
    write_gz(&upper, "SSN=\"123-45-6789\"\n")?;

    let summary = coordinator(2)?.run(&[lower, upper.clone()])?;

    assert_eq!(summary.succeeded(), 1);
    assert!(summary.outcomes[0].outcome.is_ok());
    assert!(matches!(
        &summary.outcomes[1].outcome,
        Err(ScrubError::DuplicateTarget { path, .. }) if path == &upper
    ));
    assert_eq!(read_gz(&dir.path().join("a.log.redacted.gz"))?, "CC=\"xxxx-xxxx-xxxx-xxxx\"\n");
    Ok(())
}

#[test]
fn test_existing_plain_file_is_left_alone() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("app.log.gz");
    let plain = dir.path().join("app.log");
    write_gz(&archive, "SSN=\"123-45-6789\"\n")?;
    fs::write(&plain, "kept by the operator\n")?;

    let summary = coordinator(1)?.run(&[archive])?;

    assert!(matches!(
        summary.outcomes[0].outcome,
        Err(ScrubError::DecompressionFailure { .. })
    ));
    assert_eq!(fs::read_to_string(&plain)?, "kept by the operator\n");
    assert!(!dir.path().join("app.log.redacted.gz").exists());
    assert!(!dir.path().join("app.log.audit").exists());
    Ok(())
}
