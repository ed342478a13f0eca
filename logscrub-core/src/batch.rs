//! batch.rs - Runs one redaction pass per input archive on a worker pool.
//!
//! Workers pull one archive at a time from a shared job queue and report
//! back over a result channel. Nothing mutable is shared between workers:
//! each pass owns its files and mapping, and the compiled matcher is
//! read-only. A failing pass is recorded and its siblings keep going.
//!
//! License: MIT OR APACHE 2.0

use std::collections::hash_map::{Entry, HashMap};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crossbeam_channel::unbounded;
use log::{debug, error, info, warn};

use crate::archive;
use crate::audit::AuditReporter;
use crate::config::ScrubConfig;
use crate::engine::RedactionEngine;
use crate::errors::ScrubError;
use crate::result::RedactionResult;
use crate::session::FileSession;

/// Everything a successful pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub input: PathBuf,
    pub decompressed: PathBuf,
    pub archive: PathBuf,
    pub audit: PathBuf,
    pub result: RedactionResult,
}

/// The outcome of one input, successful or not.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub outcome: Result<PassReport, ScrubError>,
}

/// Per-file outcomes, in the order the inputs were given.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Drives decompress, redact, recompress and report for every input.
#[derive(Debug)]
pub struct BatchCoordinator<'m> {
    config: ScrubConfig,
    engine: RedactionEngine<'m>,
    reporter: AuditReporter,
}

impl<'m> BatchCoordinator<'m> {
    pub fn new(config: ScrubConfig, engine: RedactionEngine<'m>) -> Self {
        let reporter = AuditReporter::new(config.audit_suffix.clone());
        Self { config, engine, reporter }
    }

    /// Runs every input and waits for all passes to finish.
    ///
    /// Returns [`ScrubError::InputMissing`] when `inputs` is empty; individual
    /// pass failures are reported inside the summary instead.
    ///
    /// Inputs that would decompress to a file an earlier input already
    /// decompresses to fail with [`ScrubError::DuplicateTarget`] and are never
    /// dispatched, so no two passes touch the same file.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<BatchSummary, ScrubError> {
        if inputs.is_empty() {
            return Err(ScrubError::InputMissing);
        }

        let mut slots: Vec<Option<Result<PassReport, ScrubError>>> = inputs.iter().map(|_| None).collect();
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
        let mut jobs: Vec<(usize, &Path)> = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            if let Some(target) = archive::decompressed_path(input) {
                match claimed.entry(target_key(&target)) {
                    Entry::Occupied(first) => {
                        warn!(
                            "Skipping {}: it decompresses to {} like {}.",
                            input.display(),
                            target.display(),
                            first.get().display()
                        );
                        slots[index] = Some(Err(ScrubError::DuplicateTarget {
                            path: input.clone(),
                            target,
                            first: first.get().to_path_buf(),
                        }));
                        continue;
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(input.as_path());
                    }
                }
            }
            jobs.push((index, input.as_path()));
        }

        let workers = self.config.worker_count(jobs.len());
        info!("Starting logs processing: {} file(s) on {} worker(s).", inputs.len(), workers);

        let (job_tx, job_rx) = unbounded::<(usize, &Path)>();
        let (result_tx, result_rx) = unbounded::<(usize, Result<PassReport, ScrubError>)>();
        for job in jobs {
            if job_tx.send(job).is_err() {
                break;
            }
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for worker in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, input) in job_rx.iter() {
                        debug!("Worker {} picked up {}", worker, input.display());
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_pass(input)))
                            .unwrap_or_else(|_| {
                                Err(ScrubError::WorkerPanicked {
                                    path: input.to_path_buf(),
                                })
                            });
                        if result_tx.send((index, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        for (index, outcome) in result_rx.iter() {
            slots[index] = Some(outcome);
        }

        let outcomes = inputs
            .iter()
            .zip(slots)
            .map(|(input, slot)| FileOutcome {
                input: input.clone(),
                outcome: slot.unwrap_or_else(|| Err(ScrubError::WorkerPanicked { path: input.clone() })),
            })
            .collect();
        let summary = BatchSummary { outcomes };
        info!(
            "Finished logs processing: {} succeeded, {} failed.",
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    /// One full pass over a single archive.
    ///
    /// No audit file is written unless redaction and recompression both succeed.
    pub fn run_pass(&self, input: &Path) -> Result<PassReport, ScrubError> {
        debug!("Starting processing on file {}", input.display());
        self.try_pass(input).inspect_err(|e| {
            let stage = e.stage().map_or_else(|| "setup".to_string(), |s| s.to_string());
            error!("Processing of {} failed during {}: {}", input.display(), stage, e);
        })
    }

    fn try_pass(&self, input: &Path) -> Result<PassReport, ScrubError> {
        let decompressed = archive::decompress(input)?;
        let result = FileSession::redact(&decompressed, &self.engine)?;
        let archive = archive::compress(
            &decompressed,
            &self.config.output_suffix,
            self.config.compression_level,
            self.config.keep_decompressed,
        )?;
        let audit = self.reporter.append(&decompressed, &result)?;
        info!(
            "Redacted {}: {} of {} line(s), {} credit card, {} SSN.",
            input.display(),
            result.lines_redacted(),
            result.lines_processed(),
            result.credit_card_redactions(),
            result.ssn_redactions()
        );
        Ok(PassReport {
            input: input.to_path_buf(),
            decompressed,
            archive,
            audit,
            result,
        })
    }
}

/// Compares decompressed targets by the canonical form of their directory,
/// so `./app.log.gz` and `app.log.gz` collide.
fn target_key(target: &Path) -> PathBuf {
    let (Some(parent), Some(name)) = (target.parent(), target.file_name()) else {
        return target.to_path_buf();
    };
    let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
    fs::canonicalize(parent)
        .map(|dir| dir.join(name))
        .unwrap_or_else(|_| target.to_path_buf())
}
