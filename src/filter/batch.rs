//! Batch driver for frameshift filtering.
//!
//! Each read moves through `parse tag -> look up germline -> align -> classify`
//! and ends up kept or skipped with a reason. Alignments run as independent
//! tokio tasks, at most `max_concurrent` at a time; outcomes are stored by input
//! position and folded in input order, so the output never depends on which
//! alignment finished first.

use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::{AcquireError, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::align::{AlignError, PairwiseAligner};
use crate::core::record::SequenceRecord;
use crate::filter::frameshift::classify;
use crate::germline::store::{GermlineError, GermlineLibrary};
use crate::germline::tag::parse_v_gene;
use crate::parsing::{fasta, ParseError};

/// Mode of the filtered FASTA on unix
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

/// Why a single read was left out of the output. None of these stop the batch.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{id} has no V_gene assignment in its description. Skipping...")]
    MissingTag { id: String },

    #[error("{id} might be misassigned; {gene} is not in my germline library. Skipping...")]
    UnknownGermline { id: String, gene: String },

    #[error("Error in alignment of {id} (will skip): {source}")]
    AlignmentFailed {
        id: String,
        #[source]
        source: AlignError,
    },

    #[error("{id} has a likely frameshift relative to {gene}")]
    FrameshiftDetected { id: String, gene: String },
}

/// Errors that abort the whole run
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error(transparent)]
    Germline(#[from] GermlineError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Alignment worker pool closed: {0}")]
    WorkerPool(#[from] AcquireError),
}

#[derive(Debug)]
pub enum RecordOutcome {
    Kept,
    Skipped(RecordError),
}

/// Settings for one filtering run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Alignments allowed to run at once; 1 processes reads strictly in turn
    pub max_concurrent: usize,
    /// Upper bound on a single alignment; a read that exceeds it is skipped as
    /// a failed alignment
    pub timeout: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            timeout: None,
        }
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub good: usize,
    pub missing_tag: usize,
    pub unknown_germline: usize,
    pub alignment_failed: usize,
    pub frameshift: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.total += 1;
        match outcome {
            RecordOutcome::Kept => self.good += 1,
            RecordOutcome::Skipped(RecordError::MissingTag { .. }) => self.missing_tag += 1,
            RecordOutcome::Skipped(RecordError::UnknownGermline { .. }) => {
                self.unknown_germline += 1;
            }
            RecordOutcome::Skipped(RecordError::AlignmentFailed { .. }) => {
                self.alignment_failed += 1;
            }
            RecordOutcome::Skipped(RecordError::FrameshiftDetected { .. }) => self.frameshift += 1,
        }
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Total: {}, Good: {}", self.total, self.good)
    }
}

/// Kept reads, in input order, and the run's counts
#[derive(Debug, Default)]
pub struct BatchReport {
    pub kept: Vec<SequenceRecord>,
    pub summary: BatchSummary,
}

/// Filter reads in memory.
///
/// # Errors
///
/// Only `BatchError::WorkerPool`, which cannot happen while this function owns
/// the semaphore; every per-read problem becomes a skipped outcome instead.
pub async fn filter_records<A>(
    records: Vec<SequenceRecord>,
    library: &GermlineLibrary,
    aligner: Arc<A>,
    config: &BatchConfig,
) -> Result<BatchReport, BatchError>
where
    A: PairwiseAligner + 'static,
{
    let mut outcomes: Vec<Option<RecordOutcome>> = records.iter().map(|_| None).collect();
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, record) in records.iter().enumerate() {
        let Some(assignment) = record.description().and_then(parse_v_gene) else {
            outcomes[index] = Some(RecordOutcome::Skipped(RecordError::MissingTag {
                id: record.id().to_string(),
            }));
            continue;
        };

        let Some(germline) = library.resolve(assignment) else {
            outcomes[index] = Some(RecordOutcome::Skipped(RecordError::UnknownGermline {
                id: record.id().to_string(),
                gene: assignment.to_string(),
            }));
            continue;
        };

        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let aligner = Arc::clone(&aligner);
        let germline = germline.clone();
        let candidate = record.clone();
        let timeout = config.timeout;
        tasks.spawn(async move {
            let outcome =
                align_and_classify(aligner.as_ref(), &germline, &candidate, timeout).await;
            drop(permit);
            (index, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => error!("Alignment task failed: {e}"),
        }
    }

    let mut report = BatchReport::default();
    for (record, outcome) in records.into_iter().zip(outcomes) {
        let outcome = outcome.unwrap_or_else(|| {
            RecordOutcome::Skipped(RecordError::AlignmentFailed {
                id: record.id().to_string(),
                source: AlignError::Aborted("alignment task did not complete".to_string()),
            })
        });
        report.summary.record(&outcome);

        match outcome {
            RecordOutcome::Kept => report.kept.push(record),
            RecordOutcome::Skipped(reason @ RecordError::FrameshiftDetected { .. }) => {
                debug!("{reason}");
            }
            RecordOutcome::Skipped(reason) => warn!("{reason}"),
        }
    }

    Ok(report)
}

async fn align_and_classify<A: PairwiseAligner>(
    aligner: &A,
    germline: &SequenceRecord,
    candidate: &SequenceRecord,
    timeout: Option<Duration>,
) -> RecordOutcome {
    let aligned = match timeout {
        Some(limit) => tokio::time::timeout(limit, aligner.align(germline, candidate))
            .await
            .unwrap_or_else(|_| Err(AlignError::TimedOut(limit))),
        None => aligner.align(germline, candidate).await,
    };

    let pair = match aligned {
        Ok(pair) => pair,
        Err(source) => {
            return RecordOutcome::Skipped(RecordError::AlignmentFailed {
                id: candidate.id().to_string(),
                source,
            })
        }
    };

    if classify(&pair).is_keep() {
        RecordOutcome::Kept
    } else {
        RecordOutcome::Skipped(RecordError::FrameshiftDetected {
            id: candidate.id().to_string(),
            gene: germline.id().to_string(),
        })
    }
}

/// Filter a FASTA file of reads against a germline library and write the kept
/// reads to `output`.
///
/// The output is staged next to its destination and renamed into place once
/// every read has been processed, so it never holds a partial result.
///
/// # Errors
///
/// Returns `BatchError::MissingFile` if the input does not exist,
/// `BatchError::Germline` if the library cannot be loaded, and
/// `BatchError::Read`/`BatchError::Write` for FASTA I/O failures.
pub async fn filter_file<A>(
    input: &Path,
    output: &Path,
    library_path: &Path,
    aligner: Arc<A>,
    config: &BatchConfig,
) -> Result<BatchSummary, BatchError>
where
    A: PairwiseAligner + 'static,
{
    if !input.exists() {
        return Err(BatchError::MissingFile(input.to_path_buf()));
    }

    let library = GermlineLibrary::load(library_path)?;
    let records = fasta::read_records(input).map_err(|source| BatchError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    info!("Checking {} reads from {}", records.len(), input.display());

    let report = filter_records(records, &library, aligner, config).await?;
    write_output(output, &report.kept).map_err(|source| BatchError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(report.summary)
}

fn write_output(path: &Path, records: &[SequenceRecord]) -> Result<(), ParseError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let staged = NamedTempFile::new_in(dir)?;
    fasta::write_records_to(BufWriter::new(staged.as_file()), records)?;
    // Temp files start owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(OUTPUT_MODE))?;
    }
    staged.persist(path).map_err(|e| ParseError::Io(e.error))?;
    Ok(())
}
