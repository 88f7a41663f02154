//! Pairwise alignment of reads against their germline gene.
//!
//! The [`PairwiseAligner`] trait is the seam between the batch driver and the
//! external aligner. [`ClustalAligner`] is the production implementation; tests
//! substitute an in-memory aligner.
//!
//! Each call is independent: one failed alignment never affects another, and
//! every temporary file a call creates is gone when the call returns.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::core::alignment::{AlignmentError, AlignmentPair};
use crate::core::record::SequenceRecord;
use crate::parsing::ParseError;

pub mod clustal;
pub mod tool;

pub use clustal::ClustalAligner;
pub use tool::{ExternalTool, ToolError};

#[derive(Error, Debug)]
pub enum AlignError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Failed to prepare alignment input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable aligner output: {0}")]
    Parse(#[from] ParseError),

    #[error("Aligner output is not a pairwise alignment: {0}")]
    Shape(#[from] AlignmentError),

    #[error("Alignment task aborted: {0}")]
    Aborted(String),

    #[error("Alignment did not finish within {} ms", .0.as_millis())]
    TimedOut(Duration),
}

/// Aligns one candidate read to one germline sequence
pub trait PairwiseAligner: Send + Sync {
    /// Align `candidate` against `reference`.
    ///
    /// The returned pair carries the reference row first and uses the ids of
    /// the two input records.
    fn align(
        &self,
        reference: &SequenceRecord,
        candidate: &SequenceRecord,
    ) -> impl Future<Output = Result<AlignmentPair, AlignError>> + Send;
}
