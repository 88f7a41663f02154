//! Core data types shared by the filtering and phylogeny pipelines.
//!
//! - [`SequenceRecord`]: an id, optional description, and raw nucleotide sequence
//! - [`AlignmentPair`]: germline and candidate rows of a pairwise alignment
//! - [`MultipleAlignment`]: equal-length rows produced by an external aligner
//! - [`Verdict`], [`FilterDecision`]: frameshift classification results
//! - [`Locus`]: immunoglobulin locus used to choose a germline library
//!
//! ## Gaps
//!
//! All aligners we drive (ClustalW, MUSCLE, DNAML via PHYLIP) write gaps as `-`.
//! Input FASTA sequences are passed to the aligners exactly as read, so a
//! literal `-` in a read survives into its [`AlignedRow`].

pub mod alignment;
pub mod record;
pub mod types;

pub use alignment::{AlignedRow, AlignmentError, AlignmentPair, MultipleAlignment, GAP};
pub use record::SequenceRecord;
pub use types::{FilterDecision, Locus, Verdict};
