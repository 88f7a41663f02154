//! # sonar
//!
//! Tools for antibody repertoire sequencing data.
//!
//! Pyrosequencing platforms such as 454 leave homopolymer indels in their
//! reads, and an indel that is not a multiple of three shifts the reading
//! frame of everything downstream. `sonar` aligns each read against the
//! germline V gene it was assigned to and keeps only reads whose alignment is
//! free of frameshifting gaps.
//!
//! ## Features
//!
//! - **Frameshift filtering**: ClustalW pairwise alignment per read, with
//!   bounded concurrency and deterministic output order
//! - **Germline libraries**: FASTA-backed lookup with allele fallback
//! - **Lineage trees**: MUSCLE + PHYLIP DNAML driver rooted on the germline
//! - **Project logs**: command history under `output/logs` of a project
//!
//! ## Example
//!
//! ```rust
//! use sonar::core::alignment::{AlignedRow, AlignmentPair};
//! use sonar::filter::classify;
//!
//! let pair = AlignmentPair::new(
//!     AlignedRow::new("IGHV1-2*02", "ATGAACC"),
//!     AlignedRow::new("read1", "ATG-ACC"),
//! )
//! .unwrap();
//! assert!(!classify(&pair).is_keep());
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Sequence records, alignments, and verdicts
//! - [`parsing`]: FASTA, ClustalW, and PHYLIP formats
//! - [`germline`]: Germline libraries and V gene tags
//! - [`align`]: External aligners behind the [`align::PairwiseAligner`] trait
//! - [`filter`]: Frameshift rule and batch driver
//! - [`phylogeny`]: DNAML lineage trees
//! - [`project`]: Project directories and command history
//! - [`cli`]: Command-line interface implementation

pub mod align;
pub mod cli;
pub mod core;
pub mod filter;
pub mod germline;
pub mod parsing;
pub mod phylogeny;
pub mod project;

// Re-export commonly used types for convenience
pub use crate::core::types::*;
pub use align::{ClustalAligner, PairwiseAligner};
pub use filter::batch::{filter_file, filter_records, BatchConfig, BatchSummary};
pub use germline::GermlineLibrary;
pub use crate::core::record::SequenceRecord;
