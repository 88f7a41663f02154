//! Frameshift filtering of germline-assigned reads.
//!
//! Reads from 454 and other pyrosequencing platforms carry homopolymer
//! indels that shift the reading frame. Each read is aligned to its assigned
//! germline V gene and dropped if the alignment holds an indel that is not a
//! whole number of codons.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use sonar::align::ClustalAligner;
//! use sonar::filter::batch::{filter_file, BatchConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let summary = filter_file(
//!     Path::new("reads.fa"),
//!     Path::new("good.fa"),
//!     Path::new("germDB/IgHKLV_cysTruncated.fa"),
//!     Arc::new(ClustalAligner::from_env()),
//!     &BatchConfig::default(),
//! )
//! .await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod frameshift;

pub use batch::{BatchConfig, BatchError, BatchSummary, RecordError, RecordOutcome};
pub use frameshift::classify;
