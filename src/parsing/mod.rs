//! Parsers and writers for the sequence and alignment formats SONAR touches.
//!
//! - **FASTA** (plain or gzip): reads, germline libraries, aligned MUSCLE output
//! - **Clustal**: `.aln` files written by ClustalW
//! - **PHYLIP**: relaxed input alignments and strict `infile` for DNAML
//!
//! ## Example
//!
//! ```rust,no_run
//! use sonar::parsing::fasta::read_records;
//! use std::path::Path;
//!
//! let records = read_records(Path::new("reads.fa")).unwrap();
//! for record in &records {
//!     println!("{}\t{}", record.id(), record.len());
//! }
//! ```

use thiserror::Error;

pub mod clustal;
pub mod fasta;
pub mod phylip;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),
}
