//! Germline V gene libraries and read-to-germline assignment.
//!
//! A germline library is a FASTA file whose record ids are gene (or allele)
//! names. Reads carry their assignment in the description, e.g.
//! `>read42 V_gene=IGHV1-2*02,J_gene=IGHJ4*02`.
//!
//! When no library is given on the command line, the bundled database
//! directory is used: `$SONAR_GERMDB` if set, otherwise `germDB/` beside the
//! `sonar` executable.

use std::path::PathBuf;

use crate::core::types::Locus;

pub mod store;
pub mod tag;

pub use store::{GermlineError, GermlineLibrary};

/// Environment variable overriding the bundled germline database directory
pub const GERMDB_ENV: &str = "SONAR_GERMDB";

/// Combined V library with the 3' end truncated at the conserved cysteine,
/// which keeps CDR3 mutations from pulling gaps into the alignment
pub const DEFAULT_FRAMESHIFT_LIBRARY: &str = "IgHKLV_cysTruncated.fa";

/// Directory holding the bundled germline libraries
pub fn germline_db_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(GERMDB_ENV) {
        return PathBuf::from(dir);
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("germDB")))
        .unwrap_or_else(|| PathBuf::from("germDB"))
}

/// Default library for frameshift checking
pub fn default_frameshift_library() -> PathBuf {
    germline_db_dir().join(DEFAULT_FRAMESHIFT_LIBRARY)
}

/// Default V gene library for a locus
pub fn locus_library(locus: Locus) -> PathBuf {
    germline_db_dir().join(locus.v_library_file())
}
