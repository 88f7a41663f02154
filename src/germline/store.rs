use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::record::SequenceRecord;
use crate::germline::tag::strip_allele;
use crate::parsing::{fasta, ParseError};

#[derive(Error, Debug)]
pub enum GermlineError {
    #[error("Germline library not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read germline library {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Germline gene name -> reference sequence
///
/// Loaded once per run and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct GermlineLibrary {
    genes: HashMap<String, SequenceRecord>,
}

impl GermlineLibrary {
    /// Build a library from records; a later record with the same id replaces
    /// an earlier one
    pub fn from_records(records: impl IntoIterator<Item = SequenceRecord>) -> Self {
        let mut genes = HashMap::new();
        for record in records {
            if let Some(previous) = genes.insert(record.id().to_string(), record) {
                warn!(
                    "Duplicate germline gene {} in library; keeping the last",
                    previous.id()
                );
            }
        }
        Self { genes }
    }

    /// Load a germline library from a FASTA file (plain or gzip)
    ///
    /// # Errors
    ///
    /// Returns `GermlineError::MissingFile` if the path does not exist and
    /// `GermlineError::Parse` if it cannot be read as FASTA.
    pub fn load(path: &Path) -> Result<Self, GermlineError> {
        if !path.exists() {
            return Err(GermlineError::MissingFile(path.to_path_buf()));
        }

        let records = fasta::read_records(path).map_err(|source| GermlineError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let library = Self::from_records(records);
        debug!(
            "Loaded {} germline genes from {}",
            library.len(),
            path.display()
        );
        Ok(library)
    }

    /// Exact lookup by gene name
    pub fn get(&self, name: &str) -> Option<&SequenceRecord> {
        self.genes.get(name)
    }

    /// Look up a gene assignment as written in a read's `V_gene=` tag.
    ///
    /// Tries the assignment verbatim, then without its allele suffix, so a
    /// library keyed by gene (`IGHV1-2`) still serves reads tagged with an
    /// allele (`IGHV1-2*02`).
    pub fn resolve(&self, assignment: &str) -> Option<&SequenceRecord> {
        self.get(assignment).or_else(|| {
            let gene = strip_allele(assignment);
            if gene == assignment {
                None
            } else {
                self.get(gene)
            }
        })
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
