use thiserror::Error;

/// Symbol used by every supported aligner for an alignment gap
pub const GAP: u8 = b'-';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Aligned rows differ in length: '{first}' has {first_len} columns, '{other}' has {other_len}")]
    RaggedRows {
        first: String,
        first_len: usize,
        other: String,
        other_len: usize,
    },

    #[error("Expected {expected} aligned sequences, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("Alignment contains no sequences")]
    Empty,
}

/// One gapped row of an alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRow {
    pub id: String,
    pub residues: Vec<u8>,
}

impl AlignedRow {
    pub fn new(id: impl Into<String>, residues: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            residues: residues.into(),
        }
    }
}

/// A set of equal-length aligned rows, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleAlignment {
    rows: Vec<AlignedRow>,
}

impl MultipleAlignment {
    /// Build an alignment, checking that every row has the same number of columns.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::Empty` for no rows and `AlignmentError::RaggedRows`
    /// when two rows differ in length.
    pub fn new(rows: Vec<AlignedRow>) -> Result<Self, AlignmentError> {
        let first = rows.first().ok_or(AlignmentError::Empty)?;
        if let Some(other) = rows
            .iter()
            .find(|row| row.residues.len() != first.residues.len())
        {
            return Err(AlignmentError::RaggedRows {
                first: first.id.clone(),
                first_len: first.residues.len(),
                other: other.id.clone(),
                other_len: other.residues.len(),
            });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AlignedRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of alignment columns
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.residues.len())
    }
}

/// Germline and candidate rows of one pairwise alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentPair {
    reference: AlignedRow,
    candidate: AlignedRow,
}

impl AlignmentPair {
    /// # Errors
    ///
    /// Returns `AlignmentError::RaggedRows` if the rows are not the same length.
    pub fn new(reference: AlignedRow, candidate: AlignedRow) -> Result<Self, AlignmentError> {
        if reference.residues.len() != candidate.residues.len() {
            return Err(AlignmentError::RaggedRows {
                first: reference.id,
                first_len: reference.residues.len(),
                other: candidate.id,
                other_len: candidate.residues.len(),
            });
        }
        Ok(Self {
            reference,
            candidate,
        })
    }

    /// Take the two rows of a pairwise alignment, reference first.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::RowCount` unless the alignment has exactly two rows.
    pub fn from_alignment(alignment: MultipleAlignment) -> Result<Self, AlignmentError> {
        let found = alignment.len();
        let mut rows = alignment.into_rows().into_iter();
        match (rows.next(), rows.next(), rows.next()) {
            (Some(reference), Some(candidate), None) => Self::new(reference, candidate),
            _ => Err(AlignmentError::RowCount { expected: 2, found }),
        }
    }

    pub fn reference(&self) -> &AlignedRow {
        &self.reference
    }

    pub fn candidate(&self) -> &AlignedRow {
        &self.candidate
    }

    /// Rename both rows, e.g. from the placeholder ids handed to an aligner
    #[must_use]
    pub fn with_ids(mut self, reference_id: &str, candidate_id: &str) -> Self {
        self.reference.id = reference_id.to_string();
        self.candidate.id = candidate_id.to_string();
        self
    }

    pub fn width(&self) -> usize {
        self.reference.residues.len()
    }
}
