//! Parser for ClustalW `.aln` alignment files.
//!
//! ```text
//! CLUSTAL 2.1 multiple sequence alignment
//!
//!
//! germline      ATGACCTTC--AGT 12
//! query         ATGACC-TCAAAGT 13
//!               ******  *  ***
//! ```
//!
//! Blocks repeat until the alignment is exhausted. Consensus lines start with
//! whitespace and are ignored, as are the optional residue counts.

use std::collections::HashMap;

use crate::core::alignment::{AlignedRow, MultipleAlignment};
use crate::parsing::ParseError;

const HEADERS: [&str; 2] = ["CLUSTAL", "MUSCLE"];

/// Parse the text of a Clustal-format alignment
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header is missing, a sequence line
/// has no residues, or the resulting rows differ in length.
pub fn parse_alignment(text: &str) -> Result<MultipleAlignment, ParseError> {
    let mut lines = text.lines().skip_while(|line| line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("Empty Clustal alignment".to_string()))?;
    if !HEADERS.iter().any(|h| header.starts_with(h)) {
        return Err(ParseError::InvalidFormat(format!(
            "Not a Clustal alignment, header was: {header}"
        )));
    }

    let mut rows: Vec<AlignedRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in lines {
        // Blank separators and consensus lines
        if line.trim().is_empty() || line.starts_with(char::is_whitespace) {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(name), Some(residues)) = (fields.next(), fields.next()) else {
            return Err(ParseError::InvalidFormat(format!(
                "Clustal sequence line has no residues: {line}"
            )));
        };

        match index.get(name) {
            Some(&i) => rows[i].residues.extend_from_slice(residues.as_bytes()),
            None => {
                index.insert(name.to_string(), rows.len());
                rows.push(AlignedRow::new(name, residues.as_bytes()));
            }
        }
    }

    MultipleAlignment::new(rows).map_err(|e| ParseError::InvalidFormat(e.to_string()))
}
