use crate::core::alignment::{AlignmentPair, GAP};
use crate::core::types::{FilterDecision, Verdict};

/// Length of a codon; indels of whole codons keep the reading frame
pub const CODON: usize = 3;

/// Classify a germline/read alignment.
///
/// Leading and trailing gaps are ignored in both rows, as are internal gap runs
/// whose length is a whole number of codons. Any other internal gap run is an
/// out-of-frame indel and the read is discarded.
pub fn classify(pair: &AlignmentPair) -> FilterDecision {
    let shifted =
        has_frameshift(&pair.reference().residues) || has_frameshift(&pair.candidate().residues);

    let verdict = if shifted {
        Verdict::Discard
    } else {
        Verdict::Keep
    };
    FilterDecision::new(&pair.candidate().id, verdict)
}

/// True if the aligned row has an internal gap run not divisible by [`CODON`]
pub fn has_frameshift(row: &[u8]) -> bool {
    let Some(start) = row.iter().position(|&b| b != GAP) else {
        return false;
    };
    let Some(end) = row.iter().rposition(|&b| b != GAP) else {
        return false;
    };

    row[start..=end]
        .split(|&b| b != GAP)
        .any(|run| run.len() % CODON != 0)
}
