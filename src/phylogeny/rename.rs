use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::core::alignment::{AlignedRow, AlignmentError, MultipleAlignment};
use crate::parsing::phylip::STRICT_NAME_WIDTH;

fn numeric_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\d{10}").unwrap_or_else(|e| panic!("invalid numeric name pattern: {e}"))
    })
}

fn germline_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(IG|VH|VK|VL|HV|KV|LV)")
            .unwrap_or_else(|e| panic!("invalid germline name pattern: {e}"))
    })
}

/// Whether a sequence id looks like a germline gene name
pub fn looks_like_germline(id: &str) -> bool {
    germline_name_pattern().is_match(id)
}

/// Original ids of an alignment whose rows were renamed `0000000001`, `0000000002`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericNames {
    originals: Vec<String>,
    germline_position: usize,
}

impl NumericNames {
    /// Replace every row id with its zero-padded 1-based index.
    ///
    /// The germline position is the 1-based index of the last row whose id
    /// looks like a germline gene, or 1 if none does.
    ///
    /// # Errors
    ///
    /// Returns an error only if the alignment cannot be rebuilt, which renaming
    /// alone never causes.
    pub fn rename(alignment: MultipleAlignment) -> Result<(MultipleAlignment, Self), AlignmentError> {
        let mut originals = Vec::with_capacity(alignment.len());
        let mut germline_position = 1;

        let rows = alignment
            .into_rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let number = i + 1;
                if looks_like_germline(&row.id) {
                    germline_position = number;
                }
                originals.push(row.id);
                AlignedRow::new(numeric_name(number), row.residues)
            })
            .collect();

        let renamed = MultipleAlignment::new(rows)?;
        Ok((
            renamed,
            Self {
                originals,
                germline_position,
            },
        ))
    }

    /// 1-based position of the germline row, used as the DNAML outgroup
    pub fn germline_position(&self) -> usize {
        self.germline_position
    }

    /// Original id for a 1-based number
    pub fn lookup(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.originals.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Restore original ids in DNAML output.
    ///
    /// Every ten-digit run that maps to a renamed row is replaced; numbers
    /// outside the alignment are left as they are.
    pub fn revert(&self, text: &str) -> String {
        numeric_name_pattern()
            .replace_all(text, |caps: &Captures| {
                let digits = &caps[0];
                digits
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| self.lookup(n))
                    .unwrap_or(digits)
                    .to_string()
            })
            .into_owned()
    }
}

fn numeric_name(number: usize) -> String {
    format!("{number:0width$}", width = STRICT_NAME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alignment(ids: &[&str]) -> MultipleAlignment {
        MultipleAlignment::new(ids.iter().map(|id| AlignedRow::new(*id, "ACGT")).collect()).unwrap()
    }

    #[test]
    fn test_rename_rows() {
        let (renamed, names) =
            NumericNames::rename(alignment(&["read_a", "IGHV1-2*02", "VRC01"])).unwrap();

        let ids: Vec<&str> = renamed.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0000000001", "0000000002", "0000000003"]);
        assert_eq!(names.len(), 3);
        assert_eq!(names.germline_position(), 2);
        assert_eq!(names.lookup(3), Some("VRC01"));
        assert_eq!(names.lookup(0), None);
        assert_eq!(names.lookup(4), None);
    }

    #[test]
    fn test_germline_position_defaults_to_first() {
        let (_, names) = NumericNames::rename(alignment(&["read_a", "read_b"])).unwrap();
        assert_eq!(names.germline_position(), 1);
    }

    #[test]
    fn test_last_germline_like_id_wins() {
        let (_, names) =
            NumericNames::rename(alignment(&["IGHV1-2*02", "read_a", "VH1-2"])).unwrap();
        assert_eq!(names.germline_position(), 3);
    }

    #[test]
    fn test_revert_tree() {
        let (_, names) = NumericNames::rename(alignment(&["read_a", "IGHV1-2*02"])).unwrap();
        let tree = "(0000000001:0.02,0000000002:0.0);\n";
        assert_eq!(names.revert(tree), "(read_a:0.02,IGHV1-2*02:0.0);\n");
    }

    #[test]
    fn test_revert_leaves_unknown_numbers() {
        let (_, names) = NumericNames::rename(alignment(&["read_a"])).unwrap();
        assert_eq!(
            names.revert("0000000001 0000000009 12345"),
            "read_a 0000000009 12345"
        );
    }
}
