use std::sync::OnceLock;

use regex::Regex;

/// Marker that precedes the assigned V gene in a record description
pub const V_GENE_TAG: &str = "V_gene=";

fn v_gene_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"{V_GENE_TAG}([^,\s]+)")).unwrap_or_else(|e| panic!("invalid V_gene pattern: {e}"))
    })
}

/// Extract the assigned V gene (allele included) from a record description.
///
/// The value runs from `V_gene=` up to the next comma or whitespace. Returns
/// `None` when the tag is missing or empty.
///
/// ```
/// use sonar::germline::tag::parse_v_gene;
///
/// assert_eq!(parse_v_gene("read1 V_gene=IGHV1-2*02,J_gene=IGHJ4*02"), Some("IGHV1-2*02"));
/// assert_eq!(parse_v_gene("read1 J_gene=IGHJ4*02"), None);
/// ```
pub fn parse_v_gene(description: &str) -> Option<&str> {
    v_gene_pattern()
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Drop the allele suffix from a gene assignment: `IGHV1-2*02` -> `IGHV1-2`
pub fn strip_allele(gene: &str) -> &str {
    gene.split_once('*').map_or(gene, |(name, _)| name)
}
