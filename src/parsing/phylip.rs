//! PHYLIP alignment reading (relaxed) and writing (strict).
//!
//! Relaxed PHYLIP separates the name from the residues by whitespace, so names
//! may be any length. Strict PHYLIP, which DNAML expects, reserves exactly ten
//! columns for the name.
//!
//! Both sequential and interleaved layouts are read: after the first block of
//! named lines, unnamed lines are appended to the rows in rotation.

use crate::core::alignment::{AlignedRow, MultipleAlignment};
use crate::parsing::ParseError;

/// Width of the name field in strict PHYLIP
pub const STRICT_NAME_WIDTH: usize = 10;

/// Parse relaxed PHYLIP text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header is missing or malformed,
/// there are fewer rows than declared, or a row's length differs from the
/// declared width.
pub fn parse_relaxed(text: &str) -> Result<MultipleAlignment, ParseError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("Empty PHYLIP alignment".to_string()))?;
    let (count, width) = parse_header(header)?;

    let mut rows: Vec<AlignedRow> = Vec::with_capacity(count);
    for (i, line) in lines.enumerate() {
        if i < count {
            let line = line.trim_start();
            let split = line.find(char::is_whitespace).unwrap_or(line.len());
            let (name, residues) = line.split_at(split);
            rows.push(AlignedRow::new(name, strip_whitespace(residues)));
        } else {
            rows[i % count]
                .residues
                .extend(strip_whitespace(line));
        }
    }

    if rows.len() != count {
        return Err(ParseError::InvalidFormat(format!(
            "PHYLIP header declares {count} sequences but {} were found",
            rows.len()
        )));
    }

    if let Some(row) = rows.iter().find(|row| row.residues.len() != width) {
        return Err(ParseError::InvalidFormat(format!(
            "PHYLIP sequence '{}' has {} columns, header declares {width}",
            row.id,
            row.residues.len()
        )));
    }

    MultipleAlignment::new(rows).map_err(|e| ParseError::InvalidFormat(e.to_string()))
}

fn parse_header(header: &str) -> Result<(usize, usize), ParseError> {
    let fields: Vec<&str> = header.split_whitespace().collect();
    let invalid = || ParseError::InvalidFormat(format!("Invalid PHYLIP header: {header}"));

    if fields.len() < 2 {
        return Err(invalid());
    }
    let count: usize = fields[0].parse().map_err(|_| invalid())?;
    let width: usize = fields[1].parse().map_err(|_| invalid())?;
    if count == 0 {
        return Err(invalid());
    }
    Ok((count, width))
}

fn strip_whitespace(s: &str) -> Vec<u8> {
    s.bytes().filter(|b| !b.is_ascii_whitespace()).collect()
}

/// Render an alignment as sequential strict PHYLIP
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a name is longer than
/// [`STRICT_NAME_WIDTH`]; truncating would risk two rows sharing a name.
pub fn write_strict(alignment: &MultipleAlignment) -> Result<String, ParseError> {
    let mut out = String::new();
    out.push_str(&format!(" {} {}\n", alignment.len(), alignment.width()));

    for row in alignment.rows() {
        if row.id.len() > STRICT_NAME_WIDTH {
            return Err(ParseError::InvalidFormat(format!(
                "Name '{}' exceeds {STRICT_NAME_WIDTH} characters allowed by strict PHYLIP",
                row.id
            )));
        }
        out.push_str(&format!("{:<width$}", row.id, width = STRICT_NAME_WIDTH));
        out.push_str(&String::from_utf8_lossy(&row.residues));
        out.push('\n');
    }

    Ok(out)
}
