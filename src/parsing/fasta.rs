//! FASTA reading and writing using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed input.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna`, `.afa` (uncompressed)
//! - any of the above with `.gz` or `.bgz` appended (compressed)

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use noodles::fasta;

use crate::core::alignment::{AlignedRow, MultipleAlignment};
use crate::core::record::SequenceRecord;
use crate::parsing::ParseError;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    for ext in ["fa", "fasta", "fna", "afa"] {
        if path_str.ends_with(&format!(".{ext}.gz")) || path_str.ends_with(&format!(".{ext}.bgz"))
        {
            return true;
        }
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna" | "afa")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read every record of a FASTA file into memory, in file order.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened and `ParseError::Noodles`
/// if a record is malformed. An empty file yields an empty vector.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        let reader = BufReader::new(GzDecoder::new(file));
        read_records_from(reader)
    } else {
        read_records_from(BufReader::new(file))
    }
}

/// Read FASTA records from any buffered reader
///
/// # Errors
///
/// Returns `ParseError::Noodles` if a record is malformed.
pub fn read_records_from<R: BufRead>(reader: R) -> Result<Vec<SequenceRecord>, ParseError> {
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let mut records = Vec::new();

    for result in fasta_reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;
        records.push(from_noodles(&record));
    }

    Ok(records)
}

/// Pass the id of each record to `visit` as it is read, without keeping the
/// records. Returns the number of records seen.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or `visit` fails, and
/// `ParseError::Noodles` if a record is malformed.
pub fn for_each_id<F>(path: &Path, visit: F) -> Result<usize, ParseError>
where
    F: FnMut(&str) -> std::io::Result<()>,
{
    let file = File::open(path)?;
    if is_gzipped(path) {
        for_each_id_from(BufReader::new(GzDecoder::new(file)), visit)
    } else {
        for_each_id_from(BufReader::new(file), visit)
    }
}

fn for_each_id_from<R, F>(reader: R, mut visit: F) -> Result<usize, ParseError>
where
    R: BufRead,
    F: FnMut(&str) -> std::io::Result<()>,
{
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let mut count = 0;

    for result in fasta_reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;
        visit(&String::from_utf8_lossy(record.name()))?;
        count += 1;
    }

    Ok(count)
}

fn from_noodles(record: &fasta::Record) -> SequenceRecord {
    let name = String::from_utf8_lossy(record.name()).to_string();
    let sequence = record.sequence().as_ref().to_vec();
    let converted = SequenceRecord::new(name, sequence);

    match record.description() {
        Some(description) => {
            converted.with_description(String::from_utf8_lossy(description).to_string())
        }
        None => converted,
    }
}

fn to_noodles(record: &SequenceRecord) -> fasta::Record {
    let definition = fasta::record::Definition::new(
        record.id().as_bytes().to_vec(),
        record.description().map(|d| d.as_bytes().to_vec().into()),
    );
    let sequence = fasta::record::Sequence::from(record.sequence().to_vec());
    fasta::Record::new(definition, sequence)
}

/// Write records as FASTA to any writer
///
/// # Errors
///
/// Returns `ParseError::Io` if writing fails.
pub fn write_records_to<'a, W, I>(mut writer: W, records: I) -> Result<(), ParseError>
where
    W: Write,
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    {
        let mut fasta_writer = fasta::io::Writer::new(&mut writer);
        for record in records {
            fasta_writer.write_record(&to_noodles(record))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write records to a FASTA file, replacing any existing file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be created or written.
pub fn write_records<'a, I>(path: &Path, records: I) -> Result<(), ParseError>
where
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    let file = File::create(path)?;
    write_records_to(BufWriter::new(file), records)
}

/// Read an aligned FASTA file (e.g. MUSCLE output) as a multiple alignment
///
/// # Errors
///
/// Returns the read errors of [`read_records`], or `ParseError::InvalidFormat`
/// if the file is empty or its rows differ in length.
pub fn read_alignment(path: &Path) -> Result<MultipleAlignment, ParseError> {
    let rows = read_records(path)?
        .into_iter()
        .map(|record| AlignedRow::new(record.id(), record.sequence()))
        .collect();

    MultipleAlignment::new(rows)
        .map_err(|e| ParseError::InvalidFormat(format!("{}: {e}", path.display())))
}
