//! List-ids command: one record id per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;

use crate::cli::OutputFormat;
use crate::parsing::fasta;

/// Arguments for the list-ids command
#[derive(Args)]
pub struct ListIdsArgs {
    /// FASTA file to read (optionally gzipped)
    pub fasta: PathBuf,

    /// Write the list here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the list-ids command
///
/// # Errors
///
/// Returns an error if the FASTA cannot be read or the list cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ListIdsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !args.fasta.exists() {
        anyhow::bail!("File not found: {}", args.fasta.display());
    }

    let count = match (&args.output, format) {
        (Some(path), _) => write_list(&args.fasta, path)?,
        (None, OutputFormat::Json) => {
            // Ids only; the sequences are never held
            let mut ids = Vec::new();
            let count = fasta::for_each_id(&args.fasta, |id| {
                ids.push(id.to_string());
                Ok(())
            })?;
            println!("{}", serde_json::to_string_pretty(&ids)?);
            count
        }
        (None, OutputFormat::Text | OutputFormat::Tsv) => {
            let stdout = std::io::stdout();
            stream_ids(&args.fasta, stdout.lock())?
        }
    };

    if verbose {
        eprintln!("{count} records in {}", args.fasta.display());
    }

    Ok(())
}

fn write_list(fasta: &Path, path: &Path) -> anyhow::Result<usize> {
    let file = File::create(path)?;
    stream_ids(fasta, BufWriter::new(file))
}

/// Write each id of `fasta` to `writer` as soon as its record is read
fn stream_ids<W: Write>(fasta: &Path, mut writer: W) -> anyhow::Result<usize> {
    let count = fasta::for_each_id(fasta, |id| writeln!(writer, "{id}"))?;
    writer.flush()?;
    Ok(count)
}
