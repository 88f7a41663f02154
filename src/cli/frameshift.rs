//! Check-frameshift command: keep only reads whose alignment to the assigned
//! germline V gene has no frameshifting indel.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use crate::align::tool::{resolve_tool_executable, CLUSTALW_ENV_BIN, DEFAULT_CLUSTALW_BIN};
use crate::align::ClustalAligner;
use crate::cli::OutputFormat;
use crate::filter::batch::{filter_file, BatchConfig, BatchSummary};
use crate::germline::default_frameshift_library;

/// Arguments for the check-frameshift command
#[derive(Args)]
pub struct CheckFrameshiftArgs {
    /// Reads to check (FASTA, optionally gzipped), each with
    /// `V_gene=<gene>` in its description
    pub input: PathBuf,

    /// Where to write the reads that pass
    pub output: PathBuf,

    /// Germline V gene library
    /// [default: $SONAR_GERMDB/IgHKLV_cysTruncated.fa]
    pub db: Option<PathBuf>,

    /// Number of alignments to run at once
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..=256))]
    pub threads: u16,

    /// Give up on an alignment after this many seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// ClustalW executable [default: $SONAR_CLUSTALW, else clustalw]
    #[arg(long)]
    pub clustalw: Option<String>,
}

/// Execute the check-frameshift command
///
/// # Errors
///
/// Returns an error if the input or germline library is missing or
/// unreadable, or the output cannot be written. Problems with individual reads
/// are logged and counted, not returned.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CheckFrameshiftArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let library = args.db.clone().unwrap_or_else(default_frameshift_library);
    let config = BatchConfig {
        max_concurrent: usize::from(args.threads),
        timeout: args.timeout.map(Duration::from_secs),
    };
    let aligner = ClustalAligner::new(resolve_tool_executable(
        args.clustalw.as_deref(),
        CLUSTALW_ENV_BIN,
        DEFAULT_CLUSTALW_BIN,
    ))
    .with_timeout(config.timeout);

    if verbose {
        eprintln!("Germline library: {}", library.display());
        eprintln!(
            "Aligner: {} ({} at a time)",
            aligner.executable(),
            config.max_concurrent
        );
    }

    let rt = tokio::runtime::Runtime::new()?;
    let summary = rt.block_on(filter_file(
        &args.input,
        &args.output,
        &library,
        Arc::new(aligner),
        &config,
    ))?;

    match format {
        OutputFormat::Text => print_text(&summary, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Tsv => print_tsv(&summary),
    }

    Ok(())
}

fn print_text(summary: &BatchSummary, verbose: bool) {
    println!("{summary}");
    if verbose {
        eprintln!("   No V_gene tag: {}", summary.missing_tag);
        eprintln!("   Unknown germline: {}", summary.unknown_germline);
        eprintln!("   Alignment failed: {}", summary.alignment_failed);
        eprintln!("   Frameshift: {}", summary.frameshift);
    }
}

fn print_tsv(summary: &BatchSummary) {
    println!("total\tgood\tmissing_tag\tunknown_germline\talignment_failed\tframeshift");
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        summary.total,
        summary.good,
        summary.missing_tag,
        summary.unknown_germline,
        summary.alignment_failed,
        summary.frameshift
    );
}
