//! Dnaml command: germline-rooted maximum-likelihood tree for a lineage.
//!
//! Run from a project home so the defaults land in the project tree:
//! intermediate files in `work/phylo`, the tree in `output/`, and the DNAML
//! report in `output/logs/`. Outside a project everything goes to the current
//! directory.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Args};
use tracing::info;

use crate::cli::OutputFormat;
use crate::core::record::SequenceRecord;
use crate::core::types::Locus;
use crate::germline::{locus_library, GermlineLibrary};
use crate::parsing::fasta;
use crate::phylogeny::{DnamlConfig, DnamlOutputs, DnamlRunner, TreeInput};
use crate::project::ProjectLayout;

/// Arguments for the dnaml command
#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "germline"])))]
pub struct DnamlArgs {
    /// Aligned sequences: PHYLIP (sequential or interleaved) or aligned FASTA
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Germline V gene to root the tree; the sequences are aligned with MUSCLE
    #[arg(short, long)]
    pub germline: Option<String>,

    /// Sequences to align with the germline
    /// [default: output/sequences/nucleotide/<project>-collected.fa]
    #[arg(long)]
    pub seqs: Option<PathBuf>,

    /// Locus whose bundled V library holds the germline gene
    #[arg(long, value_enum, default_value_t = Locus::Heavy)]
    pub locus: Locus,

    /// Custom germline V library (overrides --locus)
    #[arg(long)]
    pub lib: Option<PathBuf>,

    /// Native antibody sequences to add to the tree
    #[arg(short, long)]
    pub natives: Option<PathBuf>,

    /// Where to write the tree [default: output/<project>.tree]
    #[arg(long)]
    pub outtree: Option<PathBuf>,

    /// Where to write the DNAML report [default: output/logs/<project>.dnaml.out]
    #[arg(long)]
    pub outfile: Option<PathBuf>,

    /// Overwrite files left in the work directory by a previous run
    #[arg(long)]
    pub force: bool,

    /// Odd seed for DNAML's jumble option [default: random]
    #[arg(long, value_parser = parse_odd_seed)]
    pub seed: Option<u64>,

    /// MUSCLE executable [default: $SONAR_MUSCLE, else muscle]
    #[arg(long)]
    pub muscle: Option<String>,

    /// DNAML executable [default: $SONAR_DNAML, else dnaml]
    #[arg(long)]
    pub dnaml: Option<String>,
}

fn parse_odd_seed(value: &str) -> Result<u64, String> {
    let seed: u64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a positive integer"))?;
    if seed % 2 == 0 {
        return Err(format!("{seed} is even; DNAML requires an odd seed"));
    }
    Ok(seed)
}

/// Execute the dnaml command
///
/// # Errors
///
/// Returns an error if the germline gene is not in the library, an input is
/// missing, old DNAML files block the run, or MUSCLE/DNAML fail.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: DnamlArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let layout = ProjectLayout::from_current_dir()?;
    let project = layout.name();

    if !layout.phylo.is_dir() {
        info!("No work directory found, temporary files will be placed in current directory.");
    }
    let config = DnamlConfig {
        work_dir: ProjectLayout::existing_or_cwd(&layout.phylo),
        out_tree: args.outtree.clone().unwrap_or_else(|| {
            if layout.out.is_dir() {
                layout.out.join(format!("{project}.tree"))
            } else {
                PathBuf::from(format!("{project}.tree"))
            }
        }),
        out_file: args.outfile.clone().unwrap_or_else(|| {
            if layout.logs.is_dir() {
                layout.logs.join(format!("{project}.dnaml.out"))
            } else {
                PathBuf::from(format!("{project}.dnaml.out"))
            }
        }),
        force: args.force,
        seed: args.seed,
        project,
    };

    let input = match (&args.input, &args.germline) {
        (Some(path), _) => TreeInput::Aligned(path.clone()),
        (None, Some(gene)) => TreeInput::Unaligned {
            sequences: args.seqs.clone().unwrap_or_else(|| {
                layout.nt.join(format!("{}-collected.fa", config.project))
            }),
            germline: load_germline(&args, gene)?,
            natives: load_natives(&args)?,
        },
        (None, None) => anyhow::bail!("You must specify either --input or --germline"),
    };

    if verbose {
        eprintln!("Work directory: {}", config.work_dir.display());
    }

    let runner = DnamlRunner::from_env(args.muscle.as_deref(), args.dnaml.as_deref());
    let rt = tokio::runtime::Runtime::new()?;
    let outputs = rt.block_on(runner.run(&input, &config))?;

    match format {
        OutputFormat::Text => print_text(&outputs, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outputs)?),
        OutputFormat::Tsv => {
            println!("tree\treport\tsequences\tgermline_position\tseed");
            println!(
                "{}\t{}\t{}\t{}\t{}",
                outputs.tree.display(),
                outputs.report.display(),
                outputs.sequences,
                outputs.germline_position,
                outputs.seed
            );
        }
    }

    Ok(())
}

fn load_germline(args: &DnamlArgs, gene: &str) -> anyhow::Result<SequenceRecord> {
    let library_path = args
        .lib
        .clone()
        .filter(|path| path.is_file())
        .unwrap_or_else(|| locus_library(args.locus));
    let library = GermlineLibrary::load(&library_path)?;

    library.get(gene).cloned().with_context(|| {
        format!(
            "Specified germline gene ({gene}) is not present in the {} library!",
            library_path.display()
        )
    })
}

fn load_natives(args: &DnamlArgs) -> anyhow::Result<Vec<SequenceRecord>> {
    match &args.natives {
        Some(path) => fasta::read_records(path)
            .with_context(|| format!("Failed to read native sequences from {}", path.display())),
        None => {
            info!("No native sequences specified; tree will only include NGS sequences.");
            Ok(Vec::new())
        }
    }
}

fn print_text(outputs: &DnamlOutputs, verbose: bool) {
    if verbose {
        eprintln!(
            "{} sequences, germline at position {}, seed {}",
            outputs.sequences, outputs.germline_position, outputs.seed
        );
    }
    println!(
        "Output in {} and {}",
        outputs.tree.display(),
        outputs.report.display()
    );
}
