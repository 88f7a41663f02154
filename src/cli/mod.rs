//! Command-line interface for sonar.
//!
//! Available commands:
//!
//! - **check-frameshift**: drop reads whose alignment to their assigned
//!   germline V gene has a frameshifting indel
//! - **list-ids**: print the ids of every record in a FASTA file
//! - **dnaml**: build a germline-rooted lineage tree with PHYLIP DNAML
//!
//! ## Usage
//!
//! ```text
//! # Filter 454 reads against the bundled germline library
//! sonar check-frameshift reads.fa good.fa
//!
//! # Custom library, four alignments at a time, JSON summary
//! sonar check-frameshift reads.fa good.fa germline.fa --threads 4 --format json
//!
//! # Tree from collected sequences rooted on IGHV1-2*02
//! sonar dnaml -g 'IGHV1-2*02' -n natives.fa
//! ```

use clap::{Parser, Subcommand};

pub mod dnaml;
pub mod frameshift;
pub mod list_ids;

#[derive(Parser)]
#[command(name = "sonar")]
#[command(author = "Vaccine Research Center")]
#[command(version)]
#[command(about = "Antibody repertoire utilities: frameshift filtering and lineage trees")]
#[command(
    long_about = "sonar processes antibody sequencing reads.\n\nIt can:\n- Remove reads whose alignment to their germline V gene contains a frameshift\n- List the record ids of a FASTA file\n- Build maximum-likelihood lineage trees rooted on the germline with DNAML"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove reads with frameshifts relative to their assigned germline V gene
    CheckFrameshift(frameshift::CheckFrameshiftArgs),

    /// List the ids of all records in a FASTA file
    ListIds(list_ids::ListIdsArgs),

    /// Build a germline-rooted lineage tree with DNAML
    Dnaml(dnaml::DnamlArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
