//! SONAR project directories and the per-project command history.
//!
//! A project is any directory laid out as
//!
//! ```text
//! <project>/
//!   work/{annotate,lineage,phylo,internal}
//!   output/{sequences/{amino_acid,nucleotide},tables,plots,logs,rates}
//! ```
//!
//! Commands run from a project home append their command line and exit status
//! to `output/logs/command_history.log`.

pub mod layout;
pub mod log;

pub use layout::ProjectLayout;
pub use log::CommandLog;
