//! Maximum-likelihood lineage trees with PHYLIP DNAML.
//!
//! Rows are renamed to ten-digit numbers before DNAML sees them, since strict
//! PHYLIP truncates names at ten characters, and the numbers are mapped back
//! in the tree and report afterwards. The germline row roots the tree.

pub mod dnaml;
pub mod rename;

pub use dnaml::{DnamlConfig, DnamlOutputs, DnamlRunner, PhylogenyError, TreeInput};
pub use rename::NumericNames;
