use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::align::tool::{
    resolve_tool_executable, ExternalTool, ToolError, DEFAULT_DNAML_BIN, DEFAULT_MUSCLE_BIN,
    DNAML_ENV_BIN, MUSCLE_ENV_BIN,
};
use crate::core::alignment::{AlignmentError, MultipleAlignment};
use crate::core::record::SequenceRecord;
use crate::parsing::{fasta, phylip, ParseError};
use crate::phylogeny::rename::NumericNames;

/// Files DNAML reads and writes in its working directory
pub const DNAML_INFILE: &str = "infile";
pub const DNAML_OUTTREE: &str = "outtree";
pub const DNAML_OUTFILE: &str = "outfile";
pub const DNAML_SCRIPT: &str = "dnaml.in";

/// Largest random jumble seed before it is made odd
const MAX_SEED_BASE: u64 = 10_000_000_000;

#[derive(Error, Debug)]
pub enum PhylogenyError {
    #[error("Old files exist in {}! Please use --force to overwrite.", dir.display())]
    OldFiles { dir: PathBuf, files: Vec<PathBuf> },

    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Please make sure {} is aligned and in PHYLIP or FASTA format: {source}", path.display())]
    Alignment {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to process {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid alignment: {0}")]
    Shape(#[from] AlignmentError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("DNAML seed must be odd, got {0}")]
    EvenSeed(u64),
}

/// Where the alignment for the tree comes from
#[derive(Debug, Clone)]
pub enum TreeInput {
    /// A ready alignment in relaxed PHYLIP, or aligned FASTA (`.afa`, `.fa`, ...)
    Aligned(PathBuf),
    /// Unaligned reads to align with MUSCLE together with the germline and any natives
    Unaligned {
        sequences: PathBuf,
        germline: SequenceRecord,
        natives: Vec<SequenceRecord>,
    },
}

/// Settings for one DNAML run
#[derive(Debug, Clone)]
pub struct DnamlConfig {
    /// Prefix for intermediate files
    pub project: String,
    pub work_dir: PathBuf,
    pub out_tree: PathBuf,
    pub out_file: PathBuf,
    /// Delete DNAML files left by an earlier run instead of refusing to start
    pub force: bool,
    /// Odd jumble seed; random when unset
    pub seed: Option<u64>,
}

/// Files written by a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnamlOutputs {
    pub tree: PathBuf,
    pub report: PathBuf,
    pub sequences: usize,
    pub germline_position: usize,
    pub seed: u64,
}

/// Random odd seed for DNAML's jumble option
pub fn random_seed() -> u64 {
    rand::thread_rng().gen_range(0..=MAX_SEED_BASE) * 2 + 1
}

/// DNAML menu answers: jumble with `seed` (5 times), global rearrangements,
/// outgroup at `germline_position`, reconstruct ancestors, then run.
pub fn build_script(seed: u64, germline_position: usize) -> String {
    format!("J\n{seed}\n5\nG\nO\n{germline_position}\n5\nY\n")
}

/// Drives MUSCLE (when needed) and DNAML for one lineage tree
#[derive(Debug, Clone)]
pub struct DnamlRunner {
    muscle: ExternalTool,
    dnaml: ExternalTool,
}

impl DnamlRunner {
    pub fn new(muscle: ExternalTool, dnaml: ExternalTool) -> Self {
        Self { muscle, dnaml }
    }

    /// Executables from explicit choices, the environment, or the defaults
    pub fn from_env(muscle: Option<&str>, dnaml: Option<&str>) -> Self {
        Self::new(
            ExternalTool::new(
                resolve_tool_executable(muscle, MUSCLE_ENV_BIN, DEFAULT_MUSCLE_BIN),
                MUSCLE_ENV_BIN,
            ),
            ExternalTool::new(
                resolve_tool_executable(dnaml, DNAML_ENV_BIN, DEFAULT_DNAML_BIN),
                DNAML_ENV_BIN,
            ),
        )
    }

    /// Build the tree and write the renamed-back tree and report.
    ///
    /// # Errors
    ///
    /// Returns `PhylogenyError::OldFiles` if an earlier run's files are present
    /// and `force` is unset, and propagates read, tool, and write failures.
    pub async fn run(
        &self,
        input: &TreeInput,
        config: &DnamlConfig,
    ) -> Result<DnamlOutputs, PhylogenyError> {
        let seed = match config.seed {
            Some(seed) if seed % 2 == 0 => return Err(PhylogenyError::EvenSeed(seed)),
            Some(seed) => seed,
            None => random_seed(),
        };

        clear_old_files(&config.work_dir, config.force)?;

        let alignment = match input {
            TreeInput::Aligned(path) => read_aligned(path)?,
            TreeInput::Unaligned {
                sequences,
                germline,
                natives,
            } => self.align(sequences, germline, natives, config).await?,
        };

        let (renamed, names) = NumericNames::rename(alignment)?;
        let infile = config.work_dir.join(DNAML_INFILE);
        let phylip_text = phylip::write_strict(&renamed).map_err(|source| PhylogenyError::File {
            path: infile.clone(),
            source,
        })?;
        write_text(&infile, &phylip_text).await?;

        let script = build_script(seed, names.germline_position());
        write_text(&config.work_dir.join(DNAML_SCRIPT), &script).await?;

        info!(
            "Running DNAML on {} sequences (outgroup {}, seed {seed})",
            names.len(),
            names.germline_position()
        );
        let mut command = self.dnaml.command();
        command.current_dir(&config.work_dir);
        self.dnaml.run(command, Some(script.as_bytes())).await?;

        revert_into(&names, &config.work_dir.join(DNAML_OUTTREE), &config.out_tree).await?;
        revert_into(&names, &config.work_dir.join(DNAML_OUTFILE), &config.out_file).await?;

        Ok(DnamlOutputs {
            tree: config.out_tree.clone(),
            report: config.out_file.clone(),
            sequences: names.len(),
            germline_position: names.germline_position(),
            seed,
        })
    }

    async fn align(
        &self,
        sequences: &Path,
        germline: &SequenceRecord,
        natives: &[SequenceRecord],
        config: &DnamlConfig,
    ) -> Result<MultipleAlignment, PhylogenyError> {
        if !sequences.exists() {
            return Err(PhylogenyError::MissingFile(sequences.to_path_buf()));
        }

        let mut records = fasta::read_records(sequences).map_err(|source| PhylogenyError::File {
            path: sequences.to_path_buf(),
            source,
        })?;
        records.push(germline.clone());
        records.extend(natives.iter().cloned());

        let to_align = config
            .work_dir
            .join(format!("{}_to_align.fa", config.project));
        fasta::write_records(&to_align, &records).map_err(|source| PhylogenyError::File {
            path: to_align.clone(),
            source,
        })?;

        let aligned = config
            .work_dir
            .join(format!("{}_aligned.afa", config.project));
        let mut command = self.muscle.command();
        command
            .arg("-in")
            .arg(&to_align)
            .arg("-out")
            .arg(&aligned)
            .args(["-maxiters", "2", "-diags", "-gapopen", "-5000.0"]);

        debug!("Aligning {} sequences with MUSCLE", records.len());
        self.muscle.run(command, None).await?;

        fasta::read_alignment(&aligned).map_err(|source| PhylogenyError::File {
            path: aligned,
            source,
        })
    }
}

/// Remove `infile`, `outtree`, and `outfile` from `dir` when forced
///
/// # Errors
///
/// Returns `PhylogenyError::OldFiles` if any exist and `force` is false.
pub fn clear_old_files(dir: &Path, force: bool) -> Result<(), PhylogenyError> {
    let existing: Vec<PathBuf> = [DNAML_INFILE, DNAML_OUTTREE, DNAML_OUTFILE]
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.exists())
        .collect();

    if existing.is_empty() {
        return Ok(());
    }
    if !force {
        return Err(PhylogenyError::OldFiles {
            dir: dir.to_path_buf(),
            files: existing,
        });
    }

    for path in existing {
        debug!("Removing {}", path.display());
        std::fs::remove_file(&path).map_err(|source| PhylogenyError::Io { path, source })?;
    }
    Ok(())
}

/// Read a prepared alignment: aligned FASTA by extension, otherwise relaxed PHYLIP
fn read_aligned(path: &Path) -> Result<MultipleAlignment, PhylogenyError> {
    if !path.exists() {
        return Err(PhylogenyError::MissingFile(path.to_path_buf()));
    }
    if fasta::is_fasta_file(path) {
        return fasta::read_alignment(path).map_err(|source| PhylogenyError::Alignment {
            path: path.to_path_buf(),
            source,
        });
    }

    let text = std::fs::read_to_string(path).map_err(|source| PhylogenyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    phylip::parse_relaxed(&text).map_err(|source| PhylogenyError::Alignment {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_text(path: &Path, text: &str) -> Result<(), PhylogenyError> {
    tokio::fs::write(path, text)
        .await
        .map_err(|source| PhylogenyError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn revert_into(names: &NumericNames, from: &Path, to: &Path) -> Result<(), PhylogenyError> {
    let text = tokio::fs::read_to_string(from)
        .await
        .map_err(|source| PhylogenyError::Io {
            path: from.to_path_buf(),
            source,
        })?;
    write_text(to, &names.revert(&text)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> DnamlConfig {
        DnamlConfig {
            project: "VRC01".to_string(),
            work_dir: dir.path().to_path_buf(),
            out_tree: dir.path().join("VRC01.tree"),
            out_file: dir.path().join("VRC01.dnaml.out"),
            force: false,
            seed: Some(7),
        }
    }

    #[test]
    fn test_build_script() {
        assert_eq!(build_script(7, 3), "J\n7\n5\nG\nO\n3\n5\nY\n");
    }

    #[test]
    fn test_random_seed_is_odd() {
        for _ in 0..100 {
            assert_eq!(random_seed() % 2, 1);
        }
    }

    #[test]
    fn test_old_files_refused_without_force() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DNAML_OUTTREE), "();").unwrap();

        let err = clear_old_files(dir.path(), false).unwrap_err();
        assert!(matches!(err, PhylogenyError::OldFiles { ref files, .. } if files.len() == 1));
        assert!(dir.path().join(DNAML_OUTTREE).exists());
    }

    #[test]
    fn test_old_files_removed_with_force() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DNAML_INFILE), "x").unwrap();
        std::fs::write(dir.path().join(DNAML_OUTFILE), "x").unwrap();

        clear_old_files(dir.path(), true).unwrap();
        assert!(!dir.path().join(DNAML_INFILE).exists());
        assert!(!dir.path().join(DNAML_OUTFILE).exists());
    }

    #[tokio::test]
    async fn test_even_seed_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.seed = Some(4);
        let runner = DnamlRunner::from_env(Some("muscle"), Some("dnaml"));
        let result = runner
            .run(&TreeInput::Aligned(dir.path().join("in.phy")), &config)
            .await;
        assert!(matches!(result, Err(PhylogenyError::EvenSeed(4))));
    }

    #[tokio::test]
    async fn test_aligned_fasta_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ragged.afa");
        std::fs::write(&path, ">read_a\nACGT\n>IGHV1-2*02\nACG\n").unwrap();

        let runner = DnamlRunner::from_env(Some("muscle"), Some("dnaml"));
        let result = runner.run(&TreeInput::Aligned(path), &config(&dir)).await;
        assert!(matches!(result, Err(PhylogenyError::Alignment { .. })));
    }

    #[tokio::test]
    async fn test_unaligned_requires_sequences() {
        let dir = TempDir::new().unwrap();
        let runner = DnamlRunner::from_env(Some("muscle"), Some("dnaml"));
        let input = TreeInput::Unaligned {
            sequences: dir.path().join("missing-collected.fa"),
            germline: SequenceRecord::new("IGHV1-2*02", "ACGT"),
            natives: Vec::new(),
        };
        let result = runner.run(&input, &config(&dir)).await;
        assert!(matches!(result, Err(PhylogenyError::MissingFile(_))));
    }

    /// Stand-in for dnaml: checks the script on stdin, then writes a tree and
    /// report that mention every renamed row
    #[cfg(unix)]
    fn write_fake_dnaml(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-dnaml");
        std::fs::write(
            &path,
            "#!/bin/sh\n\
             script=$(cat)\n\
             test -f infile || exit 2\n\
             echo \"$script\" | grep -q '^O$' || exit 3\n\
             echo '(0000000001:0.1,0000000002:0.2,0000000003:0.0);' > outtree\n\
             printf 'Ancestors\\n0000000003 root\\n' > outfile\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_from_phylip() {
        let dir = TempDir::new().unwrap();
        let tool_dir = TempDir::new().unwrap();
        let fake = write_fake_dnaml(tool_dir.path());

        let phylip_path = dir.path().join("aligned.phy");
        std::fs::write(
            &phylip_path,
            "3 6\nread_a ATG-CC\nread_b ATGACC\nIGHV1-2*02 ATGACC\n",
        )
        .unwrap();

        let runner = DnamlRunner::from_env(Some("muscle"), fake.to_str());
        let config = config(&dir);
        let outputs = runner
            .run(&TreeInput::Aligned(phylip_path), &config)
            .await
            .unwrap();

        assert_eq!(outputs.sequences, 3);
        assert_eq!(outputs.germline_position, 3);
        assert_eq!(outputs.seed, 7);

        let infile = std::fs::read_to_string(dir.path().join(DNAML_INFILE)).unwrap();
        assert!(infile.starts_with(" 3 6\n0000000001ATG-CC\n"));

        let tree = std::fs::read_to_string(&config.out_tree).unwrap();
        assert_eq!(tree, "(read_a:0.1,read_b:0.2,IGHV1-2*02:0.0);\n");
        let report = std::fs::read_to_string(&config.out_file).unwrap();
        assert!(report.contains("IGHV1-2*02 root"));

        let script = std::fs::read_to_string(dir.path().join(DNAML_SCRIPT)).unwrap();
        assert_eq!(script, build_script(7, 3));
    }

    #[tokio::test]
    async fn test_bad_phylip_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reads.phy");
        std::fs::write(&path, ">read_a\nACGT\n").unwrap();

        let runner = DnamlRunner::from_env(Some("muscle"), Some("dnaml"));
        let result = runner.run(&TreeInput::Aligned(path), &config(&dir)).await;
        assert!(matches!(result, Err(PhylogenyError::Alignment { .. })));
    }
}
