use std::path::{Path, PathBuf};

/// Standard directory tree of a SONAR project, rooted at the project home.
///
/// Nothing here creates directories; callers check for what exists and fall
/// back to the current directory when the tree is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub home: PathBuf,
    pub work: PathBuf,
    pub out: PathBuf,

    pub annotate: PathBuf,
    pub lineage: PathBuf,
    pub phylo: PathBuf,
    pub internal: PathBuf,

    pub seq: PathBuf,
    pub tables: PathBuf,
    pub plots: PathBuf,
    pub logs: PathBuf,
    pub rates: PathBuf,

    pub aa: PathBuf,
    pub nt: PathBuf,
}

impl ProjectLayout {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let work = home.join("work");
        let out = home.join("output");
        let seq = out.join("sequences");

        Self {
            annotate: work.join("annotate"),
            lineage: work.join("lineage"),
            phylo: work.join("phylo"),
            internal: work.join("internal"),
            tables: out.join("tables"),
            plots: out.join("plots"),
            logs: out.join("logs"),
            rates: out.join("rates"),
            aa: seq.join("amino_acid"),
            nt: seq.join("nucleotide"),
            seq,
            work,
            out,
            home,
        }
    }

    /// Layout rooted at the working directory
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn from_current_dir() -> std::io::Result<Self> {
        std::env::current_dir().map(Self::new)
    }

    /// Project name: the last component of the home directory
    pub fn name(&self) -> String {
        self.home
            .file_name()
            .map_or_else(|| "sonar".to_string(), |n| n.to_string_lossy().to_string())
    }

    /// Command history file, present only in projects that have `output/logs`
    pub fn command_history(&self) -> PathBuf {
        self.logs.join("command_history.log")
    }

    /// Use `dir` if it exists, otherwise the current directory
    pub fn existing_or_cwd(dir: &Path) -> PathBuf {
        if dir.is_dir() {
            dir.to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }
}
