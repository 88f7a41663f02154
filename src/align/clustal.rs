use std::path::PathBuf;
use std::time::Duration;

use tracing::trace;

use crate::align::tool::{ExternalTool, CLUSTALW_ENV_BIN, DEFAULT_CLUSTALW_BIN};
use crate::align::{AlignError, PairwiseAligner};
use crate::core::alignment::AlignmentPair;
use crate::core::record::SequenceRecord;
use crate::parsing::{clustal, fasta};

/// Placeholder ids written to the aligner input. ClustalW truncates and
/// rewrites unusual names, so real ids are restored after parsing.
const REFERENCE_ID: &str = "germline";
const CANDIDATE_ID: &str = "query";

const INPUT_FILE: &str = "pair.fa";
const OUTPUT_FILE: &str = "pair.aln";
const WORKDIR_PREFIX: &str = "sonar-clustal-";

/// Pairwise alignment through the ClustalW executable
#[derive(Debug, Clone)]
pub struct ClustalAligner {
    tool: ExternalTool,
    scratch: Option<PathBuf>,
}

impl ClustalAligner {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            tool: ExternalTool::new(executable, CLUSTALW_ENV_BIN),
            scratch: None,
        }
    }

    /// Aligner using `$SONAR_CLUSTALW`, or `clustalw` from `PATH`
    pub fn from_env() -> Self {
        Self::new(crate::align::tool::resolve_tool_executable(
            None,
            CLUSTALW_ENV_BIN,
            DEFAULT_CLUSTALW_BIN,
        ))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool = self.tool.with_timeout(timeout);
        self
    }

    /// Create the per-pair working directories under `dir` instead of the
    /// system temp directory
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch = Some(dir.into());
        self
    }

    pub fn executable(&self) -> &str {
        &self.tool.executable
    }
}

impl PairwiseAligner for ClustalAligner {
    async fn align(
        &self,
        reference: &SequenceRecord,
        candidate: &SequenceRecord,
    ) -> Result<AlignmentPair, AlignError> {
        // Removed on drop, whichever way this function returns
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKDIR_PREFIX);
        let workdir = match &self.scratch {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        let input = workdir.path().join(INPUT_FILE);
        let output = workdir.path().join(OUTPUT_FILE);

        let pair = [
            SequenceRecord::new(REFERENCE_ID, reference.sequence()),
            SequenceRecord::new(CANDIDATE_ID, candidate.sequence()),
        ];
        fasta::write_records(&input, &pair)?;

        let mut command = self.tool.command();
        command
            .arg(format!("-INFILE={}", input.display()))
            .arg(format!("-OUTFILE={}", output.display()))
            .arg("-OUTPUT=CLUSTAL")
            .arg("-OUTORDER=INPUT")
            .current_dir(workdir.path());
        self.tool.run(command, None).await?;

        let text = tokio::fs::read_to_string(&output).await?;
        let alignment = clustal::parse_alignment(&text)?;
        let pair = AlignmentPair::from_alignment(alignment)?;
        trace!(
            "Aligned {} to {} over {} columns",
            candidate.id(),
            reference.id(),
            pair.width()
        );

        Ok(pair.with_ids(reference.id(), candidate.id()))
    }
}
