use serde::{Deserialize, Serialize};

/// Outcome of the frameshift check for one read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Keep,
    Discard,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::Discard => write!(f, "discard"),
        }
    }
}

/// A verdict tied to the record it was made for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDecision {
    pub record_id: String,
    pub verdict: Verdict,
}

impl FilterDecision {
    pub fn new(record_id: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            record_id: record_id.into(),
            verdict,
        }
    }

    pub fn is_keep(&self) -> bool {
        self.verdict == Verdict::Keep
    }
}

/// Immunoglobulin locus, used to pick a default germline V library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Locus {
    /// Heavy chain
    #[default]
    #[value(name = "H")]
    Heavy,
    /// Kappa light chain
    #[value(name = "K")]
    Kappa,
    /// Lambda light chain
    #[value(name = "L")]
    Lambda,
}

impl Locus {
    /// File name of the bundled V gene library for this locus
    pub fn v_library_file(self) -> &'static str {
        match self {
            Self::Heavy => "IgHV.fa",
            Self::Kappa => "IgKV.fa",
            Self::Lambda => "IgLV.fa",
        }
    }
}

impl std::fmt::Display for Locus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heavy => write!(f, "H"),
            Self::Kappa => write!(f, "K"),
            Self::Lambda => write!(f, "L"),
        }
    }
}
