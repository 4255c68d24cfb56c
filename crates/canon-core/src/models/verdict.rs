use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFINITE_SEVERITY_FLOOR, LIKELY_SEVERITY_FLOOR};

/// Mutually exclusive outcome of verifying a claim. Not a scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Supported,
    Contradicted,
    Undetermined,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Supported => "supported",
            Self::Contradicted => "contradicted",
            Self::Undetermined => "undetermined",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "supported" => Some(Self::Supported),
            "contradicted" => Some(Self::Contradicted),
            "undetermined" => Some(Self::Undetermined),
            _ => None,
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::Undetermined
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How definitively a violation disproves the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Definite,
    Likely,
    Possible,
}

impl Severity {
    /// Fixed step function of contradiction confidence.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > DEFINITE_SEVERITY_FLOOR {
            Self::Definite
        } else if confidence > LIKELY_SEVERITY_FLOOR {
            Self::Likely
        } else {
            Self::Possible
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Definite => "DEFINITE",
            Self::Likely => "LIKELY",
            Self::Possible => "POSSIBLE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
