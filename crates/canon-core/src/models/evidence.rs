use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Coarse position of a passage within its source book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemporalSlice {
    Early,
    #[default]
    Mid,
    Late,
}

impl TemporalSlice {
    pub const ALL: [TemporalSlice; 3] = [Self::Early, Self::Mid, Self::Late];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Early => "EARLY",
            Self::Mid => "MID",
            Self::Late => "LATE",
        }
    }

    /// Unknown labels decode to MID.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "EARLY" => Self::Early,
            "LATE" => Self::Late,
            _ => Self::Mid,
        }
    }
}

impl fmt::Display for TemporalSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TemporalSlice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label: Option<String> = Option::deserialize(deserializer)?;
        Ok(label.as_deref().map(Self::from_label).unwrap_or_default())
    }
}

/// Where a violation's excerpt was found. UNKNOWN when no passage contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemporalPosition {
    Early,
    Mid,
    Late,
    #[default]
    Unknown,
}

impl From<TemporalSlice> for TemporalPosition {
    fn from(slice: TemporalSlice) -> Self {
        match slice {
            TemporalSlice::Early => Self::Early,
            TemporalSlice::Mid => Self::Mid,
            TemporalSlice::Late => Self::Late,
        }
    }
}

/// Which retrieval query surfaced a passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    Standard,
    Counterfactual,
    Both,
}

impl QueryType {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "counterfactual" => Self::Counterfactual,
            "both" => Self::Both,
            _ => Self::Standard,
        }
    }
}

impl<'de> Deserialize<'de> for QueryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label: Option<String> = Option::deserialize(deserializer)?;
        Ok(label.as_deref().map(Self::from_label).unwrap_or_default())
    }
}

/// A retrieved, temporally tagged chunk of narrative text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePassage {
    #[serde(default)]
    pub chunk_id: String,
    /// Source document identity.
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub chunk_idx: usize,
    pub text: String,
    #[serde(default)]
    pub temporal_slice: TemporalSlice,
    /// Retrieval score. Unbounded; higher is more relevant.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub query_type: QueryType,
}

impl EvidencePassage {
    pub fn new(chunk_id: impl Into<String>, text: impl Into<String>, slice: TemporalSlice) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            book: String::new(),
            chunk_idx: 0,
            text: text.into(),
            temporal_slice: slice,
            score: 0.0,
            query_type: QueryType::Standard,
        }
    }

    pub fn with_book(mut self, book: impl Into<String>) -> Self {
        self.book = book.into();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}
