use serde::{Deserialize, Serialize};

use super::category::ConstraintCategory;
use super::verdict::Verdict;

/// An atomic, independently verifiable piece of a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubClaim {
    /// Unique within the parent claim.
    pub id: String,
    pub text: String,
    pub constraint_category: ConstraintCategory,
    /// Back-reference to the owning claim by id.
    pub parent_claim_id: String,
    #[serde(default)]
    pub supporting_excerpts: Vec<String>,
    #[serde(default)]
    pub contradicting_excerpts: Vec<String>,
    #[serde(default)]
    pub verdict: Option<Verdict>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl SubClaim {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        constraint_category: ConstraintCategory,
        parent_claim_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            constraint_category,
            parent_claim_id: parent_claim_id.into(),
            supporting_excerpts: Vec::new(),
            contradicting_excerpts: Vec::new(),
            verdict: None,
            confidence: 0.0,
            reasoning: String::new(),
        }
    }

    /// The single sub-claim used when decomposition yields nothing usable.
    pub fn fallback(parent_claim_id: &str, claim_text: &str) -> Self {
        Self::new("SC1", claim_text, ConstraintCategory::Factual, parent_claim_id)
    }
}
