use serde::{Deserialize, Serialize};

use super::category::ConstraintCategory;
use super::evidence::TemporalPosition;
use super::verdict::Severity;

/// A recorded conflict between a (sub-)claim and the narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// `MAIN` for claim-level violations.
    pub sub_claim_id: String,
    pub constraint_category: ConstraintCategory,
    pub description: String,
    pub novel_excerpt: String,
    pub temporal_position: TemporalPosition,
    pub severity: Severity,
}
