use crate::models::AnalysisStage;

/// Violations of the per-claim stage ordering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("claim {claim_id}: expected stage {expected}, analysis is at {actual}")]
    OutOfOrder {
        claim_id: String,
        expected: AnalysisStage,
        actual: AnalysisStage,
    },

    #[error("claim {claim_id}: decomposition produced no sub-claims")]
    EmptyDecomposition { claim_id: String },

    #[error("claim {claim_id}: unknown sub-claim {sub_claim_id}")]
    UnknownSubClaim {
        claim_id: String,
        sub_claim_id: String,
    },
}
