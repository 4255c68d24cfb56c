/// Verdict store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("claim id {claim_id:?} cannot be used as a record name")]
    InvalidClaimId { claim_id: String },

    #[error("no record for claim {claim_id}")]
    NotFound { claim_id: String },
}
