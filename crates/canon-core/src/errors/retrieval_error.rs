/// Evidence retrieval errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("neighbour index unavailable: {reason}")]
    IndexUnavailable { reason: String },

    #[error("search failed: {reason}")]
    SearchFailed { reason: String },

    #[error("no evidence bundle for claim {claim_id}")]
    BundleNotFound { claim_id: String },

    #[error("failed to read evidence bundle {path}: {reason}")]
    BundleParse { path: String, reason: String },
}
