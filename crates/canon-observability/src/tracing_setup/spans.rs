//! Span definitions for the per-claim pipeline.

/// Span covering one claim from retrieval to record.
#[macro_export]
macro_rules! claim_span {
    ($claim_id:expr) => {
        tracing::info_span!("canon.claim", claim_id = %$claim_id)
    };
}

/// Span covering one stage of one claim.
#[macro_export]
macro_rules! stage_span {
    ($claim_id:expr, $stage:expr) => {
        tracing::info_span!("canon.stage", claim_id = %$claim_id, stage = %$stage)
    };
}

/// Span covering a whole batch run.
#[macro_export]
macro_rules! batch_span {
    ($total:expr) => {
        tracing::info_span!("canon.batch", total = $total)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const CLAIM: &str = "canon.claim";
    pub const STAGE: &str = "canon.stage";
    pub const BATCH: &str = "canon.batch";
}
