//! Structured log events for pipeline milestones.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

/// A claim entered the pipeline.
pub fn claim_started(claim_id: &str, passages: usize) {
    tracing::info!(
        event = "claim_started",
        claim_id = %claim_id,
        passages = passages,
        "claim started"
    );
}

/// A claim produced a record.
pub fn claim_completed(claim_id: &str, verdict: &str, confidence: f64, fallbacks: usize) {
    tracing::info!(
        event = "claim_completed",
        claim_id = %claim_id,
        verdict = %verdict,
        confidence = confidence,
        fallbacks = fallbacks,
        "claim completed"
    );
}

/// A claim already had a record and was not re-run.
pub fn claim_skipped(claim_id: &str) {
    tracing::debug!(event = "claim_skipped", claim_id = %claim_id, "claim skipped");
}

/// A claim failed outright and produced no record.
pub fn claim_failed(claim_id: &str, error: &str) {
    tracing::error!(
        event = "claim_failed",
        claim_id = %claim_id,
        error = %error,
        "claim failed"
    );
}

/// A stage took its default instead of generated output.
pub fn stage_fallback(claim_id: &str, step: &str, cause: &str) {
    tracing::warn!(
        event = "stage_fallback",
        claim_id = %claim_id,
        step = %step,
        cause = %cause,
        "stage fell back to default"
    );
}

/// A violation was recorded against a claim or sub-claim.
pub fn violation_recorded(claim_id: &str, sub_claim_id: &str, category: &str, severity: &str) {
    tracing::info!(
        event = "violation_recorded",
        claim_id = %claim_id,
        sub_claim_id = %sub_claim_id,
        category = %category,
        severity = %severity,
        "violation recorded"
    );
}

/// A transient generator failure will be retried after `delay_ms`.
pub fn retry_scheduled(provider: &str, attempt: u32, delay_ms: u64, error: &str) {
    tracing::warn!(
        event = "retry_scheduled",
        provider = %provider,
        attempt = attempt,
        delay_ms = delay_ms,
        error = %error,
        "retry scheduled"
    );
}

/// The synthesizer runs with a non-canonical threshold profile.
pub fn non_default_thresholds(profile: &str) {
    tracing::warn!(
        event = "non_default_thresholds",
        profile = %profile,
        "verdict synthesis is not using the conservative thresholds"
    );
}

/// Too many verdicts came out SUPPORTED.
pub fn bias_warning(supported: usize, total: usize, fraction: f64) {
    tracing::warn!(
        event = "bias_warning",
        supported = supported,
        total = total,
        fraction = fraction,
        "supported share exceeds bias threshold"
    );
}

/// A batch run finished.
pub fn batch_completed(processed: usize, skipped: usize, failed: usize, cancelled: bool) {
    tracing::info!(
        event = "batch_completed",
        processed = processed,
        skipped = skipped,
        failed = failed,
        cancelled = cancelled,
        "batch completed"
    );
}
