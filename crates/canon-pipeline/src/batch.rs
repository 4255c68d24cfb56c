//! Parallel, resumable batch over every claim of a run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use canon_core::config::{BatchConfig, ThrottleConfig};
use canon_core::errors::{BatchError, CanonError, CanonResult};
use canon_core::models::{
    compare_claim_ids, Claim, DefaultCause, EvaluationStep, StageFallback, Verdict,
};
use canon_core::traits::{
    Cancellable, IClaimSource, IEvidenceStore, IVerdictStore, Sleeper, ThreadSleeper,
};
use canon_observability::{batch_span, events};
use canon_reasoning::ClaimVerifier;
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::aggregate::VerdictCounts;
use crate::status::RunStatus;

/// A claim that produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimFailure {
    pub claim_id: String,
    pub error: String,
}

/// What one run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    /// Claims that produced a new record.
    pub processed: usize,
    /// Claims that already had a record.
    pub skipped: usize,
    /// Claims never started because the run was cancelled.
    pub cancelled: usize,
    pub failures: Vec<ClaimFailure>,
    /// Verdicts produced by this run.
    pub counts: VerdictCounts,
    /// Stage fallbacks across every processed claim.
    pub fallbacks: usize,
    pub bias_warning: bool,
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled > 0
    }
}

enum ClaimOutcome {
    Completed { verdict: Verdict, fallbacks: usize },
    Skipped,
    Cancelled,
    Failed(ClaimFailure),
}

/// Runs [`ClaimVerifier`] over a claim source on a rayon pool.
///
/// Claims with a stored record are skipped. Cancellation is checked before
/// each claim; claims already in flight finish and are saved. A claim that
/// fails is counted and never aborts the run.
pub struct BatchRunner {
    verifier: Arc<ClaimVerifier>,
    evidence: Arc<dyn IEvidenceStore>,
    store: Arc<dyn IVerdictStore>,
    config: BatchConfig,
    inter_claim_pause: Duration,
    sleeper: Arc<dyn Sleeper>,
    status: Arc<RunStatus>,
}

impl BatchRunner {
    pub fn new(
        verifier: Arc<ClaimVerifier>,
        evidence: Arc<dyn IEvidenceStore>,
        store: Arc<dyn IVerdictStore>,
        config: BatchConfig,
    ) -> Self {
        Self {
            verifier,
            evidence,
            store,
            config,
            inter_claim_pause: Duration::from_millis(ThrottleConfig::default().inter_claim_pause_ms),
            sleeper: Arc::new(ThreadSleeper),
            status: Arc::new(RunStatus::new()),
        }
    }

    /// Pause each worker takes after finishing a claim.
    pub fn with_inter_claim_pause(mut self, pause: Duration) -> Self {
        self.inter_claim_pause = pause;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Share a status record with an observer.
    pub fn with_status(mut self, status: Arc<RunStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> &Arc<RunStatus> {
        &self.status
    }

    /// One full run. Refused while another run holds the status record.
    pub fn run<C>(&self, source: &dyn IClaimSource, cancel: &C) -> CanonResult<BatchReport>
    where
        C: Cancellable + Sync,
    {
        let claims = source.claims()?;
        self.status.try_begin(claims.len())?;

        match self.run_claims(&claims, cancel) {
            Ok(report) => {
                let stage = if report.was_cancelled() {
                    "cancelled"
                } else {
                    "completed"
                };
                self.status.log(format!(
                    "{stage}: {} processed, {} skipped, {} failed",
                    report.processed,
                    report.skipped,
                    report.failed()
                ));
                self.status.finish(stage);
                Ok(report)
            }
            Err(e) => {
                self.status.record_error(e.to_string());
                self.status.finish("failed");
                Err(e)
            }
        }
    }

    fn run_claims<C>(&self, claims: &[Claim], cancel: &C) -> CanonResult<BatchReport>
    where
        C: Cancellable + Sync,
    {
        let _span = batch_span!(claims.len()).entered();
        let started = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_concurrent_claims.max(1))
            .build()
            .map_err(|e| BatchError::WorkerPool {
                reason: e.to_string(),
            })?;

        let skipped = AtomicUsize::new(0);
        let cancelled = AtomicUsize::new(0);
        let fallbacks = AtomicUsize::new(0);
        let verdicts: Mutex<Vec<Verdict>> = Mutex::new(Vec::new());
        let failures: Mutex<Vec<ClaimFailure>> = Mutex::new(Vec::new());

        pool.install(|| {
            claims.par_iter().for_each(|claim| match self.process(claim, cancel) {
                ClaimOutcome::Completed {
                    verdict,
                    fallbacks: n,
                } => {
                    fallbacks.fetch_add(n, Ordering::Relaxed);
                    verdicts
                        .lock()
                        .unwrap_or_else(|p| p.into_inner())
                        .push(verdict);
                }
                ClaimOutcome::Skipped => {
                    skipped.fetch_add(1, Ordering::Relaxed);
                }
                ClaimOutcome::Cancelled => {
                    cancelled.fetch_add(1, Ordering::Relaxed);
                }
                ClaimOutcome::Failed(failure) => {
                    failures
                        .lock()
                        .unwrap_or_else(|p| p.into_inner())
                        .push(failure);
                }
            });
        });

        let counts: VerdictCounts = verdicts
            .into_inner()
            .unwrap_or_else(|p| p.into_inner())
            .into_iter()
            .collect();
        let mut failures = failures.into_inner().unwrap_or_else(|p| p.into_inner());
        failures.sort_by(|a, b| compare_claim_ids(&a.claim_id, &b.claim_id));

        let bias_warning = counts.exceeds_bias(self.config.bias_warning_fraction);
        if bias_warning {
            events::bias_warning(counts.supported, counts.total(), counts.supported_fraction());
        }

        let report = BatchReport {
            total: claims.len(),
            processed: counts.total(),
            skipped: skipped.into_inner(),
            cancelled: cancelled.into_inner(),
            failures,
            counts,
            fallbacks: fallbacks.into_inner(),
            bias_warning,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        events::batch_completed(
            report.processed,
            report.skipped,
            report.failed(),
            report.was_cancelled(),
        );
        Ok(report)
    }

    fn process<C: Cancellable>(&self, claim: &Claim, cancel: &C) -> ClaimOutcome {
        if cancel.is_cancelled() {
            return ClaimOutcome::Cancelled;
        }
        let claim_id = claim.claim_id.as_str();

        let outcome = match self.store.exists(claim_id) {
            Ok(true) => {
                events::claim_skipped(claim_id);
                self.status.log(format!("{claim_id}: skipped, record exists"));
                ClaimOutcome::Skipped
            }
            Ok(false) => {
                self.status.set_stage(format!("claim {claim_id}"));
                let outcome = match self.verify_and_save(claim) {
                    Ok((verdict, fallbacks)) => {
                        self.status.log(format!("{claim_id}: {verdict}"));
                        ClaimOutcome::Completed { verdict, fallbacks }
                    }
                    Err(e) => self.failure(claim_id, &e),
                };
                self.pause();
                outcome
            }
            Err(e) => self.failure(claim_id, &e),
        };
        self.status.advance();
        outcome
    }

    fn verify_and_save(&self, claim: &Claim) -> CanonResult<(Verdict, usize)> {
        let claim_id = claim.claim_id.as_str();
        let (passages, retrieval_failed) = match self.evidence.retrieve(claim) {
            Ok(passages) => (passages, false),
            Err(e) => {
                warn!(claim_id = %claim_id, error = %e, "retrieval failed; continuing without evidence");
                (Vec::new(), true)
            }
        };
        events::claim_started(claim_id, passages.len());

        let mut analysis = self.verifier.verify(claim.clone(), passages)?;
        if retrieval_failed {
            let fallback = StageFallback {
                step: EvaluationStep::Retrieval,
                cause: DefaultCause::Empty,
            };
            events::stage_fallback(claim_id, &fallback.step.to_string(), &fallback.cause.to_string());
            analysis.record_fallback(fallback);
        }

        let record = ClaimVerifier::to_record(&analysis)?;
        self.store.save(&record)?;

        let fallbacks = analysis.fallbacks().len();
        events::claim_completed(claim_id, record.verdict.as_str(), record.confidence, fallbacks);
        Ok((record.verdict, fallbacks))
    }

    fn failure(&self, claim_id: &str, error: &CanonError) -> ClaimOutcome {
        let error = error.to_string();
        events::claim_failed(claim_id, &error);
        self.status.record_error(format!("{claim_id}: {error}"));
        ClaimOutcome::Failed(ClaimFailure {
            claim_id: claim_id.to_string(),
            error,
        })
    }

    fn pause(&self) {
        if !self.inter_claim_pause.is_zero() {
            self.sleeper.sleep(self.inter_claim_pause);
        }
    }
}
