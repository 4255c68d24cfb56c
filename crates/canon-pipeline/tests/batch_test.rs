use std::sync::Arc;
use std::time::Duration;

use canon_core::config::{BatchConfig, ReasoningConfig};
use canon_core::errors::{BatchError, CanonError, CanonResult};
use canon_core::models::{Claim, TemporalSlice, Verdict, VerdictRecord};
use canon_core::traits::{Cancellable, CancellationToken, IVerdictStore};
use canon_llm::{RetryPolicy, StructuredClient, Throttle};
use canon_pipeline::{BatchRunner, FsVerdictStore, RunStatus};
use canon_reasoning::ClaimVerifier;
use test_fixtures::{
    contradiction_json, decomposition_json, make_claim, make_passage, support_json,
    RecordingSleeper, ScriptedGenerator, StaticEvidenceStore, CONTRADICT_MARKER,
    DECOMPOSE_MARKER, SUPPORT_MARKER,
};

fn supportive_generator() -> Arc<ScriptedGenerator> {
    Arc::new(
        ScriptedGenerator::new()
            .on_json(
                DECOMPOSE_MARKER,
                decomposition_json(&[("SC1", "Dantes was a sailor.", "factual")]),
            )
            .on_json(SUPPORT_MARKER, support_json(0.8, "Stated outright.", &["a sailor"]))
            .on_json(
                CONTRADICT_MARKER,
                contradiction_json(0.1, "Nothing conflicts.", "none", &[]),
            ),
    )
}

fn make_verifier(generator: Arc<ScriptedGenerator>) -> Arc<ClaimVerifier> {
    let client = StructuredClient::new(
        generator,
        RetryPolicy::none(),
        Arc::new(Throttle::unthrottled()),
    )
    .with_sleeper(Arc::new(RecordingSleeper::new()));
    Arc::new(ClaimVerifier::new(Arc::new(client), ReasoningConfig::default()))
}

fn make_claims(ids: &[&str]) -> StaticEvidenceStore {
    ids.iter().fold(StaticEvidenceStore::new(), |store, id| {
        store.with_claim(
            make_claim(id, "Dantes was a sailor before his arrest."),
            vec![make_passage(
                &format!("c{id}"),
                TemporalSlice::Early,
                "Dantes, mate of the Pharaon.",
            )],
        )
    })
}

fn make_runner(
    generator: Arc<ScriptedGenerator>,
    evidence: Arc<StaticEvidenceStore>,
    store: Arc<dyn IVerdictStore>,
    concurrency: usize,
) -> BatchRunner {
    let config = BatchConfig {
        max_concurrent_claims: concurrency,
        ..BatchConfig::default()
    };
    BatchRunner::new(make_verifier(generator), evidence, store, config)
        .with_inter_claim_pause(Duration::ZERO)
}

/// Cancels the run as soon as the first record is saved.
struct CancellingStore {
    inner: FsVerdictStore,
    token: CancellationToken,
}

impl IVerdictStore for CancellingStore {
    fn exists(&self, claim_id: &str) -> CanonResult<bool> {
        self.inner.exists(claim_id)
    }

    fn save(&self, record: &VerdictRecord) -> CanonResult<()> {
        self.inner.save(record)?;
        self.token.cancel();
        Ok(())
    }

    fn load(&self, claim_id: &str) -> CanonResult<VerdictRecord> {
        self.inner.load(claim_id)
    }

    fn list(&self) -> CanonResult<Vec<VerdictRecord>> {
        self.inner.list()
    }
}

// ─── Happy path ────────────────────────────────────────────────────────────

#[test]
fn run_writes_one_record_per_claim() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1", "2", "3"]));
    let store = Arc::new(FsVerdictStore::new(dir.path()));
    let runner = make_runner(supportive_generator(), evidence.clone(), store.clone(), 1);

    let report = runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.processed, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.counts.supported, 3);
    assert_eq!(report.fallbacks, 0);
    for id in ["1", "2", "3"] {
        let record = store.load(id).unwrap();
        assert_eq!(record.verdict, Verdict::Supported);
        assert_eq!(record.confidence, 0.72);
        assert_eq!(record.analysis.temporal_evidence.early, 1);
    }
}

#[test]
fn parallel_workers_process_every_claim() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1", "2", "3", "4", "5", "6"]));
    let store = Arc::new(FsVerdictStore::new(dir.path()));
    let generator = supportive_generator();
    let runner = make_runner(generator.clone(), evidence.clone(), store.clone(), 3);

    let report = runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();

    assert_eq!(report.processed, 6);
    assert_eq!(store.list().unwrap().len(), 6);
    assert_eq!(generator.call_count(), 18);
}

// ─── Idempotence ───────────────────────────────────────────────────────────

#[test]
fn second_run_skips_existing_records() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1", "2", "3"]));
    let store = Arc::new(FsVerdictStore::new(dir.path()));
    let generator = supportive_generator();
    let runner = make_runner(generator.clone(), evidence.clone(), store.clone(), 1);

    runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();
    let first = store.load("2").unwrap();
    let calls_after_first = generator.call_count();

    let report = runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(generator.call_count(), calls_after_first);
    assert_eq!(store.load("2").unwrap(), first);
}

// ─── Cancellation ──────────────────────────────────────────────────────────

#[test]
fn cancelled_token_starts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1", "2"]));
    let store = Arc::new(FsVerdictStore::new(dir.path()));
    let generator = supportive_generator();
    let runner = make_runner(generator.clone(), evidence.clone(), store.clone(), 1);

    let token = CancellationToken::new();
    token.cancel();
    let report = runner.run(evidence.as_ref(), &token).unwrap();

    assert_eq!(report.cancelled, 2);
    assert_eq!(report.processed, 0);
    assert!(report.was_cancelled());
    assert_eq!(generator.call_count(), 0);
    assert!(store.list().unwrap().is_empty());
    assert_eq!(runner.status().snapshot().stage, "cancelled");
}

#[test]
fn cancellation_mid_run_keeps_finished_records() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1", "2", "3"]));
    let token = CancellationToken::new();
    let store = Arc::new(CancellingStore {
        inner: FsVerdictStore::new(dir.path()),
        token: token.clone(),
    });
    let runner = make_runner(supportive_generator(), evidence.clone(), store.clone(), 1);

    let report = runner.run(evidence.as_ref(), &token).unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.cancelled, 2);
    assert_eq!(store.list().unwrap().len(), 1);
}

// ─── Failures ──────────────────────────────────────────────────────────────

#[test]
fn failing_claim_is_counted_and_others_continue() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(
        make_claims(&["1", "2"]).with_claim(make_claim("../escape", "Bad id."), vec![]),
    );
    let store = Arc::new(FsVerdictStore::new(dir.path()));
    let runner = make_runner(supportive_generator(), evidence.clone(), store.clone(), 1);

    let report = runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].claim_id, "../escape");
    let snapshot = runner.status().snapshot();
    assert_eq!(snapshot.processed, 3);
    assert!(snapshot.last_error.unwrap().contains("../escape"));
}

#[test]
fn retrieval_failure_degrades_to_no_evidence() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(
        StaticEvidenceStore::new().failing_for(make_claim("9", "Dantes was a sailor.")),
    );
    let store = Arc::new(FsVerdictStore::new(dir.path()));
    let runner = make_runner(supportive_generator(), evidence.clone(), store.clone(), 1);

    let report = runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.fallbacks, 1);
    let record = store.load("9").unwrap();
    assert_eq!(record.analysis.temporal_evidence.early, 0);
}

// ─── Run control ───────────────────────────────────────────────────────────

#[test]
fn concurrent_run_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1"]));
    let status = Arc::new(RunStatus::new());
    status.try_begin(1).unwrap();
    let runner = make_runner(
        supportive_generator(),
        evidence.clone(),
        Arc::new(FsVerdictStore::new(dir.path())),
        1,
    )
    .with_status(status.clone());

    let err = runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, CanonError::Batch(BatchError::AlreadyRunning)));
    assert!(status.is_running());
}

#[test]
fn inter_claim_pause_applies_to_processed_claims_only() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1", "2"]));
    let store = Arc::new(FsVerdictStore::new(dir.path()));
    let sleeper = Arc::new(RecordingSleeper::new());
    let runner = make_runner(supportive_generator(), evidence.clone(), store, 1)
        .with_inter_claim_pause(Duration::from_millis(1_000))
        .with_sleeper(sleeper.clone());

    runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(1_000); 2]);

    runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();
    assert_eq!(sleeper.recorded().len(), 2);
}

#[test]
fn status_reflects_finished_run() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1", "2"]));
    let runner = make_runner(
        supportive_generator(),
        evidence.clone(),
        Arc::new(FsVerdictStore::new(dir.path())),
        1,
    );

    runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();

    let snapshot = runner.status().snapshot();
    assert!(!snapshot.running);
    assert_eq!(snapshot.processed, 2);
    assert_eq!(snapshot.progress_percent, 100.0);
    assert_eq!(snapshot.stage, "completed");
    assert!(snapshot.started_at.is_some() && snapshot.finished_at.is_some());
    runner.status().reset().unwrap();
}

#[test]
fn all_supported_raises_bias_warning() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(make_claims(&["1", "2", "3"]));
    let runner = make_runner(
        supportive_generator(),
        evidence.clone(),
        Arc::new(FsVerdictStore::new(dir.path())),
        1,
    );

    let report = runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();
    assert!(report.bias_warning);
}

#[test]
fn claims_keep_their_sentinel_fields() {
    let dir = tempfile::tempdir().unwrap();
    let evidence = Arc::new(
        StaticEvidenceStore::new().with_claim(Claim::new("40", "Someone was somewhere."), vec![]),
    );
    let store = Arc::new(FsVerdictStore::new(dir.path()));
    let runner = make_runner(supportive_generator(), evidence.clone(), store.clone(), 1);

    runner.run(evidence.as_ref(), &CancellationToken::new()).unwrap();
    let record = store.load("40").unwrap();
    assert_eq!(record.analysis.character, "Unknown");
    assert_eq!(record.analysis.book_name, "Unknown");
}
