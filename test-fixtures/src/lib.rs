//! Shared test support for Canon: fixture loading, a scripted text
//! generator, a recording sleeper, in-memory stores and JSON builders.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use canon_core::errors::{CanonResult, LlmError, RetrievalError};
use canon_core::models::{Claim, EvidencePassage, TemporalSlice};
use canon_core::traits::{
    GenerationRequest, IClaimSource, IEvidenceStore, INeighborIndex, ITextGenerator, Sleeper,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

// ─── Fixture files ─────────────────────────────────────────────────────────

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);
    while !path.join("test-fixtures").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures").join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixture_path(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Get the absolute path to a fixture file or directory.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Directory of sample evidence bundles (claims 101, 102, 103).
pub fn bundles_dir() -> PathBuf {
    fixture_path("bundles")
}

/// Copy every bundle into `dest`, for tests that need a writable directory.
pub fn copy_bundles_to(dest: &std::path::Path) {
    std::fs::create_dir_all(dest).unwrap();
    for entry in std::fs::read_dir(bundles_dir()).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), dest.join(entry.file_name())).unwrap();
    }
}

// ─── Scripted generator ────────────────────────────────────────────────────

/// Substring identifying the decomposition prompt.
pub const DECOMPOSE_MARKER: &str = "atomic sub-claims";
/// Substring identifying the support-seeking prompt.
pub const SUPPORT_MARKER: &str = "SUPPORTS this claim";
/// Substring identifying the contradiction-seeking prompt.
pub const CONTRADICT_MARKER: &str = "CONTRADICTS this claim";

struct Rule {
    marker: String,
    responses: VecDeque<Result<String, LlmError>>,
}

/// An [`ITextGenerator`] answering from a script.
///
/// Each rule matches prompts containing its marker. Queued responses are
/// consumed in order; the last one repeats. Unmatched prompts get the
/// fallback response (a non-transient HTTP 400 unless set).
pub struct ScriptedGenerator {
    name: String,
    rules: Mutex<Vec<Rule>>,
    fallback: Result<String, LlmError>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            name: "scripted".to_string(),
            rules: Mutex::new(Vec::new()),
            fallback: Err(LlmError::Http {
                provider: "scripted".to_string(),
                status: 400,
                body: "unscripted prompt".to_string(),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response for prompts containing `marker`.
    pub fn on(self, marker: &str, response: Result<String, LlmError>) -> Self {
        {
            let mut rules = self.rules.lock().unwrap();
            match rules.iter_mut().find(|r| r.marker == marker) {
                Some(rule) => rule.responses.push_back(response),
                None => rules.push(Rule {
                    marker: marker.to_string(),
                    responses: VecDeque::from([response]),
                }),
            }
        }
        self
    }

    /// Queue a successful JSON response.
    pub fn on_json(self, marker: &str, value: Value) -> Self {
        self.on(marker, Ok(value.to_string()))
    }

    /// Response for prompts no rule matches.
    pub fn otherwise(mut self, response: Result<String, LlmError>) -> Self {
        self.fallback = response;
        self
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Requests whose prompt contains `marker`.
    pub fn calls_matching(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.prompt.contains(marker))
            .count()
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ITextGenerator for ScriptedGenerator {
    fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(request.clone());
        let mut rules = self.rules.lock().unwrap();
        match rules.iter_mut().find(|r| request.prompt.contains(&r.marker)) {
            Some(rule) if rule.responses.len() > 1 => rule
                .responses
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone()),
            Some(rule) => rule
                .responses
                .front()
                .cloned()
                .unwrap_or_else(|| self.fallback.clone()),
            None => self.fallback.clone(),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A transient failure, as a rate-limited provider would return.
pub fn rate_limited() -> LlmError {
    LlmError::RateLimited {
        provider: "scripted".to_string(),
    }
}

// ─── Sleeper ───────────────────────────────────────────────────────────────

/// Records requested sleeps without sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.recorded().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

// ─── Evidence ──────────────────────────────────────────────────────────────

/// Evidence and claims held in memory.
#[derive(Debug, Default)]
pub struct StaticEvidenceStore {
    claims: Vec<Claim>,
    evidence: HashMap<String, Vec<EvidencePassage>>,
    failing: Vec<String>,
}

impl StaticEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim(mut self, claim: Claim, passages: Vec<EvidencePassage>) -> Self {
        self.evidence.insert(claim.claim_id.clone(), passages);
        self.claims.push(claim);
        self
    }

    /// Retrieval for this claim fails.
    pub fn failing_for(mut self, claim: Claim) -> Self {
        self.failing.push(claim.claim_id.clone());
        self.claims.push(claim);
        self
    }
}

impl IEvidenceStore for StaticEvidenceStore {
    fn retrieve(&self, claim: &Claim) -> CanonResult<Vec<EvidencePassage>> {
        if self.failing.contains(&claim.claim_id) {
            return Err(RetrievalError::IndexUnavailable {
                reason: "scripted failure".to_string(),
            }
            .into());
        }
        Ok(self.evidence.get(&claim.claim_id).cloned().unwrap_or_default())
    }
}

impl IClaimSource for StaticEvidenceStore {
    fn claims(&self) -> CanonResult<Vec<Claim>> {
        Ok(self.claims.clone())
    }
}

/// A neighbour index answering per query from a fixed table.
#[derive(Debug, Default)]
pub struct FakeIndex {
    answers: Vec<(String, Vec<EvidencePassage>)>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits returned for exactly `query`.
    pub fn answer(mut self, query: &str, hits: Vec<EvidencePassage>) -> Self {
        self.answers.push((query.to_string(), hits));
        self
    }

    /// Every `(query, k)` received.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

impl INeighborIndex for FakeIndex {
    fn search(&self, query: &str, k: usize) -> CanonResult<Vec<EvidencePassage>> {
        self.queries.lock().unwrap().push((query.to_string(), k));
        Ok(self
            .answers
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, hits)| hits.iter().take(k).cloned().collect())
            .unwrap_or_default())
    }
}

// ─── Builders ──────────────────────────────────────────────────────────────

pub fn make_claim(id: &str, text: &str) -> Claim {
    Claim::new(id, text)
        .with_character("Edmond Dantes")
        .with_book("The Count of Monte Cristo")
}

pub fn make_passage(chunk_id: &str, slice: TemporalSlice, text: &str) -> EvidencePassage {
    EvidencePassage::new(chunk_id, text, slice).with_book("The Count of Monte Cristo")
}

/// `[{"id", "text", "type"}]` from `(id, text, type)` triples.
pub fn decomposition_json(items: &[(&str, &str, &str)]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|(id, text, ty)| json!({"id": id, "text": text, "type": ty}))
            .collect(),
    )
}

pub fn support_json(confidence: f64, reasoning: &str, excerpts: &[&str]) -> Value {
    json!({
        "supporting_excerpts": excerpts,
        "support_confidence": confidence,
        "support_reasoning": reasoning,
    })
}

pub fn contradiction_json(confidence: f64, reasoning: &str, label: &str, excerpts: &[&str]) -> Value {
    json!({
        "contradicting_excerpts": excerpts,
        "contradiction_confidence": confidence,
        "contradiction_reasoning": reasoning,
        "violation_type": label,
    })
}
