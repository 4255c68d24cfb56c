use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisStage, ClaimAnalysis};
use super::category::ConstraintCategory;
use super::evidence::TemporalSlice;
use super::verdict::Verdict;
use super::violation::ConstraintViolation;
use crate::constants::{
    MAX_NOVEL_EXCERPT_CHARS, MAX_RECORD_REASONING_CHARS, MAX_RECORD_SPANS, MAX_SUB_CLAIM_EXCERPTS,
};
use crate::errors::StageError;

/// Per-slice passage counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalCounts {
    pub early: usize,
    pub mid: usize,
    pub late: usize,
}

/// A sub-claim as it appears in the produced record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubClaimReport {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub constraint_category: ConstraintCategory,
    #[serde(default)]
    pub verdict: Option<Verdict>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub supporting_excerpts: Vec<String>,
    #[serde(default)]
    pub contradicting_excerpts: Vec<String>,
}

/// Full analysis carried inside a [`VerdictRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub claim_id: String,
    pub claim_text: String,
    pub character: String,
    pub book_name: String,
    pub sub_claims: Vec<SubClaimReport>,
    pub temporal_evidence: TemporalCounts,
    pub violations: Vec<ConstraintViolation>,
    pub support_score: f64,
    pub contradiction_score: f64,
    pub verdict: Verdict,
    pub confidence: f64,
    pub reasoning: String,
}

/// The per-claim artifact written by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub claim_id: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub supporting_spans: Vec<String>,
    pub contradicting_spans: Vec<String>,
    pub reasoning: String,
    pub analysis: AnalysisReport,
}

impl VerdictRecord {
    /// Builds the record from a synthesized analysis, applying every
    /// artifact limit. Anything short of SYNTHESIZED is rejected.
    pub fn from_analysis(analysis: &ClaimAnalysis) -> Result<Self, StageError> {
        let verdict = match (analysis.stage(), analysis.verdict()) {
            (AnalysisStage::Synthesized, Some(v)) => v,
            (actual, _) => {
                return Err(StageError::OutOfOrder {
                    claim_id: analysis.claim_id().to_string(),
                    expected: AnalysisStage::Synthesized,
                    actual,
                })
            }
        };

        let claim = analysis.claim();
        let sub_claims = analysis
            .sub_claims()
            .iter()
            .map(|sc| SubClaimReport {
                id: sc.id.clone(),
                text: sc.text.clone(),
                constraint_category: sc.constraint_category,
                verdict: sc.verdict,
                confidence: sc.confidence,
                reasoning: sc.reasoning.clone(),
                supporting_excerpts: sc.supporting_excerpts.clone(),
                contradicting_excerpts: sc.contradicting_excerpts.clone(),
            })
            .collect();

        let temporal_evidence = TemporalCounts {
            early: analysis.bucket(TemporalSlice::Early).len(),
            mid: analysis.bucket(TemporalSlice::Mid).len(),
            late: analysis.bucket(TemporalSlice::Late).len(),
        };

        let record = Self {
            claim_id: claim.claim_id.clone(),
            verdict,
            confidence: analysis.confidence(),
            supporting_spans: analysis.supporting_excerpts().to_vec(),
            contradicting_spans: analysis.contradicting_excerpts().to_vec(),
            reasoning: analysis.reasoning().to_string(),
            analysis: AnalysisReport {
                claim_id: claim.claim_id.clone(),
                claim_text: claim.claim_text.clone(),
                character: claim.character.clone(),
                book_name: claim.book_name.clone(),
                sub_claims,
                temporal_evidence,
                violations: analysis.violations().to_vec(),
                support_score: analysis.support_score(),
                contradiction_score: analysis.contradiction_score(),
                verdict,
                confidence: analysis.confidence(),
                reasoning: analysis.reasoning().to_string(),
            },
        };
        Ok(record.normalized())
    }

    /// Applies the artifact limits. Idempotent.
    pub fn normalized(mut self) -> Self {
        self.confidence = round2(self.confidence);
        self.supporting_spans.truncate(MAX_RECORD_SPANS);
        self.contradicting_spans.truncate(MAX_RECORD_SPANS);
        self.reasoning = truncate_chars(&self.reasoning, MAX_RECORD_REASONING_CHARS);

        let a = &mut self.analysis;
        a.confidence = round2(a.confidence);
        a.support_score = round2(a.support_score);
        a.contradiction_score = round2(a.contradiction_score);
        for sc in &mut a.sub_claims {
            sc.confidence = round2(sc.confidence);
            sc.supporting_excerpts.truncate(MAX_SUB_CLAIM_EXCERPTS);
            sc.contradicting_excerpts.truncate(MAX_SUB_CLAIM_EXCERPTS);
            sc.reasoning = truncate_chars(&sc.reasoning, MAX_RECORD_REASONING_CHARS);
        }
        for v in &mut a.violations {
            v.novel_excerpt = truncate_chars(&v.novel_excerpt, MAX_NOVEL_EXCERPT_CHARS);
        }
        self
    }
}

/// First `max` characters of `text` (by `char`, never splitting a code point).
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
