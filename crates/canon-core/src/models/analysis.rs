use serde::{Deserialize, Serialize};
use std::fmt;

use super::claim::Claim;
use super::evidence::{EvidencePassage, TemporalSlice};
use super::outcome::StageFallback;
use super::sub_claim::SubClaim;
use super::verdict::{Severity, Verdict};
use super::violation::ConstraintViolation;
use crate::errors::StageError;

/// Position of a [`ClaimAnalysis`] in the per-claim pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStage {
    Created,
    Decomposed,
    EvidenceBucketed,
    SupportEvaluated,
    ContradictionEvaluated,
    Synthesized,
}

impl AnalysisStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Decomposed => "DECOMPOSED",
            Self::EvidenceBucketed => "EVIDENCE_BUCKETED",
            Self::SupportEvaluated => "SUPPORT_EVALUATED",
            Self::ContradictionEvaluated => "CONTRADICTION_EVALUATED",
            Self::Synthesized => "SYNTHESIZED",
        }
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-claim level result written back by optional per-sub-claim evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SubClaimEvaluation {
    pub verdict: Verdict,
    pub confidence: f64,
    pub reasoning: String,
    pub supporting_excerpts: Vec<String>,
    pub contradicting_excerpts: Vec<String>,
    pub violation: Option<ConstraintViolation>,
}

/// Aggregate root for the verification of one claim.
///
/// Recording methods advance the stage one step at a time and reject
/// out-of-order calls with [`StageError::OutOfOrder`]. Scores and
/// confidences are clamped to [0, 1] on the way in.
#[derive(Debug, Clone)]
pub struct ClaimAnalysis {
    claim: Claim,
    stage: AnalysisStage,
    sub_claims: Vec<SubClaim>,
    evidence: Vec<EvidencePassage>,
    violations: Vec<ConstraintViolation>,
    support_score: f64,
    contradiction_score: f64,
    supporting_excerpts: Vec<String>,
    contradicting_excerpts: Vec<String>,
    verdict: Option<Verdict>,
    confidence: f64,
    reasoning: String,
    fallbacks: Vec<StageFallback>,
}

impl ClaimAnalysis {
    pub fn new(claim: Claim) -> Self {
        Self {
            claim,
            stage: AnalysisStage::Created,
            sub_claims: Vec::new(),
            evidence: Vec::new(),
            violations: Vec::new(),
            support_score: 0.0,
            contradiction_score: 0.0,
            supporting_excerpts: Vec::new(),
            contradicting_excerpts: Vec::new(),
            verdict: None,
            confidence: 0.0,
            reasoning: String::new(),
            fallbacks: Vec::new(),
        }
    }

    fn require(&self, expected: AnalysisStage) -> Result<(), StageError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(StageError::OutOfOrder {
                claim_id: self.claim.claim_id.clone(),
                expected,
                actual: self.stage,
            })
        }
    }

    // ─── Stage transitions ─────────────────────────────────────────────────

    /// CREATED → DECOMPOSED. An empty list is rejected.
    pub fn record_decomposition(&mut self, mut sub_claims: Vec<SubClaim>) -> Result<(), StageError> {
        self.require(AnalysisStage::Created)?;
        if sub_claims.is_empty() {
            return Err(StageError::EmptyDecomposition {
                claim_id: self.claim.claim_id.clone(),
            });
        }
        for sc in &mut sub_claims {
            sc.parent_claim_id = self.claim.claim_id.clone();
        }
        self.sub_claims = sub_claims;
        self.stage = AnalysisStage::Decomposed;
        Ok(())
    }

    /// DECOMPOSED → EVIDENCE_BUCKETED. Retrieval order is kept.
    pub fn bucket_evidence(&mut self, passages: Vec<EvidencePassage>) -> Result<(), StageError> {
        self.require(AnalysisStage::Decomposed)?;
        self.evidence = passages;
        self.stage = AnalysisStage::EvidenceBucketed;
        Ok(())
    }

    /// Writes a sub-claim's own verdict. Only valid while EVIDENCE_BUCKETED;
    /// does not advance the stage.
    pub fn record_sub_claim_evaluation(
        &mut self,
        sub_claim_id: &str,
        evaluation: SubClaimEvaluation,
    ) -> Result<(), StageError> {
        self.require(AnalysisStage::EvidenceBucketed)?;
        let claim_id = self.claim.claim_id.clone();
        let sc = self
            .sub_claims
            .iter_mut()
            .find(|sc| sc.id == sub_claim_id)
            .ok_or_else(|| StageError::UnknownSubClaim {
                claim_id,
                sub_claim_id: sub_claim_id.to_string(),
            })?;
        sc.verdict = Some(evaluation.verdict);
        sc.confidence = clamp_unit(evaluation.confidence);
        sc.reasoning = evaluation.reasoning;
        sc.supporting_excerpts = evaluation.supporting_excerpts;
        sc.contradicting_excerpts = evaluation.contradicting_excerpts;
        if let Some(v) = evaluation.violation {
            self.violations.push(v);
        }
        Ok(())
    }

    /// EVIDENCE_BUCKETED → SUPPORT_EVALUATED.
    pub fn record_support(&mut self, confidence: f64, excerpts: Vec<String>) -> Result<(), StageError> {
        self.require(AnalysisStage::EvidenceBucketed)?;
        self.support_score = clamp_unit(confidence);
        self.supporting_excerpts = excerpts;
        self.stage = AnalysisStage::SupportEvaluated;
        Ok(())
    }

    /// SUPPORT_EVALUATED → CONTRADICTION_EVALUATED.
    pub fn record_contradiction(
        &mut self,
        confidence: f64,
        excerpts: Vec<String>,
        violation: Option<ConstraintViolation>,
    ) -> Result<(), StageError> {
        self.require(AnalysisStage::SupportEvaluated)?;
        self.contradiction_score = clamp_unit(confidence);
        self.contradicting_excerpts = excerpts;
        if let Some(v) = violation {
            self.violations.push(v);
        }
        self.stage = AnalysisStage::ContradictionEvaluated;
        Ok(())
    }

    /// CONTRADICTION_EVALUATED → SYNTHESIZED.
    pub fn record_synthesis(
        &mut self,
        verdict: Verdict,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Result<(), StageError> {
        self.require(AnalysisStage::ContradictionEvaluated)?;
        self.verdict = Some(verdict);
        self.confidence = clamp_unit(confidence);
        self.reasoning = reasoning.into();
        self.stage = AnalysisStage::Synthesized;
        Ok(())
    }

    /// Fallbacks can be noted at any stage.
    pub fn record_fallback(&mut self, fallback: StageFallback) {
        self.fallbacks.push(fallback);
    }

    // ─── Accessors ─────────────────────────────────────────────────────────

    pub fn claim(&self) -> &Claim {
        &self.claim
    }

    pub fn claim_id(&self) -> &str {
        &self.claim.claim_id
    }

    pub fn stage(&self) -> AnalysisStage {
        self.stage
    }

    pub fn is_synthesized(&self) -> bool {
        self.stage == AnalysisStage::Synthesized
    }

    pub fn sub_claims(&self) -> &[SubClaim] {
        &self.sub_claims
    }

    /// All passages, in retrieval order.
    pub fn evidence(&self) -> &[EvidencePassage] {
        &self.evidence
    }

    /// Passages of one slice, in retrieval order.
    pub fn bucket(&self, slice: TemporalSlice) -> Vec<&EvidencePassage> {
        self.evidence
            .iter()
            .filter(|p| p.temporal_slice == slice)
            .collect()
    }

    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    pub fn has_definite_violation(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Definite)
    }

    pub fn support_score(&self) -> f64 {
        self.support_score
    }

    pub fn contradiction_score(&self) -> f64 {
        self.contradiction_score
    }

    pub fn supporting_excerpts(&self) -> &[String] {
        &self.supporting_excerpts
    }

    pub fn contradicting_excerpts(&self) -> &[String] {
        &self.contradicting_excerpts
    }

    /// `None` until synthesized.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn fallbacks(&self) -> &[StageFallback] {
        &self.fallbacks
    }
}

/// Clamp into [0, 1]; NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
