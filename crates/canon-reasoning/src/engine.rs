//! Per-claim verification: decompose, bucket, evaluate, synthesize.

use std::sync::Arc;

use canon_core::config::{ReasoningConfig, SynthesisThresholds};
use canon_core::constants::MAIN_SUB_CLAIM_ID;
use canon_core::errors::CanonResult;
use canon_core::models::{
    AnalysisStage, Claim, ClaimAnalysis, ConstraintViolation, EvaluationStep, EvidencePassage,
    Severity, StageFallback, StageOutcome, SubClaimEvaluation, VerdictRecord,
};
use canon_llm::StructuredClient;
use canon_observability::{claim_span, events, stage_span};
use tracing::debug;

use crate::decomposer::Decomposer;
use crate::evaluator::{evidence_text, violation_for, DualEvaluator};
use crate::gate::DependencyGate;
use crate::synthesizer::{DefiniteContradiction, SynthesisInput, VerdictSynthesizer};

/// Runs one claim through every stage, strictly in order.
///
/// Generator failures never surface as errors: each stage takes its default
/// and notes a [`StageFallback`] on the analysis. Only an out-of-order stage
/// transition is an error.
pub struct ClaimVerifier {
    client: Arc<StructuredClient>,
    config: ReasoningConfig,
    synthesizer: VerdictSynthesizer,
}

impl ClaimVerifier {
    pub fn new(client: Arc<StructuredClient>, config: ReasoningConfig) -> Self {
        let thresholds = config.resolved_thresholds();
        if !thresholds.is_conservative() {
            let label = if config.thresholds.is_some() {
                "custom"
            } else {
                config.profile.as_str()
            };
            events::non_default_thresholds(label);
        }
        Self {
            client,
            config,
            synthesizer: VerdictSynthesizer::new(thresholds),
        }
    }

    pub fn thresholds(&self) -> &SynthesisThresholds {
        self.synthesizer.thresholds()
    }

    pub fn verify(
        &self,
        claim: Claim,
        passages: Vec<EvidencePassage>,
    ) -> CanonResult<ClaimAnalysis> {
        let _claim_span = claim_span!(claim.claim_id).entered();
        let gate = DependencyGate::new();
        let evaluator = DualEvaluator::new(&self.client, &gate, self.config.max_excerpts);
        let mut analysis = ClaimAnalysis::new(claim);

        {
            let _span = stage_span!(analysis.claim_id(), AnalysisStage::Decomposed).entered();
            let outcome = Decomposer::new(&self.client, &gate).decompose(analysis.claim());
            let sub_claims = take_outcome(&mut analysis, EvaluationStep::Decomposition, outcome);
            analysis.record_decomposition(sub_claims)?;
        }

        analysis.bucket_evidence(passages)?;
        let evidence = evidence_text(
            analysis.evidence(),
            self.config.max_passages,
            self.config.passage_char_limit,
        );

        let definite = if self.config.evaluate_sub_claims {
            let _span = stage_span!(analysis.claim_id(), "sub_claims").entered();
            self.evaluate_sub_claims(&mut analysis, &evaluator, &evidence)?
        } else {
            None
        };

        let claim = analysis.claim().clone();

        let support = {
            let _span = stage_span!(claim.claim_id, AnalysisStage::SupportEvaluated).entered();
            let outcome =
                evaluator.evaluate_support(&claim.claim_text, &claim.character, &evidence);
            take_outcome(&mut analysis, EvaluationStep::Support, outcome)
        };
        analysis.record_support(support.confidence, support.excerpts.clone())?;

        let contradiction = {
            let _span =
                stage_span!(claim.claim_id, AnalysisStage::ContradictionEvaluated).entered();
            let outcome =
                evaluator.evaluate_contradiction(&claim.claim_text, &claim.character, &evidence);
            take_outcome(&mut analysis, EvaluationStep::Contradiction, outcome)
        };
        let violation = violation_for(&contradiction, MAIN_SUB_CLAIM_ID, analysis.evidence());
        if let Some(v) = &violation {
            note_violation(&claim.claim_id, v);
        }
        analysis.record_contradiction(
            contradiction.confidence,
            contradiction.excerpts.clone(),
            violation,
        )?;

        let synthesis = self.synthesizer.synthesize(&SynthesisInput {
            support_confidence: analysis.support_score(),
            support_reasoning: &support.reasoning,
            contradiction_confidence: analysis.contradiction_score(),
            contradiction_reasoning: &contradiction.reasoning,
            violation: contradiction.violation,
            sub_claims: analysis.sub_claims(),
            definite_contradiction: definite
                .as_ref()
                .map(|(confidence, v)| DefiniteContradiction {
                    sub_claim_id: &v.sub_claim_id,
                    confidence: *confidence,
                    reasoning: &v.description,
                }),
        });
        debug!(claim_id = %claim.claim_id, basis = ?synthesis.basis, "verdict synthesized");
        analysis.record_synthesis(synthesis.verdict, synthesis.confidence, synthesis.reasoning)?;

        Ok(analysis)
    }

    /// Both passes over each sub-claim's own text. Returns the strongest
    /// DEFINITE violation found, with its contradiction confidence.
    fn evaluate_sub_claims(
        &self,
        analysis: &mut ClaimAnalysis,
        evaluator: &DualEvaluator<'_>,
        evidence: &str,
    ) -> CanonResult<Option<(f64, ConstraintViolation)>> {
        let character = analysis.claim().character.clone();
        let claim_id = analysis.claim_id().to_string();
        let targets: Vec<(String, String)> = analysis
            .sub_claims()
            .iter()
            .map(|sc| (sc.id.clone(), sc.text.clone()))
            .collect();
        let mut strongest: Option<(f64, ConstraintViolation)> = None;

        for (sub_claim_id, text) in targets {
            let support = take_outcome(
                analysis,
                EvaluationStep::SubClaimSupport {
                    sub_claim_id: sub_claim_id.clone(),
                },
                evaluator.evaluate_support(&text, &character, evidence),
            );
            let contradiction = take_outcome(
                analysis,
                EvaluationStep::SubClaimContradiction {
                    sub_claim_id: sub_claim_id.clone(),
                },
                evaluator.evaluate_contradiction(&text, &character, evidence),
            );
            let synthesis = self.synthesizer.synthesize(&SynthesisInput {
                support_confidence: support.confidence,
                support_reasoning: &support.reasoning,
                contradiction_confidence: contradiction.confidence,
                contradiction_reasoning: &contradiction.reasoning,
                violation: contradiction.violation,
                sub_claims: &[],
                definite_contradiction: None,
            });
            let violation = violation_for(&contradiction, &sub_claim_id, analysis.evidence());
            if let Some(v) = &violation {
                note_violation(&claim_id, v);
                let stronger = strongest
                    .as_ref()
                    .map_or(true, |(c, _)| contradiction.confidence > *c);
                if v.severity == Severity::Definite && stronger {
                    strongest = Some((contradiction.confidence, v.clone()));
                }
            }
            analysis.record_sub_claim_evaluation(
                &sub_claim_id,
                SubClaimEvaluation {
                    verdict: synthesis.verdict,
                    confidence: synthesis.confidence,
                    reasoning: synthesis.reasoning,
                    supporting_excerpts: support.excerpts,
                    contradicting_excerpts: contradiction.excerpts,
                    violation,
                },
            )?;
        }
        Ok(strongest)
    }

    /// The produced artifact for a synthesized analysis.
    pub fn to_record(analysis: &ClaimAnalysis) -> CanonResult<VerdictRecord> {
        Ok(VerdictRecord::from_analysis(analysis)?)
    }
}

/// Unwraps an outcome, noting a fallback on the analysis when it defaulted.
fn take_outcome<T>(
    analysis: &mut ClaimAnalysis,
    step: EvaluationStep,
    outcome: StageOutcome<T>,
) -> T {
    let (value, cause) = outcome.into_parts();
    if let Some(cause) = cause {
        events::stage_fallback(analysis.claim_id(), &step.to_string(), &cause.to_string());
        analysis.record_fallback(StageFallback { step, cause });
    }
    value
}

fn note_violation(claim_id: &str, violation: &ConstraintViolation) {
    events::violation_recorded(
        claim_id,
        &violation.sub_claim_id,
        violation.constraint_category.as_str(),
        violation.severity.as_str(),
    );
}
