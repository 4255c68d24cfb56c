//! Verdict synthesis from the two evaluation passes.
//!
//! Pure and deterministic. Contradiction is checked first so a strong
//! contradiction always wins over strong support. A DEFINITE sub-claim
//! violation is checked next and also wins over support.

use canon_core::config::SynthesisThresholds;
use canon_core::models::{SubClaim, Verdict, ViolationLabel};

/// The strongest DEFINITE violation already recorded against a sub-claim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefiniteContradiction<'a> {
    pub sub_claim_id: &'a str,
    pub confidence: f64,
    pub reasoning: &'a str,
}

/// Both passes' answers plus the sub-claim verdicts, if any.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub support_confidence: f64,
    pub support_reasoning: &'a str,
    pub contradiction_confidence: f64,
    pub contradiction_reasoning: &'a str,
    pub violation: ViolationLabel,
    pub sub_claims: &'a [SubClaim],
    pub definite_contradiction: Option<DefiniteContradiction<'a>>,
}

/// Which rule decided the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisBasis {
    Contradiction,
    StrongSupport,
    MixedEvidence,
    WeakSupport,
    InsufficientEvidence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub verdict: Verdict,
    pub confidence: f64,
    pub reasoning: String,
    pub basis: SynthesisBasis,
}

#[derive(Debug, Clone, Copy)]
pub struct VerdictSynthesizer {
    thresholds: SynthesisThresholds,
}

impl Default for VerdictSynthesizer {
    fn default() -> Self {
        Self::new(SynthesisThresholds::conservative())
    }
}

impl VerdictSynthesizer {
    pub fn new(thresholds: SynthesisThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SynthesisThresholds {
        &self.thresholds
    }

    pub fn synthesize(&self, input: &SynthesisInput<'_>) -> Synthesis {
        let t = &self.thresholds;
        let support = input.support_confidence;
        let contradiction = input.contradiction_confidence;

        if contradiction > t.contradiction_threshold {
            return Synthesis {
                verdict: Verdict::Contradicted,
                confidence: (contradiction + t.contradiction_bonus).min(t.confidence_cap),
                reasoning: format!(
                    "Contradiction found ({}): {}",
                    input.violation, input.contradiction_reasoning
                ),
                basis: SynthesisBasis::Contradiction,
            };
        }

        if let Some(definite) = input.definite_contradiction {
            return Synthesis {
                verdict: Verdict::Contradicted,
                confidence: (definite.confidence + t.contradiction_bonus).min(t.confidence_cap),
                reasoning: format!(
                    "Sub-claim {} definitely contradicted: {}",
                    definite.sub_claim_id, definite.reasoning
                ),
                basis: SynthesisBasis::Contradiction,
            };
        }

        if support > t.strong_support_threshold && contradiction < t.weak_contradiction_threshold {
            return Synthesis {
                verdict: Verdict::Supported,
                confidence: support * t.support_penalty,
                reasoning: format!("Evidence supports claim: {}", input.support_reasoning),
                basis: SynthesisBasis::StrongSupport,
            };
        }

        let has_supported = input
            .sub_claims
            .iter()
            .any(|sc| sc.verdict == Some(Verdict::Supported));
        let has_contradicted = input
            .sub_claims
            .iter()
            .any(|sc| sc.verdict == Some(Verdict::Contradicted));

        let (basis, reasoning) = if has_supported && has_contradicted {
            (
                SynthesisBasis::MixedEvidence,
                "Mixed evidence: some sub-claims supported, others contradicted".to_string(),
            )
        } else if support > contradiction {
            (
                SynthesisBasis::WeakSupport,
                format!(
                    "Weak support without clear contradiction: {}",
                    input.support_reasoning
                ),
            )
        } else {
            (
                SynthesisBasis::InsufficientEvidence,
                "Insufficient evidence to verify claim".to_string(),
            )
        };

        Synthesis {
            verdict: Verdict::Undetermined,
            confidence: support.min(t.undetermined_cap).max(t.undetermined_floor),
            reasoning,
            basis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_core::models::ConstraintCategory;

    fn make_input<'a>(support: f64, contradiction: f64) -> SynthesisInput<'a> {
        SynthesisInput {
            support_confidence: support,
            support_reasoning: "matches chapter 3",
            contradiction_confidence: contradiction,
            contradiction_reasoning: "dates conflict",
            violation: ViolationLabel::None,
            sub_claims: &[],
            definite_contradiction: None,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn contradiction_wins() {
        let mut input = make_input(0.8, 0.5);
        input.violation = ViolationLabel::Category(ConstraintCategory::Temporal);
        let s = VerdictSynthesizer::default().synthesize(&input);
        assert_eq!(s.verdict, Verdict::Contradicted);
        assert!(approx(s.confidence, 0.6));
        assert_eq!(s.reasoning, "Contradiction found (temporal): dates conflict");
        assert_eq!(s.basis, SynthesisBasis::Contradiction);
    }

    #[test]
    fn contradicted_confidence_is_capped() {
        let s = VerdictSynthesizer::default().synthesize(&make_input(0.0, 0.99));
        assert!(approx(s.confidence, 0.95));
    }

    #[test]
    fn strong_support_is_discounted() {
        let s = VerdictSynthesizer::default().synthesize(&make_input(0.8, 0.1));
        assert_eq!(s.verdict, Verdict::Supported);
        assert!(approx(s.confidence, 0.72));
        assert_eq!(s.reasoning, "Evidence supports claim: matches chapter 3");
    }

    #[test]
    fn middling_scores_are_undetermined() {
        let s = VerdictSynthesizer::default().synthesize(&make_input(0.5, 0.35));
        assert_eq!(s.verdict, Verdict::Undetermined);
        assert!(approx(s.confidence, 0.5));
        assert_eq!(s.basis, SynthesisBasis::WeakSupport);

        let s = VerdictSynthesizer::default().synthesize(&make_input(0.6, 0.1));
        assert_eq!(s.verdict, Verdict::Undetermined);
        assert!(approx(s.confidence, 0.5));
    }

    #[test]
    fn undetermined_confidence_has_a_floor() {
        let s = VerdictSynthesizer::default().synthesize(&make_input(0.1, 0.2));
        assert!(approx(s.confidence, 0.3));
        assert_eq!(s.reasoning, "Insufficient evidence to verify claim");
    }

    #[test]
    fn ties_are_insufficient_evidence() {
        let s = VerdictSynthesizer::default().synthesize(&make_input(0.3, 0.3));
        assert_eq!(s.basis, SynthesisBasis::InsufficientEvidence);
    }

    #[test]
    fn mixed_sub_claims_take_precedence_over_weak_support() {
        let mut supported = SubClaim::new("SC1", "a", ConstraintCategory::Factual, "1");
        supported.verdict = Some(Verdict::Supported);
        let mut contradicted = SubClaim::new("SC2", "b", ConstraintCategory::Temporal, "1");
        contradicted.verdict = Some(Verdict::Contradicted);
        let sub_claims = vec![supported, contradicted];

        let mut input = make_input(0.6, 0.2);
        input.sub_claims = &sub_claims;
        let s = VerdictSynthesizer::default().synthesize(&input);
        assert_eq!(s.basis, SynthesisBasis::MixedEvidence);
        assert_eq!(
            s.reasoning,
            "Mixed evidence: some sub-claims supported, others contradicted"
        );
    }

    #[test]
    fn definite_sub_claim_overrides_claim_support() {
        let mut input = make_input(0.9, 0.05);
        input.definite_contradiction = Some(DefiniteContradiction {
            sub_claim_id: "SC1",
            confidence: 0.7,
            reasoning: "never learned to swim",
        });
        let s = VerdictSynthesizer::default().synthesize(&input);
        assert_eq!(s.verdict, Verdict::Contradicted);
        assert_eq!(s.basis, SynthesisBasis::Contradiction);
        assert!(approx(s.confidence, 0.8));
        assert_eq!(
            s.reasoning,
            "Sub-claim SC1 definitely contradicted: never learned to swim"
        );
    }

    #[test]
    fn definite_sub_claim_confidence_is_capped() {
        let mut input = make_input(0.9, 0.05);
        input.definite_contradiction = Some(DefiniteContradiction {
            sub_claim_id: "SC3",
            confidence: 0.9,
            reasoning: "swore no oath",
        });
        let s = VerdictSynthesizer::default().synthesize(&input);
        assert!(approx(s.confidence, 0.95));
        assert_eq!(s.basis, SynthesisBasis::Contradiction);
    }

    #[test]
    fn boosted_profile_is_more_permissive() {
        let boosted = VerdictSynthesizer::new(SynthesisThresholds::boosted());
        let s = boosted.synthesize(&make_input(0.65, 0.2));
        assert_eq!(s.verdict, Verdict::Supported);
        assert!(approx(s.confidence, 0.65));

        let s = boosted.synthesize(&make_input(0.2, 0.45));
        assert_eq!(s.verdict, Verdict::Undetermined);
    }
}
