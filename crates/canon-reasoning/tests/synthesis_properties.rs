use canon_core::config::SynthesisThresholds;
use canon_core::models::{ConstraintCategory, Verdict, ViolationLabel};
use canon_reasoning::decode;
use canon_reasoning::{DefiniteContradiction, SynthesisInput, VerdictSynthesizer};
use proptest::prelude::*;
use serde_json::json;

fn make_input(support: f64, contradiction: f64) -> SynthesisInput<'static> {
    SynthesisInput {
        support_confidence: support,
        support_reasoning: "s",
        contradiction_confidence: contradiction,
        contradiction_reasoning: "c",
        violation: ViolationLabel::Category(ConstraintCategory::Factual),
        sub_claims: &[],
        definite_contradiction: None,
    }
}

proptest! {
    #[test]
    fn synthesis_is_pure_and_bounded(support in 0.0f64..=1.0, contradiction in 0.0f64..=1.0) {
        for thresholds in [SynthesisThresholds::conservative(), SynthesisThresholds::boosted()] {
            let synthesizer = VerdictSynthesizer::new(thresholds);
            let input = make_input(support, contradiction);
            let first = synthesizer.synthesize(&input);
            let second = synthesizer.synthesize(&input);
            prop_assert_eq!(&first, &second);
            prop_assert!((0.0..=1.0).contains(&first.confidence));
        }
    }

    #[test]
    fn strong_contradiction_always_wins(support in 0.0f64..=1.0, contradiction in 0.41f64..=1.0) {
        let s = VerdictSynthesizer::default().synthesize(&make_input(support, contradiction));
        prop_assert_eq!(s.verdict, Verdict::Contradicted);
    }

    #[test]
    fn definite_sub_claim_always_contradicts(
        support in 0.0f64..=1.0,
        contradiction in 0.0f64..=1.0,
        definite in 0.61f64..=1.0,
    ) {
        for thresholds in [SynthesisThresholds::conservative(), SynthesisThresholds::boosted()] {
            let mut input = make_input(support, contradiction);
            input.definite_contradiction = Some(DefiniteContradiction {
                sub_claim_id: "SC1",
                confidence: definite,
                reasoning: "c",
            });
            let s = VerdictSynthesizer::new(thresholds).synthesize(&input);
            prop_assert_eq!(s.verdict, Verdict::Contradicted);
            prop_assert!(s.confidence <= thresholds.confidence_cap);
        }
    }

    #[test]
    fn supported_needs_weak_contradiction(support in 0.0f64..=1.0, contradiction in 0.25f64..=1.0) {
        let s = VerdictSynthesizer::default().synthesize(&make_input(support, contradiction));
        prop_assert_ne!(s.verdict, Verdict::Supported);
    }

    #[test]
    fn decoded_confidence_is_in_range(raw in proptest::num::f64::ANY, default in 0.0f64..=1.0) {
        let value = serde_json::Number::from_f64(raw).map(serde_json::Value::Number);
        let c = decode::confidence(value.as_ref(), default);
        prop_assert!((0.0..=1.0).contains(&c));
        let c = decode::confidence(Some(&json!(raw.to_string())), default);
        prop_assert!((0.0..=1.0).contains(&c));
    }
}
