//! Dual-perspective evaluation.
//!
//! The support pass and the contradiction pass read the same evidence text
//! but run as separate calls and are decoded separately. Neither sees the
//! other's answer.

use canon_core::constants::{
    CONTRADICTION_FAILURE_CONFIDENCE, SUPPORT_FAILURE_CONFIDENCE, VIOLATION_REPORTING_FLOOR,
};
use canon_core::models::{
    truncate_chars, ConstraintViolation, DefaultCause, EvidencePassage, Severity, StageOutcome,
    TemporalPosition, ViolationLabel,
};
use canon_core::prompts::{contradiction_prompt, support_prompt};
use canon_core::traits::ExpectedShape;
use canon_llm::StructuredClient;
use serde_json::Value;

use crate::decode;
use crate::gate::DependencyGate;

/// Shown to the generator when retrieval found nothing.
pub const NO_EVIDENCE_TEXT: &str = "No evidence passages were retrieved for this claim.";

const NO_REASONING: &str = "No reasoning";

/// Answer of the support-seeking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportAssessment {
    pub confidence: f64,
    pub reasoning: String,
    pub excerpts: Vec<String>,
}

impl SupportAssessment {
    pub fn failed() -> Self {
        Self {
            confidence: SUPPORT_FAILURE_CONFIDENCE,
            reasoning: "Failed to analyze support".to_string(),
            excerpts: Vec::new(),
        }
    }

    /// `None` unless `value` is an object.
    pub fn from_value(value: &Value, max_excerpts: usize) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            confidence: decode::confidence(
                decode::field(obj, &["support_confidence", "confidence"]),
                SUPPORT_FAILURE_CONFIDENCE,
            ),
            reasoning: decode::text(
                decode::field(obj, &["support_reasoning", "reasoning"]),
                NO_REASONING,
            ),
            excerpts: decode::excerpts(
                decode::field(obj, &["supporting_excerpts", "excerpts"]),
                max_excerpts,
            ),
        })
    }
}

/// Answer of the contradiction-seeking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ContradictionAssessment {
    pub confidence: f64,
    pub reasoning: String,
    pub excerpts: Vec<String>,
    pub violation: ViolationLabel,
}

impl ContradictionAssessment {
    pub fn failed() -> Self {
        Self {
            confidence: CONTRADICTION_FAILURE_CONFIDENCE,
            reasoning: "Failed to analyze contradiction".to_string(),
            excerpts: Vec::new(),
            violation: ViolationLabel::None,
        }
    }

    /// `None` unless `value` is an object.
    pub fn from_value(value: &Value, max_excerpts: usize) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            confidence: decode::confidence(
                decode::field(obj, &["contradiction_confidence", "confidence"]),
                CONTRADICTION_FAILURE_CONFIDENCE,
            ),
            reasoning: decode::text(
                decode::field(obj, &["contradiction_reasoning", "reasoning"]),
                NO_REASONING,
            ),
            excerpts: decode::excerpts(
                decode::field(obj, &["contradicting_excerpts", "excerpts"]),
                max_excerpts,
            ),
            violation: decode::field(obj, &["violation_type", "violation"])
                .and_then(Value::as_str)
                .map(ViolationLabel::from_label)
                .unwrap_or_default(),
        })
    }
}

/// Runs the two passes for one claim or sub-claim.
pub struct DualEvaluator<'a> {
    client: &'a StructuredClient,
    gate: &'a DependencyGate,
    max_excerpts: usize,
}

impl<'a> DualEvaluator<'a> {
    pub fn new(client: &'a StructuredClient, gate: &'a DependencyGate, max_excerpts: usize) -> Self {
        Self {
            client,
            gate,
            max_excerpts,
        }
    }

    pub fn evaluate_support(
        &self,
        claim_text: &str,
        character: &str,
        evidence_text: &str,
    ) -> StageOutcome<SupportAssessment> {
        let prompt = support_prompt(claim_text, character, evidence_text);
        match self.gate.generate(self.client, &prompt, ExpectedShape::Object) {
            Ok(value) => match SupportAssessment::from_value(&value, self.max_excerpts) {
                Some(assessment) => StageOutcome::Generated(assessment),
                None => StageOutcome::defaulted(SupportAssessment::failed(), not_an_object()),
            },
            Err(cause) => StageOutcome::defaulted(SupportAssessment::failed(), cause),
        }
    }

    pub fn evaluate_contradiction(
        &self,
        claim_text: &str,
        character: &str,
        evidence_text: &str,
    ) -> StageOutcome<ContradictionAssessment> {
        let prompt = contradiction_prompt(claim_text, character, evidence_text);
        match self.gate.generate(self.client, &prompt, ExpectedShape::Object) {
            Ok(value) => match ContradictionAssessment::from_value(&value, self.max_excerpts) {
                Some(assessment) => StageOutcome::Generated(assessment),
                None => {
                    StageOutcome::defaulted(ContradictionAssessment::failed(), not_an_object())
                }
            },
            Err(cause) => StageOutcome::defaulted(ContradictionAssessment::failed(), cause),
        }
    }
}

fn not_an_object() -> DefaultCause {
    DefaultCause::Malformed {
        reason: "expected a JSON object".to_string(),
    }
}

/// The evidence block shown to both passes.
///
/// The first `max_passages` passages in retrieval order, each cut to
/// `char_limit` characters, as `[SLICE] text` separated by blank lines.
pub fn evidence_text(
    passages: &[EvidencePassage],
    max_passages: usize,
    char_limit: usize,
) -> String {
    if passages.is_empty() || max_passages == 0 {
        return NO_EVIDENCE_TEXT.to_string();
    }
    passages
        .iter()
        .take(max_passages)
        .map(|p| format!("[{}] {}", p.temporal_slice, truncate_chars(&p.text, char_limit)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A violation for `sub_claim_id` when the contradiction is above the
/// reporting floor and names a category.
pub fn violation_for(
    assessment: &ContradictionAssessment,
    sub_claim_id: &str,
    passages: &[EvidencePassage],
) -> Option<ConstraintViolation> {
    if assessment.confidence <= VIOLATION_REPORTING_FLOOR {
        return None;
    }
    let category = assessment.violation.category()?;
    let excerpt = assessment.excerpts.first().cloned().unwrap_or_default();
    Some(ConstraintViolation {
        sub_claim_id: sub_claim_id.to_string(),
        constraint_category: category,
        description: assessment.reasoning.clone(),
        temporal_position: locate_excerpt(&excerpt, passages),
        novel_excerpt: excerpt,
        severity: Severity::from_confidence(assessment.confidence),
    })
}

/// Slice of the first passage containing `excerpt`, ignoring case,
/// whitespace runs, surrounding quotes and ellipses.
pub fn locate_excerpt(excerpt: &str, passages: &[EvidencePassage]) -> TemporalPosition {
    let needle = normalize_for_match(excerpt);
    if needle.is_empty() {
        return TemporalPosition::Unknown;
    }
    passages
        .iter()
        .find(|p| normalize_for_match(&p.text).contains(&needle))
        .map(|p| TemporalPosition::from(p.temporal_slice))
        .unwrap_or(TemporalPosition::Unknown)
}

fn normalize_for_match(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    collapsed
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2026}'))
        .trim_start_matches("...")
        .trim_end_matches("...")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_core::models::{ConstraintCategory, TemporalSlice};
    use serde_json::json;

    fn make_passages() -> Vec<EvidencePassage> {
        vec![
            EvidencePassage::new("a", "The ship sailed at dawn.", TemporalSlice::Early),
            EvidencePassage::new(
                "b",
                "He never learned to   read\nuntil prison.",
                TemporalSlice::Late,
            ),
        ]
    }

    fn make_assessment(confidence: f64, label: &str, excerpt: &str) -> ContradictionAssessment {
        ContradictionAssessment {
            confidence,
            reasoning: "conflict".into(),
            excerpts: vec![excerpt.to_string()],
            violation: ViolationLabel::from_label(label),
        }
    }

    #[test]
    fn support_decoding_defaults() {
        let a = SupportAssessment::from_value(&json!({}), 5).unwrap();
        assert_eq!(a.confidence, 0.3);
        assert_eq!(a.reasoning, "No reasoning");
        assert!(a.excerpts.is_empty());
        assert!(SupportAssessment::from_value(&json!([1]), 5).is_none());
    }

    #[test]
    fn contradiction_decoding_reads_label() {
        let v = json!({
            "contradicting_excerpts": ["x"],
            "contradiction_confidence": "0.65",
            "contradiction_reasoning": "timeline",
            "violation_type": "Temporal",
        });
        let a = ContradictionAssessment::from_value(&v, 5).unwrap();
        assert_eq!(a.confidence, 0.65);
        assert_eq!(a.violation, ViolationLabel::Category(ConstraintCategory::Temporal));

        let a = ContradictionAssessment::from_value(&json!({}), 5).unwrap();
        assert_eq!(a.confidence, 0.0);
        assert_eq!(a.violation, ViolationLabel::None);
    }

    #[test]
    fn evidence_text_formats_and_limits() {
        let mut passages = make_passages();
        passages.push(EvidencePassage::new("c", "x".repeat(50), TemporalSlice::Mid));
        let text = evidence_text(&passages, 3, 10);
        let blocks: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "[EARLY] The ship s");
        assert_eq!(blocks[2], format!("[MID] {}", "x".repeat(10)));

        assert_eq!(evidence_text(&passages, 1, 1500), "[EARLY] The ship sailed at dawn.");
        assert_eq!(evidence_text(&[], 5, 1500), NO_EVIDENCE_TEXT);
    }

    #[test]
    fn severity_steps() {
        let passages = make_passages();
        let cases = [
            (0.65, Some(Severity::Definite)),
            (0.45, Some(Severity::Likely)),
            (0.32, Some(Severity::Possible)),
            (0.3, None),
        ];
        for (confidence, expected) in cases {
            let assessment = make_assessment(confidence, "temporal", "x");
            let v = violation_for(&assessment, "MAIN", &passages);
            assert_eq!(v.map(|v| v.severity), expected, "{confidence}");
        }
    }

    #[test]
    fn none_label_records_nothing() {
        let v = violation_for(&make_assessment(0.9, "none", "x"), "MAIN", &make_passages());
        assert!(v.is_none());
    }

    #[test]
    fn excerpt_position_is_located() {
        let passages = make_passages();
        let v = violation_for(
            &make_assessment(0.7, "capability", "\"never learned to READ until prison...\""),
            "SC2",
            &passages,
        )
        .unwrap();
        assert_eq!(v.temporal_position, TemporalPosition::Late);
        assert_eq!(v.sub_claim_id, "SC2");
        assert_eq!(v.constraint_category, ConstraintCategory::Capability);

        let assessment = make_assessment(0.7, "factual", "not in any passage");
        let v = violation_for(&assessment, "MAIN", &passages).unwrap();
        assert_eq!(v.temporal_position, TemporalPosition::Unknown);
    }
}
