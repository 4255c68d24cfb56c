//! Fixed prompt templates for each generator-backed stage.
//!
//! Each template names the category vocabulary and the exact JSON shape
//! the decoders in `canon-reasoning` read back.

use crate::models::{Claim, ConstraintCategory, SubClaim, Verdict};

/// Sent as the system message with every call.
pub const SYSTEM_INSTRUCTION: &str = "You output valid JSON only. No markdown, no commentary.";

fn category_lines() -> String {
    ConstraintCategory::ALL
        .iter()
        .map(|c| format!("- {}: {}", c.as_str().to_ascii_uppercase(), category_hint(*c)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn category_hint(category: ConstraintCategory) -> &'static str {
    match category {
        ConstraintCategory::Temporal => "when events occur (before/after/during)",
        ConstraintCategory::Capability => "what the character can or cannot do",
        ConstraintCategory::Commitment => "promises, oaths, loyalties",
        ConstraintCategory::WorldRule => "laws of the narrative world",
        ConstraintCategory::Psychological => "beliefs, fears, motivations",
        ConstraintCategory::Factual => "concrete facts (names, places, relationships)",
    }
}

fn violation_vocabulary() -> String {
    let mut labels: Vec<&str> = ConstraintCategory::ALL.iter().map(|c| c.as_str()).collect();
    labels.push("none");
    labels.join("|")
}

/// Asks for `[{"id", "text", "type"}]`.
pub fn decomposition_prompt(claim: &Claim) -> String {
    format!(
        r#"Split this character backstory claim into atomic sub-claims.

CLAIM: "{claim_text}"
CHARACTER: "{character}"
BOOK: "{book}"

Give each sub-claim one constraint type:
{categories}

Output a JSON array:
[
  {{"id": "SC1", "text": "...", "type": "temporal"}},
  {{"id": "SC2", "text": "...", "type": "factual"}}
]

Usually 2-5 sub-claims. Each must be verifiable on its own."#,
        claim_text = claim.claim_text,
        character = claim.character,
        book = claim.book_name,
        categories = category_lines(),
    )
}

/// Asks for `{"supporting_excerpts", "support_confidence", "support_reasoning"}`.
pub fn support_prompt(claim_text: &str, character: &str, evidence_text: &str) -> String {
    format!(
        r#"Find evidence that SUPPORTS this claim being TRUE.

CLAIM: "{claim_text}"
CHARACTER: "{character}"

EVIDENCE FROM NOVEL:
{evidence_text}

Which passages confirm the claim or are consistent with it? Look for direct
statements matching the claim, events that require it to be true, and
knowledge or actions of the character that fit it.

Output JSON:
{{
  "supporting_excerpts": ["quote1", "quote2"],
  "support_confidence": 0.0-1.0,
  "support_reasoning": "one sentence"
}}"#
    )
}

/// Asks for `{"contradicting_excerpts", "contradiction_confidence",
/// "contradiction_reasoning", "violation_type"}`.
pub fn contradiction_prompt(claim_text: &str, character: &str, evidence_text: &str) -> String {
    format!(
        r#"Find evidence that CONTRADICTS this claim or makes it IMPOSSIBLE.

CLAIM: "{claim_text}"
CHARACTER: "{character}"

EVIDENCE FROM NOVEL:
{evidence_text}

Which passages conflict with or disprove the claim? Look for direct
contradictions, timelines that cannot both hold, knowledge the character
should have but lacks, and actions incompatible with the claimed background.

Output JSON:
{{
  "contradicting_excerpts": ["quote1", "quote2"],
  "contradiction_confidence": 0.0-1.0,
  "contradiction_reasoning": "one sentence",
  "violation_type": "{labels}"
}}"#,
        labels = violation_vocabulary(),
    )
}

/// Summary prompt over both passes. Asks for `{"verdict", "confidence", "reasoning"}`.
pub fn synthesis_prompt(
    claim_text: &str,
    support_confidence: f64,
    support_reasoning: &str,
    contradiction_confidence: f64,
    contradiction_reasoning: &str,
    violation_type: &str,
    sub_claims: &[SubClaim],
) -> String {
    let sub_claim_verdicts = if sub_claims.is_empty() {
        "(none)".to_string()
    } else {
        sub_claims
            .iter()
            .map(|sc| {
                format!(
                    "- {} [{}]: {}",
                    sc.id,
                    sc.verdict.unwrap_or(Verdict::Undetermined),
                    sc.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        r#"Combine the two analyses below into a final verdict.

CLAIM: "{claim_text}"

SUPPORT ANALYSIS:
- Confidence: {support_confidence:.2}
- Reasoning: {support_reasoning}

CONTRADICTION ANALYSIS:
- Confidence: {contradiction_confidence:.2}
- Reasoning: {contradiction_reasoning}
- Violation type: {violation_type}

SUB-CLAIM VERDICTS:
{sub_claim_verdicts}

Contradiction takes priority over support. Only call the claim supported
when support is strong and contradiction is weak.

Output JSON:
{{
  "verdict": "supported|contradicted|undetermined",
  "confidence": 0.0-1.0,
  "reasoning": "concise explanation citing specific evidence"
}}"#
    )
}
