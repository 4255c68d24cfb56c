//! Query construction for dual-direction retrieval.

/// Negations tried in order; only the first match is applied, once.
const NEGATION_PATTERNS: &[(&str, &str)] = &[
    ("was", "was not"),
    ("had", "never had"),
    ("could", "could not"),
    ("did", "did not"),
    ("always", "never"),
    ("before", "after"),
];

/// The query that looks for passages matching the claim as stated.
pub fn standard_query(character: &str, claim_text: &str) -> String {
    format!("{character}: {claim_text}")
}

/// The query that looks for passages disproving the claim.
///
/// The claim is lowercased and the first pattern found in it is replaced
/// once. Matching is by substring. Claims with no pattern are used as given.
pub fn counterfactual_query(character: &str, claim_text: &str) -> String {
    let lowered = claim_text.to_lowercase();
    let negated = NEGATION_PATTERNS
        .iter()
        .find(|(pattern, _)| lowered.contains(pattern))
        .map(|(pattern, replacement)| lowered.replacen(pattern, replacement, 1));
    match negated {
        Some(text) => standard_query(character, &text),
        None => standard_query(character, claim_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pattern_wins() {
        assert_eq!(
            counterfactual_query("Dantes", "Dantes had a ship and was a sailor"),
            "Dantes: dantes had a ship and was not a sailor"
        );
    }

    #[test]
    fn replaces_only_once() {
        assert_eq!(
            counterfactual_query("Faria", "He did it, then did it again"),
            "Faria: he did not it, then did it again"
        );
    }

    #[test]
    fn later_patterns_apply_when_earlier_absent() {
        assert_eq!(
            counterfactual_query("Mercedes", "She Always waited"),
            "Mercedes: she never waited"
        );
        assert_eq!(
            counterfactual_query("Mercedes", "She left before dawn"),
            "Mercedes: she left after dawn"
        );
    }

    #[test]
    fn no_pattern_keeps_claim_verbatim() {
        assert_eq!(
            counterfactual_query("Villefort", "Villefort burns the Letter"),
            "Villefort: Villefort burns the Letter"
        );
    }

    #[test]
    fn standard_query_format() {
        assert_eq!(standard_query("Noirtier", "He blinks."), "Noirtier: He blinks.");
    }
}
