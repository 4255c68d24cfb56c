use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;

use crate::constants::UNKNOWN_FIELD;

/// A backstory statement to verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Accepts a JSON number or string; always stored as a string.
    #[serde(deserialize_with = "string_or_number")]
    pub claim_id: String,
    pub claim_text: String,
    #[serde(default = "unknown", deserialize_with = "or_unknown")]
    pub character: String,
    #[serde(default = "unknown", deserialize_with = "or_unknown")]
    pub book_name: String,
}

impl Claim {
    pub fn new(claim_id: impl Into<String>, claim_text: impl Into<String>) -> Self {
        Self {
            claim_id: claim_id.into(),
            claim_text: claim_text.into(),
            character: unknown(),
            book_name: unknown(),
        }
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = non_blank_or_unknown(character.into());
        self
    }

    pub fn with_book(mut self, book_name: impl Into<String>) -> Self {
        self.book_name = non_blank_or_unknown(book_name.into());
        self
    }
}

fn unknown() -> String {
    UNKNOWN_FIELD.to_string()
}

fn non_blank_or_unknown(value: String) -> String {
    if value.trim().is_empty() {
        unknown()
    } else {
        value
    }
}

fn or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(non_blank_or_unknown(value.unwrap_or_default()))
}

/// Deserializes an id given either as a JSON string or a JSON number.
pub fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(f) => f.to_string(),
    })
}

/// Orders claim ids numerically when both parse as integers, else lexicographically.
/// Numeric ids sort before non-numeric ones.
pub fn compare_claim_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_unknown() {
        let c: Claim =
            serde_json::from_str(r#"{"claim_id": 12, "claim_text": "He was a sailor."}"#).unwrap();
        assert_eq!(c.claim_id, "12");
        assert_eq!(c.character, "Unknown");
        assert_eq!(c.book_name, "Unknown");
    }

    #[test]
    fn null_fields_default_to_unknown() {
        let c: Claim = serde_json::from_str(
            r#"{"claim_id": "7", "claim_text": "t", "character": null, "book_name": ""}"#,
        )
        .unwrap();
        assert_eq!(c.character, "Unknown");
        assert_eq!(c.book_name, "Unknown");
    }

    #[test]
    fn builders_keep_values() {
        let c = Claim::new("1", "t").with_character("Edmond").with_book("Monte Cristo");
        assert_eq!(c.character, "Edmond");
        assert_eq!(c.book_name, "Monte Cristo");
    }

    #[test]
    fn claim_ids_order_numerically() {
        let mut ids = vec!["10", "9", "abc", "100", "2"];
        ids.sort_by(|a, b| compare_claim_ids(a, b));
        assert_eq!(ids, vec!["2", "9", "10", "100", "abc"]);
    }
}
