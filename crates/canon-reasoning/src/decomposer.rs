//! Claim decomposition into typed sub-claims.

use std::collections::HashSet;

use canon_core::models::{Claim, ConstraintCategory, DefaultCause, StageOutcome, SubClaim};
use canon_core::prompts::decomposition_prompt;
use canon_core::traits::ExpectedShape;
use canon_llm::StructuredClient;
use serde_json::Value;
use tracing::debug;

use crate::decode;
use crate::gate::DependencyGate;

/// Splits a claim into atomic sub-claims via the generator.
pub struct Decomposer<'a> {
    client: &'a StructuredClient,
    gate: &'a DependencyGate,
}

impl<'a> Decomposer<'a> {
    pub fn new(client: &'a StructuredClient, gate: &'a DependencyGate) -> Self {
        Self { client, gate }
    }

    /// Never empty. Falls back to one FACTUAL `SC1` holding the full claim text.
    pub fn decompose(&self, claim: &Claim) -> StageOutcome<Vec<SubClaim>> {
        let fallback = || vec![SubClaim::fallback(&claim.claim_id, &claim.claim_text)];

        let value = match self
            .gate
            .generate(self.client, &decomposition_prompt(claim), ExpectedShape::Array)
        {
            Ok(value) => value,
            Err(cause) => return StageOutcome::defaulted(fallback(), cause),
        };

        let sub_claims = decode_sub_claims(&value, &claim.claim_id);
        if sub_claims.is_empty() {
            return StageOutcome::defaulted(fallback(), DefaultCause::Empty);
        }
        debug!(claim_id = %claim.claim_id, sub_claims = sub_claims.len(), "claim decomposed");
        StageOutcome::Generated(sub_claims)
    }
}

/// Decode `[{id, text, type}]`.
///
/// Items without text are dropped. Unknown types become FACTUAL. Missing or
/// repeated ids are replaced by the first free `SC<n>`. Order is kept.
pub fn decode_sub_claims(value: &Value, parent_claim_id: &str) -> Vec<SubClaim> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    let mut used: HashSet<String> = HashSet::new();
    let mut sub_claims = Vec::with_capacity(items.len());
    for item in items {
        let (id, text, category) = match item {
            Value::Object(obj) => (
                decode::identifier(decode::field(obj, &["id", "sub_claim_id"])),
                decode::text(decode::field(obj, &["text", "claim", "sub_claim"]), ""),
                decode::field(obj, &["type", "constraint_type", "constraint_category"])
                    .and_then(Value::as_str)
                    .map(ConstraintCategory::from_label)
                    .unwrap_or_default(),
            ),
            Value::String(s) => (None, s.trim().to_string(), ConstraintCategory::Factual),
            _ => continue,
        };
        if text.is_empty() {
            continue;
        }

        let id = match id {
            Some(id) if !used.contains(&id) => id,
            _ => next_free_id(&used, sub_claims.len() + 1),
        };
        used.insert(id.clone());
        sub_claims.push(SubClaim::new(id, text, category, parent_claim_id));
    }
    sub_claims
}

fn next_free_id(used: &HashSet<String>, start: usize) -> String {
    (start..)
        .map(|n| format!("SC{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| format!("SC{start}"))
}
