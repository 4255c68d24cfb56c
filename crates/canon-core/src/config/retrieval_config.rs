use serde::{Deserialize, Serialize};

use super::defaults;

/// Temporal retriever configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k_per_slice: usize,
    /// Score added to hits surfaced by the counterfactual query.
    pub contradiction_boost: f64,
    /// Score added to hits from the claim's own book.
    pub book_match_boost: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k_per_slice: defaults::DEFAULT_TOP_K_PER_SLICE,
            contradiction_boost: defaults::DEFAULT_CONTRADICTION_BOOST,
            book_match_boost: defaults::DEFAULT_BOOK_MATCH_BOOST,
        }
    }
}
