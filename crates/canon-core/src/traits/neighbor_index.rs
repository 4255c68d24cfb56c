use crate::errors::CanonResult;
use crate::models::EvidencePassage;

/// Nearest-neighbour search over the chunked narrative corpus.
pub trait INeighborIndex: Send + Sync {
    /// Up to `k` passages, best first. `score` is higher-is-closer.
    fn search(&self, query: &str, k: usize) -> CanonResult<Vec<EvidencePassage>>;
}
