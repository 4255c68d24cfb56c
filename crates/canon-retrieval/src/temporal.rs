//! Temporal-aware retrieval over a nearest-neighbour index.
//!
//! Two searches per claim: the claim as stated and its counterfactual. Hits
//! from the claim's own book are boosted, hits seen by both queries are
//! boosted again, then the best `top_k_per_slice` of each temporal slice are
//! kept so the evidence covers the whole narrative arc.

use std::collections::HashMap;

use canon_core::config::RetrievalConfig;
use canon_core::errors::CanonResult;
use canon_core::models::{Claim, EvidencePassage, QueryType, TemporalSlice};
use canon_core::traits::{IEvidenceStore, INeighborIndex};
use tracing::debug;

use crate::counterfactual::{counterfactual_query, standard_query};

/// Over-fetch factor applied to `top_k_per_slice` for each search.
const FETCH_MULTIPLIER: usize = 4;

/// Evidence store backed by an [`INeighborIndex`].
pub struct TemporalRetriever<I: INeighborIndex> {
    index: I,
    config: RetrievalConfig,
}

struct Candidate {
    passage: EvidencePassage,
    same_book: bool,
}

impl<I: INeighborIndex> TemporalRetriever<I> {
    pub fn new(index: I, config: RetrievalConfig) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    fn fetch_k(&self) -> usize {
        self.config.top_k_per_slice * FETCH_MULTIPLIER
    }

    fn gather(&self, claim: &Claim) -> CanonResult<Vec<Candidate>> {
        let k = self.fetch_k();
        let standard = self
            .index
            .search(&standard_query(&claim.character, &claim.claim_text), k)?;
        let counterfactual = self
            .index
            .search(&counterfactual_query(&claim.character, &claim.claim_text), k)?;

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for mut passage in standard {
            let id = chunk_key(&passage);
            if by_id.contains_key(&id) {
                continue;
            }
            let is_same = same_book(&claim.book_name, &passage.book);
            if is_same {
                passage.score += self.config.book_match_boost;
            }
            passage.chunk_id = id.clone();
            passage.query_type = QueryType::Standard;
            by_id.insert(id, candidates.len());
            candidates.push(Candidate {
                passage,
                same_book: is_same,
            });
        }

        for mut passage in counterfactual {
            let id = chunk_key(&passage);
            if let Some(&pos) = by_id.get(&id) {
                let existing = &mut candidates[pos].passage;
                existing.score += self.config.contradiction_boost;
                existing.query_type = QueryType::Both;
                continue;
            }
            if !same_book(&claim.book_name, &passage.book) {
                continue;
            }
            passage.score += self.config.contradiction_boost;
            passage.chunk_id = id.clone();
            passage.query_type = QueryType::Counterfactual;
            by_id.insert(id, candidates.len());
            candidates.push(Candidate {
                passage,
                same_book: true,
            });
        }

        Ok(candidates)
    }

    /// Select per-slice top hits, then top up from the best remainder.
    fn select(&self, candidates: Vec<Candidate>) -> Vec<EvidencePassage> {
        let top_k = self.config.top_k_per_slice;
        let pool: Vec<EvidencePassage> = candidates
            .into_iter()
            .filter(|c| c.same_book)
            .map(|c| c.passage)
            .collect();

        let mut chosen = vec![false; pool.len()];
        let mut selected: Vec<EvidencePassage> = Vec::with_capacity(top_k * 3);
        for slice in TemporalSlice::ALL {
            let mut in_slice: Vec<usize> = (0..pool.len())
                .filter(|&i| pool[i].temporal_slice == slice)
                .collect();
            sort_by_score(&mut in_slice, &pool);
            for i in in_slice.into_iter().take(top_k) {
                chosen[i] = true;
                selected.push(pool[i].clone());
            }
        }

        let target = top_k * TemporalSlice::ALL.len();
        if selected.len() < target {
            let mut remaining: Vec<usize> = (0..pool.len()).filter(|&i| !chosen[i]).collect();
            sort_by_score(&mut remaining, &pool);
            let missing = target - selected.len();
            selected.extend(remaining.into_iter().take(missing).map(|i| pool[i].clone()));
        }
        selected
    }
}

impl<I: INeighborIndex> IEvidenceStore for TemporalRetriever<I> {
    fn retrieve(&self, claim: &Claim) -> CanonResult<Vec<EvidencePassage>> {
        let candidates = self.gather(claim)?;
        let gathered = candidates.len();
        let evidence = self.select(candidates);
        debug!(
            claim_id = %claim.claim_id,
            gathered,
            selected = evidence.len(),
            counterfactual = evidence
                .iter()
                .filter(|p| p.query_type != QueryType::Standard)
                .count(),
            "temporal retrieval finished"
        );
        Ok(evidence)
    }
}

/// Stable descending sort of pool indices by score.
fn sort_by_score(indices: &mut [usize], pool: &[EvidencePassage]) {
    indices.sort_by(|&a, &b| pool[b].score.total_cmp(&pool[a].score));
}

/// Passages without an id are keyed by book and chunk index.
fn chunk_key(passage: &EvidencePassage) -> String {
    if passage.chunk_id.is_empty() {
        format!("{}_{}", passage.book, passage.chunk_idx)
    } else {
        passage.chunk_id.clone()
    }
}

fn normalize_book(name: &str) -> String {
    name.to_lowercase().replace([' ', '_'], "")
}

/// Whether two book names refer to the same book.
///
/// Case, spaces and underscores are ignored; either name may contain the other.
pub fn same_book(claim_book: &str, passage_book: &str) -> bool {
    let a = normalize_book(claim_book);
    let b = normalize_book(passage_book);
    a.contains(&b) || b.contains(&a)
}
