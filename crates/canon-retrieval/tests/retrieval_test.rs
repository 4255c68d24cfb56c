use canon_core::config::RetrievalConfig;
use canon_core::errors::{CanonError, RetrievalError};
use canon_core::models::{Claim, EvidencePassage, QueryType, TemporalSlice};
use canon_core::traits::{IClaimSource, IEvidenceStore};
use canon_retrieval::{counterfactual_query, standard_query, FileEvidenceStore, TemporalRetriever};
use proptest::prelude::*;
use test_fixtures::{bundles_dir, copy_bundles_to, make_claim, make_passage, FakeIndex};

const CLAIM_TEXT: &str = "Dantes was imprisoned in the Chateau d'If.";

fn make_hit(id: &str, slice: TemporalSlice, score: f64) -> EvidencePassage {
    make_passage(id, slice, &format!("text of {id}")).with_score(score)
}

fn make_foreign_hit(id: &str, slice: TemporalSlice, score: f64) -> EvidencePassage {
    EvidencePassage::new(id, format!("text of {id}"), slice)
        .with_book("In Search of the Castaways")
        .with_score(score)
}

fn make_retriever(
    standard: Vec<EvidencePassage>,
    counter: Vec<EvidencePassage>,
) -> TemporalRetriever<FakeIndex> {
    let claim = make_claim("1", CLAIM_TEXT);
    let index = FakeIndex::new()
        .answer(&standard_query(&claim.character, &claim.claim_text), standard)
        .answer(&counterfactual_query(&claim.character, &claim.claim_text), counter);
    TemporalRetriever::new(index, RetrievalConfig::default())
}

fn ids(passages: &[EvidencePassage]) -> Vec<&str> {
    passages.iter().map(|p| p.chunk_id.as_str()).collect()
}

// ─── Temporal retriever ────────────────────────────────────────────────────

#[test]
fn issues_standard_and_counterfactual_queries() {
    let retriever = make_retriever(vec![], vec![]);
    let evidence = retriever.retrieve(&make_claim("1", CLAIM_TEXT)).unwrap();
    assert!(evidence.is_empty());

    let queries = retriever.index().queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].0, "Edmond Dantes: Dantes was imprisoned in the Chateau d'If.");
    assert_eq!(queries[1].0, "Edmond Dantes: dantes was not imprisoned in the chateau d'if.");
    assert!(queries.iter().all(|(_, k)| *k == 12));
}

#[test]
fn boosts_and_tags_by_query() {
    let retriever = make_retriever(
        vec![
            make_hit("a", TemporalSlice::Early, 0.5),
            make_hit("b", TemporalSlice::Mid, 0.4),
        ],
        vec![
            make_hit("b", TemporalSlice::Mid, 0.9),
            make_hit("c", TemporalSlice::Late, 0.3),
        ],
    );
    let evidence = retriever.retrieve(&make_claim("1", CLAIM_TEXT)).unwrap();
    assert_eq!(ids(&evidence), vec!["a", "b", "c"]);

    assert_eq!(evidence[0].query_type, QueryType::Standard);
    assert!((evidence[0].score - 0.7).abs() < 1e-9);
    // Standard score plus book boost plus contradiction boost.
    assert_eq!(evidence[1].query_type, QueryType::Both);
    assert!((evidence[1].score - 0.75).abs() < 1e-9);
    assert_eq!(evidence[2].query_type, QueryType::Counterfactual);
    assert!((evidence[2].score - 0.45).abs() < 1e-9);
}

#[test]
fn drops_other_books() {
    let retriever = make_retriever(
        vec![
            make_foreign_hit("x", TemporalSlice::Early, 0.99),
            make_hit("a", TemporalSlice::Early, 0.1),
        ],
        vec![make_foreign_hit("y", TemporalSlice::Late, 0.99)],
    );
    let evidence = retriever.retrieve(&make_claim("1", CLAIM_TEXT)).unwrap();
    assert_eq!(ids(&evidence), vec!["a"]);
}

#[test]
fn keeps_top_k_per_slice_then_fills() {
    let standard: Vec<EvidencePassage> = (0..6)
        .map(|i| make_hit(&format!("e{i}"), TemporalSlice::Early, 0.1 * i as f64))
        .chain(std::iter::once(make_hit("m0", TemporalSlice::Mid, 0.05)))
        .collect();
    let retriever = make_retriever(standard, vec![]);
    let evidence = retriever.retrieve(&make_claim("1", CLAIM_TEXT)).unwrap();

    // Three best EARLY, the only MID, then the remaining EARLY by score.
    assert_eq!(ids(&evidence), vec!["e5", "e4", "e3", "m0", "e2", "e1", "e0"]);
}

#[test]
fn output_never_exceeds_three_slices_of_k() {
    let standard: Vec<EvidencePassage> = TemporalSlice::ALL
        .iter()
        .flat_map(|slice| {
            (0..4).map(move |i| make_hit(&format!("{slice}{i}"), *slice, i as f64))
        })
        .collect();
    let retriever = make_retriever(standard, vec![]);
    let evidence = retriever.retrieve(&make_claim("1", CLAIM_TEXT)).unwrap();
    assert_eq!(evidence.len(), 9);
    for slice in TemporalSlice::ALL {
        assert_eq!(evidence.iter().filter(|p| p.temporal_slice == slice).count(), 3);
    }
}

#[test]
fn missing_chunk_ids_are_keyed_by_book_and_index() {
    let mut hit = make_hit("", TemporalSlice::Mid, 0.2);
    hit.chunk_idx = 12;
    let retriever = make_retriever(vec![hit.clone()], vec![hit]);
    let evidence = retriever.retrieve(&make_claim("1", CLAIM_TEXT)).unwrap();
    assert_eq!(ids(&evidence), vec!["The Count of Monte Cristo_12"]);
    assert_eq!(evidence[0].query_type, QueryType::Both);
}

// ─── File bundles ──────────────────────────────────────────────────────────

#[test]
fn lists_claims_sorted_with_sentinels() {
    let store = FileEvidenceStore::new(bundles_dir());
    let claims = store.claims().unwrap();
    let ids: Vec<&str> = claims.iter().map(|c| c.claim_id.as_str()).collect();
    assert_eq!(ids, vec!["101", "102", "103"]);
    assert_eq!(claims[1].book_name, "Unknown");
    assert_eq!(claims[2].character, "Unknown");
}

#[test]
fn retrieves_bundle_evidence() {
    let store = FileEvidenceStore::new(bundles_dir());
    let claims = store.claims().unwrap();

    let evidence = store.retrieve(&claims[0]).unwrap();
    assert_eq!(evidence.len(), 3);
    assert_eq!(evidence[1].query_type, QueryType::Both);

    let evidence = store.retrieve(&claims[1]).unwrap();
    assert_eq!(evidence[0].temporal_slice, TemporalSlice::Mid);

    assert!(store.retrieve(&claims[2]).unwrap().is_empty());
}

#[test]
fn missing_bundle_is_an_error() {
    let store = FileEvidenceStore::new(bundles_dir());
    let err = store.retrieve(&Claim::new("999", "t")).unwrap_err();
    assert!(matches!(
        err,
        CanonError::Retrieval(RetrievalError::BundleNotFound { .. })
    ));
}

#[test]
fn unreadable_bundles_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    copy_bundles_to(dir.path());
    std::fs::write(dir.path().join("104.json"), "{not json").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let store = FileEvidenceStore::new(dir.path());
    assert_eq!(store.claims().unwrap().len(), 3);
    assert!(matches!(store.load("104"), Err(RetrievalError::BundleParse { .. })));
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileEvidenceStore::new(dir.path().join("absent"));
    assert!(store.claims().is_err());
}

// ─── Properties ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn counterfactual_query_keeps_character_prefix(text in "[a-zA-Z ]{0,60}") {
        let q = counterfactual_query("Faria", &text);
        prop_assert!(q.starts_with("Faria: "));
    }
}
