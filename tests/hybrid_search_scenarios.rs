//! Black-box integration tests against `CatalogEngine`'s public API, using
//! only the bundled in-memory Doc Store and hashing embedder — the way an
//! external consumer of this crate would exercise it.

use std::sync::Arc;

use catalog_search::docstore::{DocStore, InMemoryDocStore};
use catalog_search::document::Document;
use catalog_search::embedder::HashingEmbedder;
use catalog_search::engine::CatalogEngine;

const DIM: usize = 32;

fn three_document_corpus() -> Vec<Document> {
    vec![
        Document::new("d1").with_text("OPC cement 43 grade", "binders", ""),
        Document::new("d2").with_text("TMT steel bars", "metal", ""),
        Document::new("d3").with_text("white cement powder", "binders", ""),
    ]
}

async fn bootstrapped_engine(documents: Vec<Document>) -> CatalogEngine {
    let store = Arc::new(InMemoryDocStore::seed(documents));
    let embedder = Arc::new(HashingEmbedder::new(DIM));
    CatalogEngine::bootstrap(DIM, store, embedder).await.unwrap()
}

#[tokio::test]
async fn cement_query_surfaces_both_cement_products() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    let response = engine.search("cement", 2, 0.0, 0.6, 0.4).await.unwrap();
    let ids: Vec<&str> = response.results.iter().map(|h| h.doc_id.as_str()).collect();

    assert!(ids.contains(&"d1"));
    assert!(ids.contains(&"d3"));
    assert!(!ids.contains(&"d2"));
}

#[tokio::test]
async fn update_one_moves_document_into_keyword_results() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    // Mutate d2's content directly in the store, then notify the engine.
    let store = Arc::new(InMemoryDocStore::seed(three_document_corpus()));
    let embedder = Arc::new(HashingEmbedder::new(DIM));
    let engine = CatalogEngine::bootstrap(DIM, store.clone(), embedder).await.unwrap();

    let mut d2 = store.fetch("d2").await.unwrap();
    d2.title = "cement additive".to_string();
    store.upsert(d2).await.unwrap();
    engine.update_one("d2").await.unwrap();

    let response = engine.search("cement", 10, 0.0, 0.6, 0.4).await.unwrap();
    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results.last().unwrap().doc_id, "d2");

    let _ = engine; // keep the first `engine` binding's drop order explicit
}

#[tokio::test]
async fn pure_keyword_weighting_matches_bm25_only_order() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    let response = engine.search("steel", 10, 0.0, 0.0, 1.0).await.unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].doc_id, "d2");
}

#[tokio::test]
async fn pure_semantic_weighting_ignores_raw_keyword_score_in_ranking() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    let pure_keyword = engine.search("steel", 10, 0.0, 0.0, 1.0).await.unwrap();
    let pure_semantic = engine.search("steel", 10, 0.0, 1.0, 0.0).await.unwrap();

    assert!(!pure_semantic.results.is_empty());
    // Raw keyword_score is still reported for transparency even though it
    // carries zero weight in the combined ordering.
    assert!(pure_keyword.results[0].keyword_score > 0.0);
}

#[tokio::test]
async fn rebuild_after_add_is_deterministic_for_keyword_scores() {
    let store = Arc::new(InMemoryDocStore::seed(three_document_corpus()));
    let embedder = Arc::new(HashingEmbedder::new(DIM));
    let engine = CatalogEngine::bootstrap(DIM, store.clone(), embedder).await.unwrap();

    let before = engine.search("cement", 10, 0.0, 0.6, 0.4).await.unwrap();
    engine.rebuild().await.unwrap();
    let after = engine.search("cement", 10, 0.0, 0.6, 0.4).await.unwrap();

    assert_eq!(before.results.len(), after.results.len());
    for (b, a) in before.results.iter().zip(after.results.iter()) {
        assert_eq!(b.doc_id, a.doc_id);
        assert!((b.keyword_score - a.keyword_score).abs() < 1e-9);
    }
}

#[tokio::test]
async fn remove_one_excludes_document_from_every_future_search() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    engine.remove_one("d1").await.unwrap();
    let response = engine.search("cement", 10, 0.0, 0.6, 0.4).await.unwrap();

    assert!(!response.results.iter().any(|h| h.doc_id == "d1"));
    let health = engine.health();
    assert_eq!(health.materials_loaded, 2);
}

#[tokio::test]
async fn add_one_is_idempotent_across_repeated_calls() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    engine.add_one("d1").await.unwrap();
    engine.add_one("d1").await.unwrap();
    engine.add_one("d1").await.unwrap();

    assert_eq!(engine.health().materials_loaded, 3);
}

#[tokio::test]
async fn top_k_greater_than_corpus_never_errors() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    let response = engine.search("cement steel", 1000, 0.0, 0.6, 0.4).await.unwrap();
    assert!(response.results.len() <= 3);
}

#[tokio::test]
async fn empty_query_returns_empty_result_not_an_error() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    let response = engine.search("the a an", 10, 0.0, 0.6, 0.4).await.unwrap();
    assert!(response.results.is_empty());
    assert_eq!(response.total, 0);
}

#[tokio::test]
async fn min_score_one_keeps_only_perfectly_normalized_hits() {
    let engine = bootstrapped_engine(three_document_corpus()).await;

    let response = engine.search("cement", 10, 1.0, 0.6, 0.4).await.unwrap();
    assert!(response.results.iter().all(|h| (h.combined_score - 1.0).abs() < 1e-9));
}

#[tokio::test]
async fn concurrent_readers_never_see_split_index_state() {
    let store = Arc::new(InMemoryDocStore::seed(three_document_corpus()));
    let embedder = Arc::new(HashingEmbedder::new(DIM));
    let engine = Arc::new(CatalogEngine::bootstrap(DIM, store, embedder).await.unwrap());

    let mut readers = Vec::new();
    for _ in 0..20 {
        let engine = engine.clone();
        readers.push(tokio::spawn(async move {
            let response = engine.search("cement", 10, 0.0, 0.6, 0.4).await.unwrap();
            // Either the pre- or post-write corpus, never a partial one: a
            // hit for d1 always comes with consistent keyword/semantic
            // scores, never a doc present in one index but not the other.
            response.results.len()
        }));
    }

    let writer = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.add_one("d2").await })
    };

    for reader in readers {
        let count = reader.await.unwrap();
        assert!(count <= 3);
    }
    writer.await.unwrap().unwrap();
}
