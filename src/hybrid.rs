//! The hybrid ranker: fuses BM25 and vector search results by independent
//! min-max normalization and a weighted sum.
//!
//! Grounded directly in `HybridSearchEngine._combine_results` /
//! `HybridSearchEngine.search`: fetch `min(top_k * 3, 50)` from each engine
//! at `min_score = 0.0`, normalize each side's raw scores into `[0, 1]`
//! independently, combine with `semantic_weight`/`keyword_weight`, then
//! filter and truncate once on the combined score.

use ahash::AHashMap;
use std::cmp::Ordering;

use crate::bm25::Bm25Index;
use crate::document::Document;
use crate::error::Result;
use crate::vector::VectorIndex;

const MAX_FETCH: usize = 50;

/// One fused hit, carrying both component scores for transparency.
#[derive(Debug, Clone)]
pub struct HybridHit {
    pub doc_id: String,
    pub document: Document,
    pub semantic_score: f64,
    pub keyword_score: f64,
    pub combined_score: f64,
}

/// Stateless fusion logic over a caller-supplied BM25/vector index pair.
/// Holds no state of its own; the catalog engine owns the indexes and the
/// lock around them.
#[derive(Debug, Default)]
pub struct HybridRanker;

impl HybridRanker {
    pub fn new() -> Self {
        Self
    }

    /// Run a hybrid search. Weights need not sum to 1 — they're applied as
    /// given; callers wanting a convex combination normalize before calling.
    /// A query with no hits on either side returns an empty list rather than
    /// an error.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &self,
        bm25: &Bm25Index,
        vector: &VectorIndex,
        query: &str,
        query_embedding: &[f32],
        top_k: usize,
        min_score: f64,
        semantic_weight: f64,
        keyword_weight: f64,
    ) -> Result<Vec<HybridHit>> {
        let fetch_count = (top_k.saturating_mul(3)).min(MAX_FETCH);

        let keyword_hits = bm25.search(query, fetch_count, 0.0);
        let semantic_hits = vector.search(query_embedding, fetch_count, 0.0)?;

        let keyword_scores: AHashMap<String, f64> = keyword_hits
            .iter()
            .map(|h| (h.doc_id.clone(), h.score))
            .collect();
        let semantic_scores: AHashMap<String, f64> = semantic_hits
            .iter()
            .map(|h| (h.doc_id.clone(), h.score))
            .collect();

        let mut documents: AHashMap<String, Document> = AHashMap::new();
        for hit in &keyword_hits {
            documents.entry(hit.doc_id.clone()).or_insert_with(|| hit.document.clone());
        }
        for hit in &semantic_hits {
            documents.entry(hit.doc_id.clone()).or_insert_with(|| hit.document.clone());
        }

        let normalized_keyword = min_max_normalize(&keyword_scores);
        let normalized_semantic = min_max_normalize(&semantic_scores);

        let mut all_doc_ids: Vec<&String> = documents.keys().collect();
        all_doc_ids.sort();

        let mut hits: Vec<HybridHit> = all_doc_ids
            .into_iter()
            .map(|doc_id| {
                let sem_raw = *semantic_scores.get(doc_id).unwrap_or(&0.0);
                let kw_raw = *keyword_scores.get(doc_id).unwrap_or(&0.0);
                let sem_norm = *normalized_semantic.get(doc_id).unwrap_or(&0.0);
                let kw_norm = *normalized_keyword.get(doc_id).unwrap_or(&0.0);
                let combined_score = semantic_weight * sem_norm + keyword_weight * kw_norm;
                HybridHit {
                    doc_id: doc_id.clone(),
                    document: documents[doc_id].clone(),
                    semantic_score: sem_raw,
                    keyword_score: kw_raw,
                    combined_score,
                }
            })
            .filter(|hit| hit.combined_score >= min_score)
            .collect();

        hits.sort_by(|a, b| match b.combined_score.partial_cmp(&a.combined_score).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.doc_id.cmp(&b.doc_id),
            other => other,
        });
        hits.truncate(top_k);

        Ok(hits)
    }
}

/// Min-max scale raw scores to `[0, 1]`. When the map is empty or every
/// score ties, every entry normalizes to `0.0` — a known limitation of
/// independent per-side normalization on a single result list.
fn min_max_normalize(scores: &AHashMap<String, f64>) -> AHashMap<String, f64> {
    if scores.is_empty() {
        return AHashMap::new();
    }
    let max = scores.values().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = scores.values().cloned().fold(f64::INFINITY, f64::min);
    let spread = max - min;

    scores
        .iter()
        .map(|(doc_id, &score)| {
            let normalized = if spread > 0.0 { (score - min) / spread } else { 0.0 };
            (doc_id.clone(), normalized)
        })
        .collect()
}
