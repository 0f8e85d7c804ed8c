//! The Vector Index (§4.3): dense embeddings plus cosine-similarity search.
//!
//! Grounded in the teacher's SIMD similarity module (`simd_ranking.rs`):
//! same reach for `simsimd::SpatialSimilarity::dot` with a manual-sum
//! fallback, same rayon-parallel per-candidate scoring. The teacher's
//! `SparseVector` intersects sorted `u8` indices because its vectors are
//! bag-of-words term counts; ours are dense float embeddings, so the dot
//! product runs directly over the full slice (`simd_dot_product_dense`'s
//! shape, not `SparseVector::dot_product`'s intersection).

use ahash::AHashMap;
use rayon::prelude::*;
use simsimd::SpatialSimilarity;
use std::cmp::Ordering;

use crate::document::Document;
use crate::error::{CatalogError, Result};

/// One scored hit from [`VectorIndex::search`].
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub doc_id: String,
    pub score: f64,
    pub document: Document,
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    f32::dot(a, b)
        .map(|x| x as f32)
        .unwrap_or_else(|| a.iter().zip(b).map(|(x, y)| x * y).sum())
}

fn l2_norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// The semantic half of the hybrid engine. Every indexed document carries a
/// `dimension`-length, non-zero embedding; dimension mismatches and zero
/// vectors are rejected at insertion, not silently coerced.
#[derive(Debug, Default)]
pub struct VectorIndex {
    dimension: usize,
    embeddings: AHashMap<String, Vec<f32>>,
    norms: AHashMap<String, f32>,
    docmap: AHashMap<String, Document>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            embeddings: AHashMap::new(),
            norms: AHashMap::new(),
            docmap: AHashMap::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.docmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docmap.is_empty()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.docmap.contains_key(doc_id)
    }

    fn validate_embedding(&self, embedding: &[f32]) -> Result<f32> {
        if embedding.len() != self.dimension {
            return Err(CatalogError::dimension_mismatch(self.dimension, embedding.len()));
        }
        let norm = l2_norm(embedding);
        if norm == 0.0 {
            return Err(CatalogError::zero_vector(None::<String>));
        }
        Ok(norm)
    }

    /// Insert a new document. The document must carry an embedding (§3:
    /// ingestion computes it before calling this). Errors with
    /// `AlreadyIndexed` if `doc_id` is already present, `DimensionMismatch`
    /// or `ZeroVector` if the embedding is unusable.
    pub fn add(&mut self, document: Document) -> Result<()> {
        if self.docmap.contains_key(&document.doc_id) {
            return Err(CatalogError::already_indexed(document.doc_id.clone()));
        }
        let embedding = document
            .embedding
            .clone()
            .ok_or_else(|| CatalogError::invalid_input("document has no embedding"))?;
        let norm = self
            .validate_embedding(&embedding)
            .map_err(|e| e.with_doc_id(document.doc_id.clone()))?;

        let doc_id = document.doc_id.clone();
        self.norms.insert(doc_id.clone(), norm);
        self.embeddings.insert(doc_id.clone(), embedding);
        self.docmap.insert(doc_id, document);
        Ok(())
    }

    /// Replace an existing document's embedding and metadata.
    pub fn update(&mut self, document: Document) -> Result<()> {
        if !self.docmap.contains_key(&document.doc_id) {
            return Err(CatalogError::not_indexed(document.doc_id.clone()));
        }
        self.remove_unchecked(&document.doc_id);
        self.add(document)
    }

    /// Delete a document. Errors with `NotIndexed` if absent.
    pub fn remove(&mut self, doc_id: &str) -> Result<()> {
        if !self.docmap.contains_key(doc_id) {
            return Err(CatalogError::not_indexed(doc_id.to_string()));
        }
        self.remove_unchecked(doc_id);
        Ok(())
    }

    fn remove_unchecked(&mut self, doc_id: &str) {
        self.embeddings.remove(doc_id);
        self.norms.remove(doc_id);
        self.docmap.remove(doc_id);
    }

    /// Top-K semantic ranking for a query embedding. Returns an empty result
    /// for an empty index or a zero query vector (cosine is undefined against
    /// the zero vector, so we treat it as no matches rather than an error).
    pub fn search(&self, query_embedding: &[f32], top_k: usize, min_score: f64) -> Result<Vec<VectorHit>> {
        if query_embedding.len() != self.dimension {
            return Err(CatalogError::dimension_mismatch(self.dimension, query_embedding.len()));
        }
        if self.docmap.is_empty() {
            return Ok(Vec::new());
        }
        let query_norm = l2_norm(query_embedding);
        if query_norm == 0.0 {
            return Ok(Vec::new());
        }

        let mut doc_ids: Vec<&str> = self.docmap.keys().map(|s| s.as_str()).collect();
        doc_ids.sort_unstable();

        let mut scored: Vec<(String, f64)> = doc_ids
            .par_iter()
            .map(|&doc_id| {
                let embedding = &self.embeddings[doc_id];
                let norm = self.norms[doc_id];
                let cosine = dot(query_embedding, embedding) / (query_norm * norm);
                (doc_id.to_string(), cosine as f64)
            })
            .collect();

        scored.retain(|(_, score)| *score >= min_score);
        scored.sort_by(|a, b| match b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(doc_id, score)| {
                let document = self.docmap.get(&doc_id).cloned().expect("candidate came from docmap");
                VectorHit { doc_id, score, document }
            })
            .collect())
    }
}
