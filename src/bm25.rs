//! The BM25 index: an inverted index plus per-document term-frequency and
//! length tables, answering ranked lexical queries.
//!
//! Scoring follows the teacher crate's BM25 shape (`ranking.rs`: precomputed
//! IDF, rayon-parallel per-document scoring, stable tie-break by id) but with
//! this domain's parameters (`k1 = 1.5`, `b = 0.75`) and its own four-map
//! state (`postings`, `tf`, `doc_len`, `docmap`) instead of the teacher's
//! u8-indexed query-token scheme, which only pays off for boolean AND/OR
//! query ASTs we don't have here.

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use std::cmp::Ordering;

use crate::document::Document;
use crate::error::{CatalogError, Result};
use crate::persistence::Bm25Blob;
use crate::tokenizer::tokenize;

const K1: f64 = 1.5;
const B: f64 = 0.75;

/// One scored hit from [`Bm25Index::search`].
#[derive(Debug, Clone)]
pub struct Bm25Hit {
    pub doc_id: String,
    pub score: f64,
    pub document: Document,
}

/// The lexical half of the hybrid engine.
///
/// Invariants upheld by every public method: a term appears in `postings[t]`
/// iff `tf[d][t] > 0` for that `d`; `sum(tf[d].values()) == doc_len[d]`;
/// `docmap`'s key set equals `tf`'s key set.
#[derive(Debug, Default)]
pub struct Bm25Index {
    postings: AHashMap<String, AHashSet<String>>,
    tf: AHashMap<String, AHashMap<String, usize>>,
    doc_len: AHashMap<String, usize>,
    docmap: AHashMap<String, Document>,
}

impl Bm25Index {
    pub fn new() -> Self {
        Self::default()
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

    /// Insert a new document. Errors with `AlreadyIndexed` if `doc_id` is
    /// already present.
    pub fn add(&mut self, document: Document) -> Result<()> {
        if self.docmap.contains_key(&document.doc_id) {
            return Err(CatalogError::already_indexed(document.doc_id.clone()));
        }
        self.insert_unchecked(document);
        Ok(())
    }

    /// Replace an existing document. Errors with `NotIndexed` if absent.
    /// Semantically remove-then-add, exposed as one call.
    pub fn update(&mut self, document: Document) -> Result<()> {
        if !self.docmap.contains_key(&document.doc_id) {
            return Err(CatalogError::not_indexed(document.doc_id.clone()));
        }
        self.remove_unchecked(&document.doc_id);
        self.insert_unchecked(document);
        Ok(())
    }

    /// Delete a document. Errors with `NotIndexed` if absent.
    pub fn remove(&mut self, doc_id: &str) -> Result<()> {
        if !self.docmap.contains_key(doc_id) {
            return Err(CatalogError::not_indexed(doc_id.to_string()));
        }
        self.remove_unchecked(doc_id);
        Ok(())
    }

    fn insert_unchecked(&mut self, document: Document) {
        let doc_id = document.doc_id.clone();
        let tokens = tokenize(&document.indexed_text());

        let mut term_counts: AHashMap<String, usize> = AHashMap::new();
        for token in &tokens {
            *term_counts.entry(token.clone()).or_insert(0) += 1;
        }

        for term in term_counts.keys() {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(doc_id.clone());
        }

        self.doc_len.insert(doc_id.clone(), tokens.len());
        self.tf.insert(doc_id.clone(), term_counts);
        self.docmap.insert(doc_id, document);
    }

    fn remove_unchecked(&mut self, doc_id: &str) {
        if let Some(term_counts) = self.tf.remove(doc_id) {
            for term in term_counts.keys() {
                if let Some(docs) = self.postings.get_mut(term) {
                    docs.remove(doc_id);
                    if docs.is_empty() {
                        self.postings.remove(term);
                    }
                }
            }
        }
        self.doc_len.remove(doc_id);
        self.docmap.remove(doc_id);
    }

    fn avgdl(&self) -> f64 {
        if self.doc_len.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.doc_len.values().map(|&l| l as f64).sum();
        sum / self.doc_len.len() as f64
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.docmap.len() as f64;
        let df = self.postings.get(term).map(|d| d.len()).unwrap_or(0) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Top-K lexical ranking for `query`. Empty query (after tokenization) or
    /// an empty index both yield an empty result, not an error.
    pub fn search(&self, query: &str, top_k: usize, min_score: f64) -> Vec<Bm25Hit> {
        if self.docmap.is_empty() {
            return Vec::new();
        }
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        // Per-unique-term IDF, but weighted by how many times each term
        // occurs in the query: scoring sums over the full token sequence,
        // not the term set, so "cement cement" scores roughly double a
        // single "cement".
        let mut query_term_counts: AHashMap<String, usize> = AHashMap::new();
        for token in &query_tokens {
            *query_term_counts.entry(token.clone()).or_insert(0) += 1;
        }

        let idfs: AHashMap<String, f64> = query_term_counts
            .keys()
            .map(|t| (t.clone(), self.idf(t)))
            .collect();

        let mut candidates: AHashSet<&str> = AHashSet::new();
        for term in query_term_counts.keys() {
            if let Some(docs) = self.postings.get(term) {
                candidates.extend(docs.iter().map(|s| s.as_str()));
            }
        }

        let avgdl = self.avgdl();
        let candidates: Vec<&str> = candidates.into_iter().collect();

        let mut scored: Vec<(String, f64)> = candidates
            .par_iter()
            .map(|&doc_id| {
                let doc_len = *self.doc_len.get(doc_id).unwrap_or(&0) as f64;
                let doc_tf = self.tf.get(doc_id);
                let score: f64 = query_term_counts
                    .iter()
                    .map(|(term, &query_count)| {
                        let freq = doc_tf
                            .and_then(|m| m.get(term))
                            .copied()
                            .unwrap_or(0) as f64;
                        if freq <= 0.0 {
                            return 0.0;
                        }
                        let idf = idfs[term];
                        let tf_norm = (freq * (K1 + 1.0))
                            / (freq + K1 * (1.0 - B + B * (doc_len / avgdl)));
                        query_count as f64 * idf * tf_norm
                    })
                    .sum();
                (doc_id.to_string(), score)
            })
            .collect();

        scored.retain(|(_, score)| *score >= min_score);

        scored.sort_by(|a, b| match b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(doc_id, score)| {
                let document = self.docmap.get(&doc_id).cloned().expect("candidate came from docmap");
                Bm25Hit {
                    doc_id,
                    score,
                    document,
                }
            })
            .collect()
    }

    /// Serialize the index's lexical state (not the documents) for cold start.
    pub fn save(&self, last_updated: chrono::DateTime<chrono::Utc>) -> Bm25Blob {
        let inverted_index = self
            .postings
            .iter()
            .map(|(term, docs)| {
                let mut ids: Vec<String> = docs.iter().cloned().collect();
                ids.sort();
                (term.clone(), ids)
            })
            .collect();

        Bm25Blob {
            inverted_index,
            term_frequencies: self.tf.clone(),
            doc_lengths: self.doc_len.clone(),
            last_updated,
        }
    }

    /// Reconstruct an index from a persisted blob plus the Documents it
    /// indexes (scanned separately from the Doc Store, since the blob itself
    /// carries no metadata). Validates the cross-map invariants on the way in.
    pub fn load(blob: Bm25Blob, documents: Vec<Document>) -> Result<Self> {
        let mut index = Bm25Index::new();
        for document in documents {
            index.docmap.insert(document.doc_id.clone(), document);
        }

        for (term, doc_ids) in blob.inverted_index {
            index
                .postings
                .insert(term, doc_ids.into_iter().collect());
        }
        index.tf = blob.term_frequencies;
        index.doc_len = blob.doc_lengths;

        if index.tf.keys().collect::<AHashSet<_>>() != index.docmap.keys().collect::<AHashSet<_>>() {
            return Err(CatalogError::index_error(
                "loaded blob's term-frequency keys do not match the scanned docmap",
            ));
        }
        for (doc_id, counts) in &index.tf {
            let sum: usize = counts.values().sum();
            let expected = *index.doc_len.get(doc_id).unwrap_or(&0);
            if sum != expected {
                return Err(CatalogError::index_error(format!(
                    "doc_len mismatch for {doc_id}: sum(tf)={sum}, doc_len={expected}"
                )));
            }
        }

        Ok(index)
    }
}
