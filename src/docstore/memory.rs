//! Reference [`DocStore`] implementation backed by an in-process map.
//!
//! Intended for tests, demos, and as a template for a real network-backed
//! adapter: every method maps onto one lock acquisition, mirroring the shape
//! a MongoDB/Postgres-backed implementation would have (connect once, then
//! short-lived per-call round trips).

use std::sync::RwLock;

use ahash::AHashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::DocStore;
use crate::document::Document;
use crate::error::{CatalogError, Result};
use crate::persistence::Bm25Blob;

#[derive(Default)]
pub struct InMemoryDocStore {
    documents: RwLock<AHashMap<String, Document>>,
    index_blob: RwLock<Option<Bm25Blob>>,
}

impl InMemoryDocStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(documents: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new();
        let mut guard = store.documents.write().unwrap();
        for doc in documents {
            guard.insert(doc.doc_id.clone(), doc);
        }
        drop(guard);
        store
    }
}

#[async_trait]
impl DocStore for InMemoryDocStore {
    async fn fetch(&self, doc_id: &str) -> Result<Document> {
        self.documents
            .read()
            .unwrap()
            .get(doc_id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(doc_id))
    }

    async fn scan_all(&self) -> Result<Vec<Document>> {
        Ok(self.documents.read().unwrap().values().cloned().collect())
    }

    async fn upsert(&self, document: Document) -> Result<()> {
        self.documents
            .write()
            .unwrap()
            .insert(document.doc_id.clone(), document);
        Ok(())
    }

    async fn persist_embedding(
        &self,
        doc_id: &str,
        embedding: Vec<f32>,
        model_name: String,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut guard = self.documents.write().unwrap();
        let doc = guard
            .get_mut(doc_id)
            .ok_or_else(|| CatalogError::not_found(doc_id))?;
        doc.set_embedding(embedding, model_name, generated_at);
        Ok(())
    }

    async fn persist_index_blob(&self, blob: &Bm25Blob) -> Result<()> {
        *self.index_blob.write().unwrap() = Some(blob.clone());
        Ok(())
    }

    async fn load_index_blob(&self) -> Result<Option<Bm25Blob>> {
        Ok(self.index_blob.read().unwrap().clone())
    }

    async fn delete(&self, doc_id: &str) -> Result<()> {
        self.documents.write().unwrap().remove(doc_id);
        Ok(())
    }
}
