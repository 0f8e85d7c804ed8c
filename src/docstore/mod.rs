//! The Document Store Adapter (§4, §6): a thin async abstraction over an
//! external key-document store. The core never talks to a concrete database
//! directly — every I/O boundary named in §5 (fetch, scan, persist) goes
//! through this trait so a real network-backed store can be swapped in for
//! the bundled in-memory reference implementation without touching ranking
//! or ingestion code.

mod memory;

pub use memory::InMemoryDocStore;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;
use crate::persistence::Bm25Blob;

/// Abstraction over the external key-document store.
///
/// Implementations MUST exclude [`crate::persistence::BM25_INDEX_KEY`] from
/// [`DocStore::scan_all`] — that key is reserved for the persisted BM25 blob.
#[async_trait]
pub trait DocStore: Send + Sync {
    /// Fetch a single document. Errors with `NotFound` if absent.
    async fn fetch(&self, doc_id: &str) -> Result<Document>;

    /// Every document in the store, excluding the reserved index-blob entry.
    async fn scan_all(&self) -> Result<Vec<Document>>;

    /// Insert or overwrite a document wholesale (used by test fixtures and
    /// by ingestion to persist a freshly computed embedding).
    async fn upsert(&self, document: Document) -> Result<()>;

    /// Persist an embedding for an existing document, stamping provenance.
    async fn persist_embedding(
        &self,
        doc_id: &str,
        embedding: Vec<f32>,
        model_name: String,
        generated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()>;

    /// Write the serialized BM25 blob under the reserved key.
    async fn persist_index_blob(&self, blob: &Bm25Blob) -> Result<()>;

    /// Read back the serialized BM25 blob, if one has ever been written.
    async fn load_index_blob(&self) -> Result<Option<Bm25Blob>>;

    /// Remove a document from the store (used by `remove_one`).
    async fn delete(&self, doc_id: &str) -> Result<()>;
}
