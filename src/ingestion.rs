//! The Ingestion Controller (§4.5): keeps the BM25 and Vector indexes
//! consistent with the Doc Store across full rebuilds and single-document
//! create/update/remove notifications.
//!
//! Every mutation to the in-memory index pair happens under one write guard
//! so a concurrent reader never observes a document in one index but not the
//! other (§5). Embedder and Doc Store I/O always run before the guard is
//! taken, never inside it.

use std::sync::{Arc, RwLock};

use tracing::{debug, error, info, warn};

use crate::bm25::Bm25Index;
use crate::docstore::DocStore;
use crate::document::Document;
use crate::embedder::Embedder;
use crate::error::Result;
use crate::vector::VectorIndex;

/// The BM25/Vector index pair guarded by a single lock, shared between the
/// Ingestion Controller and the Catalog Engine's query path.
#[derive(Debug, Default)]
pub struct IndexPair {
    pub bm25: Bm25Index,
    pub vector: VectorIndex,
}

impl IndexPair {
    pub fn new(dimension: usize) -> Self {
        Self {
            bm25: Bm25Index::new(),
            vector: VectorIndex::new(dimension),
        }
    }
}

pub struct IngestionController {
    indexes: Arc<RwLock<IndexPair>>,
    doc_store: Arc<dyn DocStore>,
    embedder: Arc<dyn Embedder>,
}

impl IngestionController {
    pub fn new(
        indexes: Arc<RwLock<IndexPair>>,
        doc_store: Arc<dyn DocStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            indexes,
            doc_store,
            embedder,
        }
    }

    async fn embed(&self, document: &mut Document) -> Result<()> {
        let embedding = self.embedder.encode(&document.indexed_text()).await?;
        let now = chrono::Utc::now();
        self.doc_store
            .persist_embedding(
                &document.doc_id,
                embedding.clone(),
                self.embedder.model_name().to_string(),
                now,
            )
            .await?;
        document.set_embedding(embedding, self.embedder.model_name(), now);
        Ok(())
    }

    /// Full reindex from the Doc Store. The old index pair stays live for
    /// readers until the freshly built one is swapped in under the write
    /// lock (§9: mandated atomic swap, not the source's field-by-field clear).
    pub async fn rebuild(&self) -> Result<()> {
        info!("rebuild: starting");
        let documents = self.doc_store.scan_all().await.map_err(|e| {
            error!(error = %e, "rebuild: scan_all failed");
            e
        })?;
        debug!(count = documents.len(), "rebuild: scanned documents");

        let dimension = {
            let guard = self.indexes.read().unwrap();
            guard.vector.dimension()
        };

        let mut fresh = IndexPair::new(dimension);
        for mut document in documents {
            self.embed(&mut document).await.map_err(|e| {
                error!(doc_id = %document.doc_id, error = %e, "rebuild: embed failed");
                e
            })?;
            fresh.bm25.add(document.clone())?;
            fresh.vector.add(document)?;
        }

        {
            let mut guard = self.indexes.write().unwrap();
            *guard = fresh;
        }

        let blob = {
            let guard = self.indexes.read().unwrap();
            guard.bm25.save(chrono::Utc::now())
        };
        self.doc_store.persist_index_blob(&blob).await.map_err(|e| {
            error!(error = %e, "rebuild: persisting index blob failed");
            e
        })?;

        info!("rebuild: finished");
        Ok(())
    }

    /// Insert one document. Idempotent: a document already present in both
    /// indexes is left as-is rather than erroring.
    pub async fn add_one(&self, doc_id: &str) -> Result<()> {
        let mut document = self.doc_store.fetch(doc_id).await?;
        if !document.has_embedding() {
            self.embed(&mut document).await?;
        }

        let mut guard = self.indexes.write().unwrap();
        let IndexPair { bm25, vector } = &mut *guard;
        upsert(bm25, vector, document)?;
        info!(doc_id, "add_one: indexed");
        Ok(())
    }

    /// Replace one document's content. Recomputes the embedding
    /// unconditionally (content may have changed). Falls through to the
    /// add path if the document was not already indexed.
    pub async fn update_one(&self, doc_id: &str) -> Result<()> {
        let mut document = self.doc_store.fetch(doc_id).await?;
        self.embed(&mut document).await?;

        let mut guard = self.indexes.write().unwrap();
        match guard.bm25.update(document.clone()) {
            Ok(()) => {
                // Vector side may independently be absent (e.g. a prior
                // partial write); tolerate and upsert rather than erroring.
                if let Err(e) = guard.vector.update(document.clone()) {
                    if e.is_not_indexed() {
                        guard.vector.add(document)?;
                    } else {
                        return Err(e);
                    }
                }
            }
            Err(e) if e.is_not_indexed() => {
                warn!(doc_id, "update_one: not previously indexed, falling through to add");
                let IndexPair { bm25, vector } = &mut *guard;
                upsert(bm25, vector, document)?;
            }
            Err(e) => return Err(e),
        }
        info!(doc_id, "update_one: indexed");
        Ok(())
    }

    /// Remove one document from both indexes. Idempotent: absence from
    /// either side is tolerated as long as the end state has it in neither.
    pub async fn remove_one(&self, doc_id: &str) -> Result<()> {
        let mut guard = self.indexes.write().unwrap();
        if let Err(e) = guard.bm25.remove(doc_id) {
            if !e.is_not_indexed() {
                return Err(e);
            }
            warn!(doc_id, "remove_one: already absent from bm25 index");
        }
        if let Err(e) = guard.vector.remove(doc_id) {
            if !e.is_not_indexed() {
                return Err(e);
            }
            warn!(doc_id, "remove_one: already absent from vector index");
        }
        info!(doc_id, "remove_one: removed");
        Ok(())
    }
}

/// Add a document to both indexes, treating `AlreadyIndexed` as "replace in
/// place" so the end state always reflects the document passed in.
fn upsert(bm25: &mut Bm25Index, vector: &mut VectorIndex, document: Document) -> Result<()> {
    match bm25.add(document.clone()) {
        Ok(()) => {}
        Err(e) if e.is_already_indexed() => {
            warn!(doc_id = %document.doc_id, "bm25 add: already indexed, updating in place");
            bm25.update(document.clone())?;
        }
        Err(e) => return Err(e),
    }
    match vector.add(document.clone()) {
        Ok(()) => {}
        Err(e) if e.is_already_indexed() => {
            warn!(doc_id = %document.doc_id, "vector add: already indexed, updating in place");
            vector.update(document)?;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::InMemoryDocStore;
    use crate::embedder::HashingEmbedder;
    use crate::error::CatalogError;

    fn controller(dimension: usize, docs: impl IntoIterator<Item = Document>) -> (IngestionController, Arc<RwLock<IndexPair>>, Arc<InMemoryDocStore>) {
        let indexes = Arc::new(RwLock::new(IndexPair::new(dimension)));
        let doc_store = Arc::new(InMemoryDocStore::seed(docs));
        let embedder = Arc::new(HashingEmbedder::new(dimension));
        let controller = IngestionController::new(indexes.clone(), doc_store.clone(), embedder);
        (controller, indexes, doc_store)
    }

    #[tokio::test]
    async fn rebuild_populates_both_indexes() {
        let (controller, indexes, _store) = controller(
            16,
            [
                Document::new("d1").with_text("OPC cement", "binders", ""),
                Document::new("d2").with_text("TMT steel", "metal", ""),
            ],
        );
        controller.rebuild().await.unwrap();

        let guard = indexes.read().unwrap();
        assert_eq!(guard.bm25.len(), 2);
        assert_eq!(guard.vector.len(), 2);
    }

    #[tokio::test]
    async fn rebuild_persists_blob_and_embeddings() {
        let (controller, _indexes, store) = controller(
            16,
            [Document::new("d1").with_text("OPC cement", "binders", "")],
        );
        controller.rebuild().await.unwrap();

        assert!(store.load_index_blob().await.unwrap().is_some());
        let doc = store.fetch("d1").await.unwrap();
        assert!(doc.has_embedding());
    }

    #[tokio::test]
    async fn add_one_is_idempotent() {
        let (controller, indexes, _store) = controller(
            16,
            [Document::new("d1").with_text("OPC cement", "binders", "")],
        );
        controller.add_one("d1").await.unwrap();
        controller.add_one("d1").await.unwrap();

        let guard = indexes.read().unwrap();
        assert_eq!(guard.bm25.len(), 1);
        assert_eq!(guard.vector.len(), 1);
    }

    #[tokio::test]
    async fn add_one_missing_document_is_not_found() {
        let (controller, _indexes, _store) = controller(16, []);
        let err = controller.add_one("missing").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_one_falls_through_to_add_when_absent() {
        let (controller, indexes, _store) = controller(
            16,
            [Document::new("d1").with_text("OPC cement", "binders", "")],
        );
        controller.update_one("d1").await.unwrap();

        let guard = indexes.read().unwrap();
        assert_eq!(guard.bm25.len(), 1);
    }

    #[tokio::test]
    async fn update_one_replaces_content() {
        let (controller, indexes, store) = controller(
            16,
            [
                Document::new("d1").with_text("OPC cement", "binders", ""),
                Document::new("d2").with_text("TMT steel", "metal", ""),
            ],
        );
        controller.rebuild().await.unwrap();

        let mut updated = store.fetch("d2").await.unwrap();
        updated.title = "cement additive".to_string();
        store.upsert(updated).await.unwrap();

        controller.update_one("d2").await.unwrap();

        let guard = indexes.read().unwrap();
        let hits = guard.bm25.search("cement", 10, 0.0);
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn remove_one_removes_from_both_indexes() {
        let (controller, indexes, _store) = controller(
            16,
            [Document::new("d1").with_text("OPC cement", "binders", "")],
        );
        controller.add_one("d1").await.unwrap();
        controller.remove_one("d1").await.unwrap();

        let guard = indexes.read().unwrap();
        assert!(guard.bm25.is_empty());
        assert!(guard.vector.is_empty());
    }

    #[tokio::test]
    async fn remove_one_is_idempotent() {
        let (controller, _indexes, _store) = controller(16, []);
        controller.remove_one("missing").await.unwrap();
    }
}
