//! The Catalog Engine (§4.6): the process-wide owned handle bundling both
//! indexes, the Doc Store, and the Embedder behind the operations an HTTP
//! layer (out of scope here) would call.
//!
//! Replaces the teacher's module-level global engine pattern (§9) with an
//! explicit handle constructed once per process and passed down by the
//! caller, the same shape `probe`'s callers use for its `SearchConfig`.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::docstore::DocStore;
use crate::embedder::Embedder;
use crate::error::Result;
use crate::hybrid::{HybridHit, HybridRanker};
use crate::ingestion::{IndexPair, IngestionController};

/// Result of [`CatalogEngine::search`]: the query that was run, the ranked
/// hits, and the total count before `top_k` truncation.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<HybridHit>,
    pub total: usize,
}

/// Snapshot returned by [`CatalogEngine::health`].
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub status: &'static str,
    pub materials_loaded: usize,
    pub model_name: String,
}

/// One `CatalogEngine` per process (§9). Owns the `RwLock`-guarded index
/// pair; `search` takes a read guard, the mutators delegate to
/// [`IngestionController`], which takes a write guard only for the
/// in-memory mutation step.
pub struct CatalogEngine {
    indexes: Arc<RwLock<IndexPair>>,
    embedder: Arc<dyn Embedder>,
    ingestion: IngestionController,
    ranker: HybridRanker,
}

impl CatalogEngine {
    pub fn new(dimension: usize, doc_store: Arc<dyn DocStore>, embedder: Arc<dyn Embedder>) -> Self {
        let indexes = Arc::new(RwLock::new(IndexPair::new(dimension)));
        let ingestion = IngestionController::new(indexes.clone(), doc_store, embedder.clone());
        Self {
            indexes,
            embedder,
            ingestion,
            ranker: HybridRanker::new(),
        }
    }

    /// Build from an already-populated Doc Store, performing the initial
    /// full rebuild before returning.
    pub async fn bootstrap(dimension: usize, doc_store: Arc<dyn DocStore>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let engine = Self::new(dimension, doc_store, embedder);
        engine.rebuild().await?;
        Ok(engine)
    }

    /// Run one hybrid query. `top_k` and `min_score`/weight bounds are the
    /// caller's responsibility to validate at the HTTP boundary (§1); this
    /// method accepts whatever is passed and lets the ranker behave
    /// accordingly (an out-of-range `top_k` of 0 simply returns no results).
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_score: f64,
        w_sem: f64,
        w_kw: f64,
    ) -> Result<SearchResponse> {
        debug!(query, top_k, "search: embedding query");
        let query_embedding = self.embedder.encode(query).await?;

        let guard = self.indexes.read().unwrap();
        let results = self.ranker.search(
            &guard.bm25,
            &guard.vector,
            query,
            &query_embedding,
            top_k,
            min_score,
            w_sem,
            w_kw,
        )?;
        let total = results.len();
        info!(query, total, "search: completed");

        Ok(SearchResponse {
            query: query.to_string(),
            results,
            total,
        })
    }

    pub async fn add_one(&self, doc_id: &str) -> Result<()> {
        self.ingestion.add_one(doc_id).await
    }

    pub async fn update_one(&self, doc_id: &str) -> Result<()> {
        self.ingestion.update_one(doc_id).await
    }

    pub async fn remove_one(&self, doc_id: &str) -> Result<()> {
        self.ingestion.remove_one(doc_id).await
    }

    pub async fn rebuild(&self) -> Result<()> {
        self.ingestion.rebuild().await
    }

    pub fn health(&self) -> HealthStatus {
        let guard = self.indexes.read().unwrap();
        HealthStatus {
            status: "ok",
            materials_loaded: guard.bm25.len(),
            model_name: self.embedder.model_name().to_string(),
        }
    }
}
