//! # catalog-hybrid-search
//!
//! A hybrid BM25 + dense-vector retrieval engine for a product catalog.
//! Combines lexical ranking (BM25 over tokenized title/category/description
//! text) with semantic ranking (cosine similarity over an injected
//! embedding model) and fuses the two into a single ordered result list.
//!
//! The HTTP surface, the document store driver, and the embedding model
//! itself are deliberately out of scope: this crate defines the seams
//! ([`docstore::DocStore`], [`embedder::Embedder`]) a caller plugs concrete
//! implementations into, plus bundled in-memory/deterministic reference
//! implementations for tests and the CLI demo.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use catalog_search::docstore::InMemoryDocStore;
//! use catalog_search::document::Document;
//! use catalog_search::embedder::HashingEmbedder;
//! use catalog_search::engine::CatalogEngine;
//!
//! # async fn run() -> catalog_search::error::Result<()> {
//! let store = Arc::new(InMemoryDocStore::seed([
//!     Document::new("d1").with_text("OPC cement", "binders", "43 grade"),
//! ]));
//! let embedder = Arc::new(HashingEmbedder::new(128));
//! let engine = CatalogEngine::bootstrap(128, store, embedder).await?;
//!
//! let response = engine.search("cement", 10, 0.0, 0.6, 0.4).await?;
//! println!("found {} results", response.total);
//! # Ok(())
//! # }
//! ```

pub mod bm25;
pub mod config;
pub mod document;
pub mod docstore;
pub mod embedder;
pub mod engine;
pub mod error;
pub mod hybrid;
pub mod ingestion;
pub mod persistence;
pub mod tokenizer;
pub mod vector;

pub use document::Document;
pub use engine::{CatalogEngine, HealthStatus, SearchResponse};
pub use error::{CatalogError, Result};
pub use hybrid::HybridHit;
