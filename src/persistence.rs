//! Serialization formats for the BM25 index: the Doc Store blob (the
//! authoritative cold-start source) and the advisory on-disk cache mirror.
//!
//! Both use the same JSON shape so one can seed the other; the Doc Store
//! blob wins whenever the two disagree (§6).

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use crate::document::Document;
use crate::error::{CatalogError, Result};

/// The reserved Doc Store key under which the BM25 blob lives. Scans for
/// ranking (`DocStore::scan_all`) must exclude this key.
pub const BM25_INDEX_KEY: &str = "bm25_index";

/// Serialized BM25 state: everything needed to answer queries without
/// retokenizing the corpus. Embeddings are not part of this blob — they
/// persist on the Document itself (§3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bm25Blob {
    /// term -> list of doc_ids, sorted for deterministic round-trips.
    pub inverted_index: AHashMap<String, Vec<String>>,
    /// doc_id -> term -> count.
    pub term_frequencies: AHashMap<String, AHashMap<String, usize>>,
    /// doc_id -> token count.
    pub doc_lengths: AHashMap<String, usize>,
    pub last_updated: DateTime<Utc>,
}

impl Bm25Blob {
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self {
            inverted_index: AHashMap::new(),
            term_frequencies: AHashMap::new(),
            doc_lengths: AHashMap::new(),
            last_updated: at,
        }
    }
}

/// The four-file advisory disk cache mirror named in the external interfaces:
/// postings, docmap, term-frequencies, doc-lengths. Stored as JSON for parity
/// with the Doc Store blob.
pub struct DiskCache {
    pub postings_path: std::path::PathBuf,
    pub docmap_path: std::path::PathBuf,
    pub term_frequencies_path: std::path::PathBuf,
    pub doc_lengths_path: std::path::PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            postings_path: dir.join("postings.json"),
            docmap_path: dir.join("docmap.json"),
            term_frequencies_path: dir.join("term_frequencies.json"),
            doc_lengths_path: dir.join("doc_lengths.json"),
        }
    }

    pub fn save(&self, blob: &Bm25Blob, docmap: &AHashMap<String, Document>) -> Result<()> {
        if let Some(parent) = self.postings_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CatalogError::store_unavailable(format!("creating cache dir: {e}")))?;
        }
        write_json(&self.postings_path, &blob.inverted_index)?;
        write_json(&self.docmap_path, docmap)?;
        write_json(&self.term_frequencies_path, &blob.term_frequencies)?;
        write_json(&self.doc_lengths_path, &blob.doc_lengths)?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<(Bm25Blob, AHashMap<String, Document>)>> {
        if !self.postings_path.exists() {
            return Ok(None);
        }
        let inverted_index = read_json(&self.postings_path)?;
        let docmap = read_json(&self.docmap_path)?;
        let term_frequencies = read_json(&self.term_frequencies_path)?;
        let doc_lengths = read_json(&self.doc_lengths_path)?;
        let blob = Bm25Blob {
            inverted_index,
            term_frequencies,
            doc_lengths,
            last_updated: Utc::now(),
        };
        Ok(Some((blob, docmap)))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| CatalogError::store_unavailable(format!("creating {path:?}: {e}")))?;
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| CatalogError::index_error(format!("serializing {path:?}: {e}")))?;
    file.write_all(&json)
        .map_err(|e| CatalogError::store_unavailable(format!("writing {path:?}: {e}")))?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let mut file = File::open(path)
        .map_err(|e| CatalogError::store_unavailable(format!("opening {path:?}: {e}")))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CatalogError::store_unavailable(format!("reading {path:?}: {e}")))?;
    serde_json::from_str(&contents)
        .map_err(|e| CatalogError::index_error(format!("parsing {path:?}: {e}")))
}
