//! The catalog's core record type.
//!
//! A [`Document`] is opaque to the Doc Store beyond its `doc_id`: everything
//! else is either indexed text (title/category/description), an optional
//! dense embedding, or passthrough metadata echoed back verbatim in results.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arbitrary passthrough fields (price, quantity, brand, image, ...) that ranking
/// never inspects but that results must carry back to the caller unchanged.
pub type Metadata = AHashMap<String, serde_json::Value>;

/// A single catalog entry as held by the Doc Store and both indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub embedding_generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            title: String::new(),
            description: String::new(),
            category: String::new(),
            embedding: None,
            embedding_generated_at: None,
            embedding_model: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_text(
        mut self,
        title: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.category = category.into();
        self.description = description.into();
        self
    }

    /// The text indexed by both BM25 and the Embedder: title, category,
    /// description, concatenated with a single space in that order.
    pub fn indexed_text(&self) -> String {
        let mut text =
            String::with_capacity(self.title.len() + self.category.len() + self.description.len() + 2);
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.category);
        text.push(' ');
        text.push_str(&self.description);
        text
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    pub fn set_embedding(&mut self, embedding: Vec<f32>, model_name: impl Into<String>, at: DateTime<Utc>) {
        self.embedding = Some(embedding);
        self.embedding_model = Some(model_name.into());
        self.embedding_generated_at = Some(at);
    }
}
