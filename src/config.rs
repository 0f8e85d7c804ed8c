//! Layered configuration (§6): defaults, then an optional JSON config file,
//! then `CATALOG_*` environment variables, each layer overriding the last.
//! Shape lifted from the teacher crate's `ProbeConfig`/`ResolvedConfig` split
//! (all-`Option` file layer merged field-by-field, then env overrides, then
//! resolved against hardcoded defaults) but scoped down to the handful of
//! knobs this engine actually has.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// BM25's `k1` as specified in §4.2.
pub const DEFAULT_K1: f64 = 1.5;
/// BM25's `b` as specified in §4.2.
pub const DEFAULT_B: f64 = 0.75;
/// The hybrid fetch multiplier's cap, per §4.4 (`min(top_k * 3, 50)`).
pub const DEFAULT_FETCH_CAP: usize = 50;
pub const DEFAULT_FETCH_MULTIPLIER: usize = 3;

/// All-optional file/env layer, merged field-by-field before resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfigLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_multiplier: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_cap: Option<usize>,
}

impl CatalogConfigLayer {
    fn merge(base: Self, overlay: Self) -> Self {
        Self {
            store_uri: overlay.store_uri.or(base.store_uri),
            store_database: overlay.store_database.or(base.store_database),
            store_collection: overlay.store_collection.or(base.store_collection),
            model_name: overlay.model_name.or(base.model_name),
            embedding_dim: overlay.embedding_dim.or(base.embedding_dim),
            k1: overlay.k1.or(base.k1),
            b: overlay.b.or(base.b),
            fetch_multiplier: overlay.fetch_multiplier.or(base.fetch_multiplier),
            fetch_cap: overlay.fetch_cap.or(base.fetch_cap),
        }
    }

    fn from_env() -> Self {
        let mut layer = Self::default();
        if let Ok(val) = env::var("CATALOG_STORE_URI") {
            layer.store_uri = Some(val);
        }
        if let Ok(val) = env::var("CATALOG_STORE_DATABASE") {
            layer.store_database = Some(val);
        }
        if let Ok(val) = env::var("CATALOG_STORE_COLLECTION") {
            layer.store_collection = Some(val);
        }
        if let Ok(val) = env::var("CATALOG_MODEL_NAME") {
            layer.model_name = Some(val);
        }
        if let Ok(val) = env::var("CATALOG_EMBEDDING_DIM") {
            if let Ok(parsed) = val.parse() {
                layer.embedding_dim = Some(parsed);
            }
        }
        if let Ok(val) = env::var("CATALOG_K1") {
            if let Ok(parsed) = val.parse() {
                layer.k1 = Some(parsed);
            }
        }
        if let Ok(val) = env::var("CATALOG_B") {
            if let Ok(parsed) = val.parse() {
                layer.b = Some(parsed);
            }
        }
        if let Ok(val) = env::var("CATALOG_FETCH_MULTIPLIER") {
            if let Ok(parsed) = val.parse() {
                layer.fetch_multiplier = Some(parsed);
            }
        }
        if let Ok(val) = env::var("CATALOG_FETCH_CAP") {
            if let Ok(parsed) = val.parse() {
                layer.fetch_cap = Some(parsed);
            }
        }
        layer
    }
}

/// Fully resolved configuration, every field concrete. What callers actually
/// construct a [`crate::engine::CatalogEngine`] from.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub store_uri: String,
    pub store_database: String,
    pub store_collection: String,
    pub model_name: String,
    pub embedding_dim: usize,
    pub k1: f64,
    pub b: f64,
    pub fetch_multiplier: usize,
    pub fetch_cap: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            store_uri: "memory://local".to_string(),
            store_database: "catalog".to_string(),
            store_collection: "materials".to_string(),
            model_name: "hashing-embedder".to_string(),
            embedding_dim: 128,
            k1: DEFAULT_K1,
            b: DEFAULT_B,
            fetch_multiplier: DEFAULT_FETCH_MULTIPLIER,
            fetch_cap: DEFAULT_FETCH_CAP,
        }
    }
}

impl CatalogConfig {
    fn resolve(layer: CatalogConfigLayer) -> Self {
        let defaults = Self::default();
        Self {
            store_uri: layer.store_uri.unwrap_or(defaults.store_uri),
            store_database: layer.store_database.unwrap_or(defaults.store_database),
            store_collection: layer.store_collection.unwrap_or(defaults.store_collection),
            model_name: layer.model_name.unwrap_or(defaults.model_name),
            embedding_dim: layer.embedding_dim.unwrap_or(defaults.embedding_dim),
            k1: layer.k1.unwrap_or(defaults.k1),
            b: layer.b.unwrap_or(defaults.b),
            fetch_multiplier: layer.fetch_multiplier.unwrap_or(defaults.fetch_multiplier),
            fetch_cap: layer.fetch_cap.unwrap_or(defaults.fetch_cap),
        }
    }

    /// Load: defaults -> optional config file -> `CATALOG_*` env vars.
    ///
    /// The config file path is `$CATALOG_CONFIG_PATH` if set, else
    /// `./catalog.json` if present; a missing file at either location is not
    /// an error, it just means the file layer is empty.
    pub fn load() -> Result<Self> {
        let mut layer = CatalogConfigLayer::default();

        if let Some(path) = Self::config_file_path() {
            if path.is_file() {
                let file_layer = Self::load_from_file(&path)
                    .with_context(|| format!("loading catalog config from {path:?}"))?;
                layer = CatalogConfigLayer::merge(layer, file_layer);
            }
        }

        layer = CatalogConfigLayer::merge(layer, CatalogConfigLayer::from_env());
        Ok(Self::resolve(layer))
    }

    fn config_file_path() -> Option<PathBuf> {
        if let Ok(custom) = env::var("CATALOG_CONFIG_PATH") {
            return Some(PathBuf::from(custom));
        }
        let default_path = PathBuf::from("catalog.json");
        if default_path.is_file() {
            Some(default_path)
        } else {
            None
        }
    }

    fn load_from_file(path: &Path) -> Result<CatalogConfigLayer> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {path:?}"))?;
        let layer: CatalogConfigLayer = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config file {path:?} as JSON"))?;
        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_match_spec_constants() {
        let config = CatalogConfig::default();
        assert_eq!(config.k1, 1.5);
        assert_eq!(config.b, 0.75);
        assert_eq!(config.fetch_cap, 50);
        assert_eq!(config.fetch_multiplier, 3);
    }

    #[test]
    fn file_layer_overrides_defaults() {
        let layer = CatalogConfigLayer {
            model_name: Some("custom-model".to_string()),
            embedding_dim: Some(256),
            ..Default::default()
        };
        let resolved = CatalogConfig::resolve(layer);
        assert_eq!(resolved.model_name, "custom-model");
        assert_eq!(resolved.embedding_dim, 256);
        assert_eq!(resolved.k1, DEFAULT_K1);
    }

    #[test]
    fn env_layer_overrides_file_layer() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("CATALOG_MODEL_NAME", "env-model");
        let file_layer = CatalogConfigLayer {
            model_name: Some("file-model".to_string()),
            ..Default::default()
        };
        let merged = CatalogConfigLayer::merge(file_layer, CatalogConfigLayer::from_env());
        assert_eq!(merged.model_name.as_deref(), Some("env-model"));
        env::remove_var("CATALOG_MODEL_NAME");
    }

    #[test]
    fn load_from_file_parses_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"{"model_name": "from-file", "k1": 1.8}"#).unwrap();

        let layer = CatalogConfig::load_from_file(&path).unwrap();
        assert_eq!(layer.model_name.as_deref(), Some("from-file"));
        assert_eq!(layer.k1, Some(1.8));
    }
}
