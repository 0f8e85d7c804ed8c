//! Error taxonomy for the catalog search core.
//!
//! Every fallible operation in this crate returns [`CatalogError`] rather than
//! panicking. Index-level contract errors (`AlreadyIndexed`, `NotIndexed`) are
//! expected to be caught and reinterpreted by the [`crate::ingestion`] layer;
//! everything else is meant to bubble all the way to the caller.

use thiserror::Error;

/// The single error type returned by every public operation in this crate.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested document id has no record in the Doc Store.
    #[error("document not found: {doc_id}")]
    NotFound { doc_id: String },

    /// An `add` was attempted for a doc_id already present in an index.
    #[error("document already indexed: {doc_id}")]
    AlreadyIndexed { doc_id: String },

    /// An `update`/`remove` was attempted for a doc_id absent from an index.
    #[error("document not indexed: {doc_id}")]
    NotIndexed { doc_id: String },

    /// A vector did not match the index's configured dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector with zero L2 norm was rejected (insert) or used as a query.
    #[error("zero vector rejected for doc_id {doc_id:?}")]
    ZeroVector { doc_id: Option<String> },

    /// The query vector used to search the vector index was invalid.
    #[error("invalid query vector: {reason}")]
    InvalidQuery { reason: String },

    /// Malformed query text or an out-of-range search parameter.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The external Doc Store could not be reached or returned an error.
    #[error("document store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// An invariant of the core was violated; never swallowed.
    #[error("index invariant violated: {reason}")]
    IndexError { reason: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(doc_id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            doc_id: doc_id.into(),
        }
    }

    pub fn already_indexed(doc_id: impl Into<String>) -> Self {
        CatalogError::AlreadyIndexed {
            doc_id: doc_id.into(),
        }
    }

    pub fn not_indexed(doc_id: impl Into<String>) -> Self {
        CatalogError::NotIndexed {
            doc_id: doc_id.into(),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        CatalogError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        CatalogError::StoreUnavailable {
            reason: reason.into(),
        }
    }

    pub fn index_error(reason: impl Into<String>) -> Self {
        CatalogError::IndexError {
            reason: reason.into(),
        }
    }

    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        CatalogError::DimensionMismatch { expected, actual }
    }

    pub fn zero_vector(doc_id: Option<impl Into<String>>) -> Self {
        CatalogError::ZeroVector {
            doc_id: doc_id.map(Into::into),
        }
    }

    pub fn invalid_query(reason: impl Into<String>) -> Self {
        CatalogError::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Stamps a `doc_id` onto a `ZeroVector` raised before the caller's id was
    /// known (e.g. validated before insertion). A no-op for other variants.
    pub fn with_doc_id(self, doc_id: impl Into<String>) -> Self {
        match self {
            CatalogError::ZeroVector { .. } => CatalogError::ZeroVector {
                doc_id: Some(doc_id.into()),
            },
            other => other,
        }
    }

    /// True for the two index-state-mismatch variants the Ingestion Controller
    /// is allowed to treat as recoverable under idempotent add/update semantics.
    pub fn is_already_indexed(&self) -> bool {
        matches!(self, CatalogError::AlreadyIndexed { .. })
    }

    pub fn is_not_indexed(&self) -> bool {
        matches!(self, CatalogError::NotIndexed { .. })
    }
}
