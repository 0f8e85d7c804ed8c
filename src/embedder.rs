//! The Embedder (§4): an opaque `encode(text) -> vector[D]` interface. The
//! real model is explicitly out of scope (§1) — this module only defines the
//! seam the core calls through, plus a deterministic reference implementation
//! for tests and the bundled CLI demo.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text to a fixed-dimensional embedding. Implementations MUST be
/// thread-safe (§5: "the Embedder is shared and assumed thread-safe for
/// `encode`") and MUST always return vectors of `dimension()`.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;
    fn model_name(&self) -> &str;
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// A deterministic, dependency-free stand-in for a real embedding model.
///
/// Hashes overlapping token shingles into a fixed-width vector and L2
/// normalizes it. Produces unit-comparable vectors (satisfying the Embedder
/// contract) without pulling in a model runtime; useful for tests, demos,
/// and as a placeholder until a real model is wired in by the caller.
pub struct HashingEmbedder {
    dimension: usize,
    model_name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_name: format!("hashing-embedder-{dimension}d"),
        }
    }

    fn hash_token(token: &str, dim: usize) -> (usize, f32) {
        // FNV-1a: simple, deterministic, dependency-free.
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in token.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        let bucket = (hash % dim as u64) as usize;
        let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        (bucket, sign)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = crate::tokenizer::tokenize(text);
        let mut vector = vec![0.0f32; self.dimension];
        if tokens.is_empty() {
            // A deterministic, non-zero fallback so empty/stopword-only text
            // never produces the zero vector the Vector Index rejects.
            vector[0] = 1.0;
            return Ok(vector);
        }
        for token in &tokens {
            let (bucket, sign) = Self::hash_token(token, self.dimension);
            vector[bucket] += sign;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        } else {
            vector[0] = 1.0;
        }
        Ok(vector)
    }
}
