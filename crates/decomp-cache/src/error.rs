//! Error types for cache keys and cache stores

use decomp_model::HashError;

/// Errors from key derivation or a cache backend
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Key material could not be serialized
    #[error("failed to serialize cache key material: {0}")]
    KeyMaterial(#[from] serde_json::Error),

    /// Digest could not be turned into a key
    #[error("invalid analysis hash: {0}")]
    Hash(#[from] HashError),

    /// Remote or embedded store failed
    #[error("cache backend '{backend}' failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

impl CacheError {
    /// Create backend error
    pub fn backend(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
        }
    }
}
