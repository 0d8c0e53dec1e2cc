//! Error types for decomp-core
//!
//! Malformed model output is repaired, not raised. The errors here cover:
//! - Responses that cannot be turned into a decomposition at all
//! - Completion source failures
//! - Configuration problems
//! - Cache key derivation

use decomp_cache::CacheError;
use decomp_repair::ExtractionError;
use std::path::PathBuf;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The response held JSON, but nothing usable as a decomposition
    #[error("unrecoverable model response: {0}")]
    Unrecoverable(#[from] ExtractionError),
}

/// Completion source errors
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Upstream call failed
    #[error("completion failed: {0}")]
    Failed(String),

    /// Upstream call did not answer in time
    #[error("completion timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Upstream returned nothing
    #[error("completion returned an empty response")]
    EmptyResponse,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Main service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Pipeline failed
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Completion source failed
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Cache key could not be derived
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ServiceError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Completion(CompletionError::Failed(_) | CompletionError::Timeout { .. })
        )
    }
}
