//! Analyzer configuration
//!
//! Loaded from TOML; every field has a usable default.
//!
//! ```toml
//! prompt_version = "v3"
//! model_id = "claude-sonnet"
//! fallback_title = "Untitled workflow"
//! log_filter = "info,decomp_repair=debug"
//! log_json = false
//!
//! [cache]
//! backend = "bounded"
//! max_capacity = 5000
//! ttl_secs = 86400
//! ```

use crate::error::ConfigError;
use decomp_cache::{AnalysisCache, BoundedCache, MemoryCache};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Which cache store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Unbounded in-process map
    Memory,
    /// Capacity and TTL bounded
    #[default]
    Bounded,
}

/// Cache store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Maximum entries for the bounded store
    pub max_capacity: u64,
    /// Entry lifetime for the bounded store
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Bounded,
            max_capacity: 10_000,
            ttl_secs: Some(7 * 24 * 60 * 60),
        }
    }
}

impl CacheConfig {
    /// Build the configured store
    #[must_use]
    pub fn build(&self) -> Arc<dyn AnalysisCache> {
        match (self.backend, self.ttl_secs) {
            (CacheBackend::Memory, _) => Arc::new(MemoryCache::new()),
            (CacheBackend::Bounded, Some(ttl)) => Arc::new(BoundedCache::with_ttl(
                self.max_capacity,
                Duration::from_secs(ttl),
            )),
            (CacheBackend::Bounded, None) => Arc::new(BoundedCache::new(self.max_capacity)),
        }
    }
}

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Prompt revision; part of every cache key
    pub prompt_version: String,
    /// Model identifier; part of every cache key
    pub model_id: String,
    /// Title used when the response carries none
    pub fallback_title: String,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_filter: String,
    /// Emit JSON log lines
    pub log_json: bool,
    pub cache: CacheConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            prompt_version: "v1".to_string(),
            model_id: "default".to_string(),
            fallback_title: "Untitled workflow".to_string(),
            log_filter: "info".to_string(),
            log_json: false,
            cache: CacheConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string and validate
    ///
    /// # Errors
    /// Returns error on malformed TOML or invalid values
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded analyzer config");
        Ok(config)
    }

    /// Check values are usable
    ///
    /// # Errors
    /// Returns error for an empty prompt version or model id, or a zero
    /// bounded cache capacity
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prompt_version.trim().is_empty() {
            return Err(ConfigError::Invalid("prompt_version must not be empty".into()));
        }
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::Invalid("model_id must not be empty".into()));
        }
        if self.cache.backend == CacheBackend::Bounded && self.cache.max_capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache.max_capacity must be positive for the bounded backend".into(),
            ));
        }
        Ok(())
    }

    /// With prompt version
    #[inline]
    #[must_use]
    pub fn with_prompt_version(mut self, version: impl Into<String>) -> Self {
        self.prompt_version = version.into();
        self
    }

    /// With model id
    #[inline]
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// With fallback title
    #[inline]
    #[must_use]
    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }

    /// With log settings
    #[inline]
    #[must_use]
    pub fn with_logging(mut self, filter: impl Into<String>, json: bool) -> Self {
        self.log_filter = filter.into();
        self.log_json = json;
        self
    }

    /// With cache settings
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}
