//! Decomp Core - workflow decomposition service
//!
//! The orchestration layer that:
//! - Runs raw model text through extraction, repair and scoring
//! - Caches finished analyses by a content-derived key
//! - Compares two decompositions of the same workflow
//! - Loads configuration and sets up structured logging
//!
//! # Example
//!
//! ```rust
//! use decomp_core::{DecompositionPipeline, PipelineContext};
//!
//! let raw = r#"{"title": "Payroll", "steps": [], "gaps": []}"#;
//! let out = DecompositionPipeline::new()
//!     .run(raw, &PipelineContext::new("Untitled"))
//!     .unwrap();
//!
//! assert!(!out.partial);
//! assert_eq!(out.decomposition.title, "Payroll");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod service;

// Re-exports for convenience
pub use config::{AnalyzerConfig, CacheBackend, CacheConfig};
pub use error::{CompletionError, ConfigError, PipelineError, ServiceError};
pub use pipeline::{DecompositionPipeline, PipelineContext, PipelineOutput};
pub use service::{
    AnalysisOutcome, CacheStatus, Completion, CompletionSource, DecompositionService,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Decomp Core
    pub use crate::{
        AnalysisOutcome, AnalyzerConfig, CacheStatus, Completion, CompletionSource,
        DecompositionPipeline, DecompositionService, PipelineContext, ServiceError,
    };
    pub use decomp_cache::AnalysisRequest;
    pub use decomp_model::{AnalysisOutput, CompareResult, Decomposition};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use async_trait::async_trait;
    use decomp_cache::{AnalysisRequest, MemoryCache};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Fixed(&'static str);

    #[async_trait]
    impl CompletionSource for Fixed {
        async fn complete(
            &self,
            _request: &AnalysisRequest,
            _prompt_version: &str,
        ) -> Result<Completion, CompletionError> {
            Ok(Completion::new(self.0, "fixed-model").with_tokens(100, 50))
        }
    }

    #[tokio::test]
    async fn service_full_flow() {
        let service = DecompositionService::new(
            AnalyzerConfig::new(),
            Arc::new(MemoryCache::new()),
            Arc::new(Fixed(r#"{"title": "Payroll", "steps": [], "gaps": []}"#)),
        );
        let request = AnalysisRequest::new("Run payroll");

        let first = service.analyze(&request).await.unwrap();
        assert_eq!(first.cache_status, CacheStatus::Miss);
        assert_eq!(first.output.meta.model_used, "fixed-model");

        let second = service.analyze(&request).await.unwrap();
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.hit_count, 1);
        assert_eq!(second.output.decomposition, first.output.decomposition);
    }

    #[test]
    fn compare_is_exposed() {
        let service = DecompositionService::new(
            AnalyzerConfig::new(),
            Arc::new(MemoryCache::new()),
            Arc::new(Fixed("{}")),
        );
        let d = decomp_model::Decomposition::empty("d", "t");
        assert_eq!(service.compare(&d, &d).summary, "No significant changes detected.");
    }
}
