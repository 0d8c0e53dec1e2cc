//! Decomposition service
//!
//! Wires the cache, the completion source and the pipeline together.
//!
//! # Workflow
//! 1. Derive the cache key from the request
//! 2. Return the cached analysis on a hit
//! 3. Otherwise ask the completion source and run the pipeline
//! 4. Store complete (non-partial) results

use crate::config::AnalyzerConfig;
use crate::error::{CompletionError, ServiceError};
use crate::pipeline::{DecompositionPipeline, PipelineContext};
use async_trait::async_trait;
use decomp_cache::{compute_analysis_hash, AnalysisCache, AnalysisRequest, CachedAnalysis};
use decomp_model::{AnalysisHash, AnalysisMeta, AnalysisOutput, CompareResult, Decomposition};
use decomp_repair::IntegrityReport;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Raw completion returned by a model call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub text: String,
    pub model_used: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Completion {
    /// Completion with zero token usage
    #[must_use]
    pub fn new(text: impl Into<String>, model_used: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_used: model_used.into(),
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    /// With token usage
    #[inline]
    #[must_use]
    pub fn with_tokens(mut self, input: u32, output: u32) -> Self {
        self.input_tokens = input;
        self.output_tokens = output;
        self
    }
}

/// Source of model completions
///
/// Timeouts and retries belong to the implementation.
#[async_trait]
pub trait CompletionSource: Send + Sync + Debug {
    /// Produce a completion for a request
    async fn complete(
        &self,
        request: &AnalysisRequest,
        prompt_version: &str,
    ) -> Result<Completion, CompletionError>;
}

/// Whether an analysis came from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// An analysis plus how it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub output: AnalysisOutput,
    pub hash: AnalysisHash,
    pub cache_status: CacheStatus,
    /// Reads of the cached entry, zero on a miss
    pub hit_count: u64,
    /// Repairs applied; `None` on a hit
    pub integrity: Option<IntegrityReport>,
}

/// Cached, pipeline-backed analysis service
#[derive(Debug, Clone)]
pub struct DecompositionService {
    config: AnalyzerConfig,
    cache: Arc<dyn AnalysisCache>,
    source: Arc<dyn CompletionSource>,
    pipeline: DecompositionPipeline,
}

impl DecompositionService {
    /// Create service from parts
    #[must_use]
    pub fn new(
        config: AnalyzerConfig,
        cache: Arc<dyn AnalysisCache>,
        source: Arc<dyn CompletionSource>,
    ) -> Self {
        Self {
            config,
            cache,
            source,
            pipeline: DecompositionPipeline::new(),
        }
    }

    /// Create service with the cache store described by the config
    ///
    /// # Errors
    /// Returns error if the config is invalid
    pub fn from_config(
        config: AnalyzerConfig,
        source: Arc<dyn CompletionSource>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let cache = config.cache.build();
        Ok(Self::new(config, cache, source))
    }

    /// Service configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a workflow description
    ///
    /// Cache failures are logged and treated as misses so a broken store
    /// never blocks an analysis.
    ///
    /// # Errors
    /// Returns error if the key cannot be derived, the completion source
    /// fails, or the response is unrecoverable
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, ServiceError> {
        let hash = compute_analysis_hash(request, &self.config.prompt_version, &self.config.model_id)?;

        match self.cache.get(&hash).await {
            Ok(Some(entry)) => {
                tracing::info!(%hash, hit_count = entry.hit_count, "serving cached analysis");
                return Ok(AnalysisOutcome {
                    output: AnalysisOutput {
                        decomposition: entry.decomposition,
                        meta: entry.metadata,
                        partial: false,
                        recovery_reason: None,
                    },
                    hash,
                    cache_status: CacheStatus::Hit,
                    hit_count: entry.hit_count,
                    integrity: None,
                });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(%hash, error = %e, "cache lookup failed, continuing as miss"),
        }

        let completion = self
            .source
            .complete(request, &self.config.prompt_version)
            .await?;
        tracing::debug!(
            %hash,
            model = %completion.model_used,
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            "received completion"
        );

        let ctx = PipelineContext::new(self.config.fallback_title.clone())
            .with_team_size(request.team_size());
        let run = self.pipeline.run(&completion.text, &ctx)?;

        let meta = AnalysisMeta::new(self.config.prompt_version.clone(), completion.model_used)
            .with_tokens(completion.input_tokens, completion.output_tokens);

        if run.partial {
            tracing::info!(%hash, reason = ?run.recovery_reason, "partial result not cached");
        } else {
            let entry = CachedAnalysis::new(hash, run.decomposition.clone(), meta.clone());
            if let Err(e) = self.cache.set(hash, entry).await {
                tracing::warn!(%hash, error = %e, "failed to store analysis");
            }
        }

        let integrity = run.integrity.clone();
        Ok(AnalysisOutcome {
            output: run.into_analysis_output(meta),
            hash,
            cache_status: CacheStatus::Miss,
            hit_count: 0,
            integrity: Some(integrity),
        })
    }

    /// Compare two decompositions
    #[must_use]
    pub fn compare(&self, before: &Decomposition, after: &Decomposition) -> CompareResult {
        decomp_diff::compare(before, after)
    }
}
