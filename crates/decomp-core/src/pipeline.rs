//! Decomposition pipeline
//!
//! Turns raw model text into a repaired, scored [`Decomposition`].
//!
//! # Workflow
//! 1. Extract a JSON object from the text
//! 2. Validate it, recovering field by field when needed
//! 3. Enforce referential integrity
//! 4. Score health for the team size
//!
//! Only a response whose JSON is not an object fails; everything else
//! degrades to a partial result.

use crate::error::PipelineError;
use decomp_health::score;
use decomp_model::{AnalysisMeta, AnalysisOutput, Decomposition};
use decomp_repair::{enforce_integrity, extract_json, validate_or_recover, IntegrityReport, Validated};
use uuid::Uuid;

/// Per-run inputs that are not part of the model text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineContext {
    /// Calibrates health scoring
    pub team_size: Option<i64>,
    /// Title used when the payload has none
    pub fallback_title: String,
}

impl PipelineContext {
    /// Context with a fallback title and no team size
    #[must_use]
    pub fn new(fallback_title: impl Into<String>) -> Self {
        Self {
            team_size: None,
            fallback_title: fallback_title.into(),
        }
    }

    /// With team size
    #[inline]
    #[must_use]
    pub fn with_team_size(mut self, team_size: Option<i64>) -> Self {
        self.team_size = team_size;
        self
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub decomposition: Decomposition,
    /// Whether recovery was needed
    pub partial: bool,
    pub recovery_reason: Option<String>,
    /// Referential repairs applied
    pub integrity: IntegrityReport,
}

impl PipelineOutput {
    /// Attach provenance for the caller-facing envelope
    #[must_use]
    pub fn into_analysis_output(self, meta: AnalysisMeta) -> AnalysisOutput {
        AnalysisOutput {
            decomposition: self.decomposition,
            meta,
            partial: self.partial,
            recovery_reason: self.recovery_reason,
        }
    }
}

/// Stateless pipeline runner
#[derive(Debug, Clone, Copy, Default)]
pub struct DecompositionPipeline;

impl DecompositionPipeline {
    /// Create pipeline
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run the pipeline over raw model text
    ///
    /// # Errors
    /// Returns [`PipelineError::Unrecoverable`] when the text holds JSON but
    /// no JSON object
    pub fn run(&self, raw: &str, ctx: &PipelineContext) -> Result<PipelineOutput, PipelineError> {
        let validated = match extract_json(raw) {
            Ok(object) => validate_or_recover(object, &ctx.fallback_title),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, response_len = raw.len(), "no JSON in model response, degrading to empty decomposition");
                Validated::unextractable(&ctx.fallback_title, &e)
            }
            Err(e) => {
                tracing::error!(error = %e, "model response is not a JSON object");
                return Err(e.into());
            }
        };

        let partial = validated.is_partial();
        let recovery_reason = validated.reason().map(str::to_owned);
        let (draft, integrity) = enforce_integrity(validated.into_draft());
        let health = score(&draft.steps, &draft.gaps, ctx.team_size);

        let id = draft
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let decomposition = Decomposition {
            id,
            title: draft.title,
            steps: draft.steps,
            gaps: draft.gaps,
            health,
        };

        if partial {
            metrics::counter!("decomp_partial_results_total").increment(1);
        }
        tracing::info!(
            id = %decomposition.id,
            steps = decomposition.steps.len(),
            gaps = decomposition.gaps.len(),
            partial,
            repairs = integrity.repair_count(),
            "decomposition pipeline completed"
        );

        Ok(PipelineOutput {
            decomposition,
            partial,
            recovery_reason,
            integrity,
        })
    }
}
