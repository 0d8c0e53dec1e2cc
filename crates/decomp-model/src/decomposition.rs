//! Decompositions and the pipeline output envelope

use crate::gap::Gap;
use crate::health::HealthMetrics;
use crate::step::Step;
use serde::{Deserialize, Serialize};

/// A repaired, scored workflow graph
///
/// Immutable once returned from the pipeline; edits require a new run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decomposition {
    pub id: String,
    pub title: String,
    /// Ids unique; insertion order is presentation order
    pub steps: Vec<Step>,
    pub gaps: Vec<Gap>,
    pub health: HealthMetrics,
}

impl Decomposition {
    /// Decomposition with no steps, no gaps and zeroed health
    #[must_use]
    pub fn empty(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            steps: Vec::new(),
            gaps: Vec::new(),
            health: HealthMetrics::default(),
        }
    }
}

/// Provenance of a model-produced decomposition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMeta {
    pub prompt_version: String,
    pub model_used: String,
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

impl AnalysisMeta {
    /// Metadata with zero token counts
    #[must_use]
    pub fn new(prompt_version: impl Into<String>, model_used: impl Into<String>) -> Self {
        Self {
            prompt_version: prompt_version.into(),
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

/// What an analysis request returns to its caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    #[serde(flatten)]
    pub decomposition: Decomposition,
    #[serde(rename = "_meta")]
    pub meta: AnalysisMeta,
    #[serde(rename = "_partial", default)]
    pub partial: bool,
    #[serde(
        rename = "_recoveryReason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recovery_reason: Option<String>,
}
