//! Deterministic analysis cache keys
//!
//! Only the inputs that change what the model is asked are part of the key.
//! Cost figures (`hourlyRate`, `hoursPerStep`) enrich the prompt but never
//! reach the digest.

use crate::error::CacheError;
use decomp_model::AnalysisHash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Team and cost details supplied with a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_step: Option<f64>,
}

/// A workflow analysis request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Free-text workflow description
    pub description: String,
    /// Optional stage hints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_context: Option<CostContext>,
}

impl AnalysisRequest {
    /// Request with only a description
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// With stage hints
    #[must_use]
    pub fn with_stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages = Some(stages.into_iter().map(Into::into).collect());
        self
    }

    /// With team size
    #[inline]
    #[must_use]
    pub fn with_team_size(mut self, team_size: i64) -> Self {
        self.cost_context.get_or_insert_with(CostContext::default).team_size = Some(team_size);
        self
    }

    /// With team context
    #[inline]
    #[must_use]
    pub fn with_team_context(mut self, context: impl Into<String>) -> Self {
        self.cost_context.get_or_insert_with(CostContext::default).team_context = Some(context.into());
        self
    }

    /// With cost figures
    #[inline]
    #[must_use]
    pub fn with_costs(mut self, hourly_rate: f64, hours_per_step: f64) -> Self {
        let ctx = self.cost_context.get_or_insert_with(CostContext::default);
        ctx.hourly_rate = Some(hourly_rate);
        ctx.hours_per_step = Some(hours_per_step);
        self
    }

    /// Team size, when given
    #[must_use]
    pub fn team_size(&self) -> Option<i64> {
        self.cost_context.as_ref().and_then(|c| c.team_size)
    }

    /// Team context, when given
    #[must_use]
    pub fn team_context(&self) -> Option<&str> {
        self.cost_context.as_ref().and_then(|c| c.team_context.as_deref())
    }
}

/// Fields that feed the digest
///
/// Declared in key order so the serialized form is sorted.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyMaterial<'a> {
    description: String,
    model_id: &'a str,
    prompt_version: &'a str,
    stages: &'a [String],
    team_context: Option<&'a str>,
    team_size: Option<i64>,
}

/// Collapse whitespace runs to single spaces and trim
#[must_use]
pub fn normalize_description(description: &str) -> String {
    description.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive the cache key for a request
///
/// # Errors
/// Returns error if key material cannot be serialized
pub fn compute_analysis_hash(
    request: &AnalysisRequest,
    prompt_version: &str,
    model_id: &str,
) -> Result<AnalysisHash, CacheError> {
    let material = KeyMaterial {
        description: normalize_description(&request.description),
        model_id,
        prompt_version,
        stages: request.stages.as_deref().unwrap_or_default(),
        team_context: request.team_context(),
        team_size: request.team_size(),
    };

    let bytes = serde_json::to_vec(&material)?;
    let digest = Sha256::digest(&bytes);
    let hash = AnalysisHash::from_digest(&digest)?;

    tracing::trace!(%hash, prompt_version, model_id, "computed analysis hash");
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decomp_model::ANALYSIS_HASH_LEN;
    use proptest::prelude::*;

    fn key(request: &AnalysisRequest) -> AnalysisHash {
        compute_analysis_hash(request, "v3", "model-a").unwrap()
    }

    #[test]
    fn renders_sixteen_lowercase_hex_chars() {
        let rendered = key(&AnalysisRequest::new("Onboard a new hire")).to_string();
        assert_eq!(rendered.len(), ANALYSIS_HASH_LEN);
        assert!(rendered.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(
            key(&AnalysisRequest::new("  Hello   world  ")),
            key(&AnalysisRequest::new("Hello world"))
        );
        assert_eq!(
            key(&AnalysisRequest::new("Hello\n\tworld")),
            key(&AnalysisRequest::new("Hello world"))
        );
    }

    #[test]
    fn missing_stages_equal_empty_stages() {
        let empty: [&str; 0] = [];
        assert_eq!(
            key(&AnalysisRequest::new("x")),
            key(&AnalysisRequest::new("x").with_stages(empty))
        );
    }

    #[test]
    fn cost_figures_never_change_the_key() {
        let base = AnalysisRequest::new("Process refunds").with_team_size(4);
        assert_eq!(key(&base), key(&base.clone().with_costs(85.0, 1.5)));
        assert_eq!(key(&base), key(&base.clone().with_costs(12.0, 40.0)));
    }

    #[test]
    fn sensitive_inputs_change_the_key() {
        let base = AnalysisRequest::new("Process refunds").with_team_size(4);
        let h = key(&base);

        assert_ne!(h, key(&AnalysisRequest::new("Process refunds").with_team_size(5)));
        assert_ne!(h, key(&base.clone().with_team_context("remote team")));
        assert_ne!(h, key(&base.clone().with_stages(["intake"])));
        assert_ne!(h, compute_analysis_hash(&base, "v4", "model-a").unwrap());
        assert_ne!(h, compute_analysis_hash(&base, "v3", "model-b").unwrap());
    }

    #[test]
    fn stage_order_matters() {
        assert_ne!(
            key(&AnalysisRequest::new("x").with_stages(["a", "b"])),
            key(&AnalysisRequest::new("x").with_stages(["b", "a"]))
        );
    }

    proptest! {
        #[test]
        fn prop_hash_is_deterministic(description in ".{0,200}", team in proptest::option::of(0i64..500)) {
            let mut request = AnalysisRequest::new(description);
            if let Some(size) = team {
                request = request.with_team_size(size);
            }
            prop_assert_eq!(key(&request), key(&request.clone()));
        }

        #[test]
        fn prop_hourly_rate_is_ignored(rate in 0.0f64..10_000.0, hours in 0.0f64..100.0) {
            let base = AnalysisRequest::new("Reconcile accounts").with_team_size(3);
            prop_assert_eq!(key(&base), key(&base.clone().with_costs(rate, hours)));
        }
    }
}
