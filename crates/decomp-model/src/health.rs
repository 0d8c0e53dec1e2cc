//! Health metrics attached to a decomposition

use serde::{Deserialize, Serialize};

/// How much the metrics can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Calibrated with an explicit team size
    High,
    /// Calibrated with defaults
    Inferred,
}

/// Confidence level plus a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfidence {
    pub level: ConfidenceLevel,
    pub reason: String,
}

/// Four composite scores, each 0–100
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    pub complexity: u8,
    pub fragility: u8,
    pub automation_potential: u8,
    pub team_load_balance: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<HealthConfidence>,
}

impl HealthMetrics {
    /// Metric values in a fixed order: complexity, fragility,
    /// automation potential, team load balance
    #[inline]
    #[must_use]
    pub fn values(&self) -> [u8; 4] {
        [
            self.complexity,
            self.fragility,
            self.automation_potential,
            self.team_load_balance,
        ]
    }
}
