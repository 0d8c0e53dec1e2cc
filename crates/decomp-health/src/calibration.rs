//! Team-size calibration table
//!
//! Provides [`TeamTier`] and the [`TeamThresholds`] that parameterize scoring.

use serde::{Deserialize, Serialize};

/// Team size bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamTier {
    /// One person (or a non-positive size)
    Solo,
    /// 2–5 people
    Small,
    /// 6–20 people, or size unknown
    #[default]
    Medium,
    /// 21 or more people
    Large,
}

impl TeamTier {
    /// Tier for an optional team size
    ///
    /// # Selection Logic
    /// - `None` → `Medium`
    /// - `..=1` (including zero and negatives) → `Solo`
    /// - `2..=5` → `Small`
    /// - `6..=20` → `Medium`
    /// - `21..` → `Large`
    #[must_use]
    pub const fn for_team_size(team_size: Option<i64>) -> Self {
        match team_size {
            None => Self::Medium,
            Some(i64::MIN..=1) => Self::Solo,
            Some(2..=5) => Self::Small,
            Some(6..=20) => Self::Medium,
            Some(_) => Self::Large,
        }
    }

    /// Calibration values for this tier
    #[must_use]
    pub const fn thresholds(self) -> TeamThresholds {
        match self {
            Self::Solo => TeamThresholds {
                tier: self,
                fragility_multiplier: 1.8,
                bottleneck_multiplier: 1.5,
                load_balance_baseline: 30,
            },
            Self::Small => TeamThresholds {
                tier: self,
                fragility_multiplier: 1.4,
                bottleneck_multiplier: 1.2,
                load_balance_baseline: 45,
            },
            Self::Medium => TeamThresholds {
                tier: self,
                fragility_multiplier: 1.0,
                bottleneck_multiplier: 1.0,
                load_balance_baseline: 60,
            },
            Self::Large => TeamThresholds {
                tier: self,
                fragility_multiplier: 0.8,
                bottleneck_multiplier: 0.8,
                load_balance_baseline: 70,
            },
        }
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Scoring parameters for one team tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamThresholds {
    pub tier: TeamTier,
    /// Scales raw fragility
    pub fragility_multiplier: f64,
    /// Scales bottleneck weight for tier-aware prioritization
    pub bottleneck_multiplier: f64,
    /// Load-balance score used when owner data is thin
    pub load_balance_baseline: u8,
}

/// Thresholds for an optional team size
#[inline]
#[must_use]
pub const fn thresholds(team_size: Option<i64>) -> TeamThresholds {
    TeamTier::for_team_size(team_size).thresholds()
}
