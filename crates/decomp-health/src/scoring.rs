//! Health scoring engine
//!
//! Pure functions from `(steps, gaps, team size)` to [`HealthMetrics`].

use crate::calibration::{thresholds, TeamThresholds};
use decomp_model::{
    ConfidenceLevel, Gap, GapType, HealthConfidence, HealthMetrics, Layer, Severity, Step,
};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Scores above this are capped
pub const MAX_SCORE: u8 = 100;

/// Steps scoring below this count as low-automation
pub const LOW_AUTOMATION_THRESHOLD: u8 = 30;

const HIGH_GAP_WEIGHT: u64 = 20;
const MEDIUM_GAP_WEIGHT: u64 = 10;
const SINGLE_DEPENDENCY_WEIGHT: u64 = 15;
const LOW_AUTOMATION_WEIGHT: u64 = 5;

/// Metrics plus the intermediate values that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub metrics: HealthMetrics,
    /// Fragility before the team multiplier and the cap
    pub raw_fragility: u64,
    pub thresholds: TeamThresholds,
}

/// Score a step graph
#[must_use]
pub fn score(steps: &[Step], gaps: &[Gap], team_size: Option<i64>) -> HealthMetrics {
    score_with_breakdown(steps, gaps, team_size).metrics
}

/// Score a step graph, keeping intermediate values
#[must_use]
pub fn score_with_breakdown(steps: &[Step], gaps: &[Gap], team_size: Option<i64>) -> HealthReport {
    let calibration = thresholds(team_size);
    let raw_fragility = raw_fragility(steps, gaps);

    let metrics = HealthMetrics {
        complexity: complexity(steps),
        fragility: cap(round_to_u64(raw_fragility as f64 * calibration.fragility_multiplier)),
        automation_potential: automation_potential(steps),
        team_load_balance: team_load_balance(steps, calibration.load_balance_baseline),
        team_size,
        confidence: Some(confidence(team_size)),
    };

    tracing::debug!(
        steps = steps.len(),
        gaps = gaps.len(),
        tier = calibration.tier.as_str(),
        raw_fragility,
        complexity = metrics.complexity,
        fragility = metrics.fragility,
        automation_potential = metrics.automation_potential,
        team_load_balance = metrics.team_load_balance,
        "scored decomposition health"
    );

    HealthReport {
        metrics,
        raw_fragility,
        thresholds: calibration,
    }
}

/// `min(100, steps*6 + dependencies*3 + distinct layers*5)`
#[must_use]
pub fn complexity(steps: &[Step]) -> u8 {
    let n = steps.len() as u64;
    let dependencies: u64 = steps.iter().map(|s| s.dependencies.len() as u64).sum();
    let layers = steps.iter().map(|s| s.layer).collect::<HashSet<Layer>>().len() as u64;

    cap(n
        .saturating_mul(6)
        .saturating_add(dependencies.saturating_mul(3))
        .saturating_add(layers.saturating_mul(5)))
}

/// Weighted count of severe gaps, single dependencies and manual steps
#[must_use]
pub fn raw_fragility(steps: &[Step], gaps: &[Gap]) -> u64 {
    let (mut high, mut medium, mut single_dependency) = (0u64, 0u64, 0u64);
    for gap in gaps {
        match gap.severity {
            Severity::High => high += 1,
            Severity::Medium => medium += 1,
            Severity::Low => {}
        }
        if gap.gap_type == GapType::SingleDependency {
            single_dependency += 1;
        }
    }
    let low_automation = steps
        .iter()
        .filter(|s| s.automation_score < LOW_AUTOMATION_THRESHOLD)
        .count() as u64;

    high.saturating_mul(HIGH_GAP_WEIGHT)
        .saturating_add(medium.saturating_mul(MEDIUM_GAP_WEIGHT))
        .saturating_add(single_dependency.saturating_mul(SINGLE_DEPENDENCY_WEIGHT))
        .saturating_add(low_automation.saturating_mul(LOW_AUTOMATION_WEIGHT))
}

/// Rounded mean automation score, 0 for an empty graph
#[must_use]
pub fn automation_potential(steps: &[Step]) -> u8 {
    if steps.is_empty() {
        return 0;
    }
    let total: u64 = steps.iter().map(|s| u64::from(s.automation_score)).sum();
    cap(round_to_u64(total as f64 / steps.len() as f64))
}

/// How evenly steps spread across owners
///
/// Steps without an owner share one "Unassigned" bucket. When no step has
/// an owner at all the tier baseline is returned.
#[must_use]
pub fn team_load_balance(steps: &[Step], baseline: u8) -> u8 {
    if steps.is_empty() {
        return 0;
    }
    if !steps.iter().any(Step::has_owner) {
        return baseline;
    }

    let mut buckets: IndexMap<&str, u64> = IndexMap::new();
    for step in steps {
        *buckets.entry(step.owner_bucket()).or_insert(0) += 1;
    }

    if buckets.len() == 1 {
        let even_share = round_to_u64(100.0 / steps.len() as f64);
        return baseline.min(cap(even_share));
    }

    let max = buckets.values().copied().max().unwrap_or(1) as f64;
    let min = buckets.values().copied().min().unwrap_or(0) as f64;
    let score = 100.0 - ((max - min) / max) * 25.0;
    cap(round_to_u64(score.clamp(0.0, 100.0)))
}

fn confidence(team_size: Option<i64>) -> HealthConfidence {
    match team_size {
        Some(_) => HealthConfidence {
            level: ConfidenceLevel::High,
            reason: "Team size was explicitly provided".to_string(),
        },
        None => HealthConfidence {
            level: ConfidenceLevel::Inferred,
            reason: "No team size specified; using medium-team defaults".to_string(),
        },
    }
}

fn round_to_u64(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // saturates at u64::MAX for out-of-range floats
        value.round() as u64
    }
}

fn cap(value: u64) -> u8 {
    // bounded by MAX_SCORE
    value.min(u64::from(MAX_SCORE)) as u8
}
