//! One-line change summary

use decomp_model::HealthDelta;

/// Summary used when nothing noteworthy changed
pub const NO_CHANGES: &str = "No significant changes detected.";

/// Counts and deltas the summary is built from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryInput {
    pub gaps_resolved: usize,
    pub gaps_new: usize,
    pub steps_added: usize,
    pub steps_removed: usize,
    pub health_delta: HealthDelta,
}

/// Build the summary sentence
///
/// Parts appear in a fixed order and only when non-zero.
#[must_use]
pub fn summarize(input: &SummaryInput) -> String {
    let mut parts = Vec::new();

    if input.gaps_resolved > 0 {
        parts.push(format!("{} resolved", count(input.gaps_resolved, "gap")));
    }
    if input.gaps_new > 0 {
        parts.push(format!(
            "{} new {} introduced",
            input.gaps_new,
            noun(input.gaps_new, "gap")
        ));
    }

    let automation = input.health_delta.automation_potential;
    if automation != 0 {
        let direction = if automation > 0 { "improved" } else { "decreased" };
        parts.push(format!("automation {direction} by {}%", automation.unsigned_abs()));
    }

    let fragility = input.health_delta.fragility;
    if fragility != 0 {
        let direction = if fragility < 0 { "reduced" } else { "increased" };
        parts.push(format!("fragility {direction} by {} points", fragility.unsigned_abs()));
    }

    if input.steps_added > 0 {
        parts.push(format!("{} added", count(input.steps_added, "step")));
    }
    if input.steps_removed > 0 {
        parts.push(format!("{} removed", count(input.steps_removed, "step")));
    }

    if parts.is_empty() {
        NO_CHANGES.to_string()
    } else {
        format!("{}.", parts.join(", "))
    }
}

fn noun(n: usize, singular: &str) -> String {
    if n == 1 {
        singular.to_string()
    } else {
        format!("{singular}s")
    }
}

fn count(n: usize, singular: &str) -> String {
    format!("{n} {}", noun(n, singular))
}
