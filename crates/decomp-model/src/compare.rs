//! Change report between two decompositions

use crate::gap::Gap;
use crate::health::HealthMetrics;
use crate::step::Step;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Step attribute compared when diffing matched steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepField {
    Name,
    Layer,
    Owner,
    AutomationScore,
    Description,
    Tools,
    Inputs,
    Outputs,
}

impl StepField {
    /// Fields in comparison order
    pub const ALL: [StepField; 8] = [
        StepField::Name,
        StepField::Layer,
        StepField::Owner,
        StepField::AutomationScore,
        StepField::Description,
        StepField::Tools,
        StepField::Inputs,
        StepField::Outputs,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Layer => "layer",
            Self::Owner => "owner",
            Self::AutomationScore => "automationScore",
            Self::Description => "description",
            Self::Tools => "tools",
            Self::Inputs => "inputs",
            Self::Outputs => "outputs",
        }
    }

    /// Whether the field differs between two steps
    #[must_use]
    pub fn differs(&self, before: &Step, after: &Step) -> bool {
        match self {
            Self::Name => before.name != after.name,
            Self::Layer => before.layer != after.layer,
            Self::Owner => before.owner != after.owner,
            Self::AutomationScore => before.automation_score != after.automation_score,
            Self::Description => before.description != after.description,
            Self::Tools => before.tools != after.tools,
            Self::Inputs => before.inputs != after.inputs,
            Self::Outputs => before.outputs != after.outputs,
        }
    }
}

impl Display for StepField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A matched step pair with at least one differing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedStep {
    pub before: Step,
    pub after: Step,
    pub changed_fields: Vec<StepField>,
    /// Match score that paired the two steps
    pub similarity: MatchScore,
}

/// A matched step pair with no differing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnchangedStep {
    pub before_id: String,
    pub after: Step,
}

/// Per-metric `after - before`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDelta {
    pub complexity: i16,
    pub fragility: i16,
    pub automation_potential: i16,
    pub team_load_balance: i16,
}

impl HealthDelta {
    /// Compute delta between two metric sets
    #[must_use]
    pub fn between(before: &HealthMetrics, after: &HealthMetrics) -> Self {
        let d = |b: u8, a: u8| i16::from(a) - i16::from(b);
        Self {
            complexity: d(before.complexity, after.complexity),
            fragility: d(before.fragility, after.fragility),
            automation_potential: d(before.automation_potential, after.automation_potential),
            team_load_balance: d(before.team_load_balance, after.team_load_balance),
        }
    }

    /// True when every metric is unchanged
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Similarity score stored as thousandths so the report stays `Eq`
pub type MatchScore = u16;

/// Result of comparing a "before" and an "after" decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResult {
    pub steps_added: Vec<Step>,
    pub steps_removed: Vec<Step>,
    pub steps_modified: Vec<ModifiedStep>,
    pub steps_unchanged: Vec<UnchangedStep>,
    pub gaps_resolved: Vec<Gap>,
    pub gaps_new: Vec<Gap>,
    pub gaps_persistent: Vec<Gap>,
    pub health_delta: HealthDelta,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_delta_signs() {
        let before = HealthMetrics {
            complexity: 40,
            fragility: 60,
            automation_potential: 30,
            team_load_balance: 80,
            ..HealthMetrics::default()
        };
        let after = HealthMetrics {
            complexity: 45,
            fragility: 20,
            automation_potential: 30,
            team_load_balance: 100,
            ..HealthMetrics::default()
        };

        let delta = HealthDelta::between(&before, &after);
        assert_eq!(delta.complexity, 5);
        assert_eq!(delta.fragility, -40);
        assert_eq!(delta.automation_potential, 0);
        assert_eq!(delta.team_load_balance, 20);
        assert!(!delta.is_zero());
        assert!(HealthDelta::between(&before, &before).is_zero());
    }

    #[test]
    fn step_field_detects_order_sensitive_lists() {
        let a = Step::new("a", "Build").with_tools(["git", "cargo"]);
        let b = Step::new("a", "Build").with_tools(["cargo", "git"]);

        assert!(StepField::Tools.differs(&a, &b));
        assert!(!StepField::Name.differs(&a, &b));
    }
}
