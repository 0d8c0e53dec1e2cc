//! Gaps: structural deficiencies detected in a workflow

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Kind of deficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    /// Work piles up behind one step
    Bottleneck,
    /// Only one person can perform a step
    SingleDependency,
    /// Manual work that could be automated
    ManualOverhead,
    /// Information is lost between steps
    ContextLoss,
    /// No signal flows back to earlier steps
    MissingFeedback,
    /// No recovery path on failure
    MissingFallback,
    /// Unclear boundaries or responsibilities
    ScopeAmbiguity,
}

impl GapType {
    /// All gap types in declaration order
    pub const ALL: [GapType; 7] = [
        GapType::Bottleneck,
        GapType::SingleDependency,
        GapType::ManualOverhead,
        GapType::ContextLoss,
        GapType::MissingFeedback,
        GapType::MissingFallback,
        GapType::ScopeAmbiguity,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bottleneck => "bottleneck",
            Self::SingleDependency => "single_dependency",
            Self::ManualOverhead => "manual_overhead",
            Self::ContextLoss => "context_loss",
            Self::MissingFeedback => "missing_feedback",
            Self::MissingFallback => "missing_fallback",
            Self::ScopeAmbiguity => "scope_ambiguity",
        }
    }
}

impl Display for GapType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GapType {
    type Err = UnknownGapType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&needle))
            .ok_or_else(|| UnknownGapType(s.to_string()))
    }
}

/// Gap type name that matched no known type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gap type: '{0}'")]
pub struct UnknownGapType(pub String);

/// Priority of a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// Severity name that matched no known severity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity: '{0}'")]
pub struct UnknownSeverity(pub String);

/// A detected deficiency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    /// Kind of deficiency
    #[serde(rename = "type")]
    pub gap_type: GapType,
    /// Priority
    pub severity: Severity,
    /// Steps the gap affects
    #[serde(default)]
    pub step_ids: Vec<String>,
    /// What is wrong
    pub description: String,
    /// How to fix it
    pub suggestion: String,
    /// Model confidence, 0.0–1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Estimated time lost, free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_waste: Option<String>,
    /// Effort to remediate, free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort_level: Option<String>,
    /// Roles feeling the impact
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub impacted_roles: Vec<String>,
}

impl Gap {
    /// Create gap with empty description and suggestion
    #[must_use]
    pub fn new(gap_type: GapType, severity: Severity, step_ids: Vec<String>) -> Self {
        Self {
            gap_type,
            severity,
            step_ids,
            description: String::new(),
            suggestion: String::new(),
            confidence: None,
            time_waste: None,
            effort_level: None,
            impacted_roles: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With suggestion
    #[inline]
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_type_parse_accepts_loose_spellings() {
        assert_eq!("single-dependency".parse::<GapType>().unwrap(), GapType::SingleDependency);
        assert_eq!("Manual Overhead".parse::<GapType>().unwrap(), GapType::ManualOverhead);
        assert_eq!("bottleneck".parse::<GapType>().unwrap(), GapType::Bottleneck);
        assert!("gremlins".parse::<GapType>().is_err());
    }

    #[test]
    fn severity_parse() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn gap_optional_fields_are_omitted() {
        let gap = Gap::new(GapType::ContextLoss, Severity::Low, vec![]);
        let value = serde_json::to_value(&gap).unwrap();

        assert_eq!(value["type"], "context_loss");
        assert!(value.get("confidence").is_none());
        assert!(value.get("impactedRoles").is_none());
    }
}
