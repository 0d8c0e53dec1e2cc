//! Workflow steps and their operational layers

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Bucket name used for steps that carry no owner
pub const UNASSIGNED_OWNER: &str = "Unassigned";

/// Operational tier a step runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Performed by a person
    #[default]
    Human,
    /// Self-contained automated unit
    Cell,
    /// Coordinates other steps
    Orchestration,
    /// Stores or recalls context
    Memory,
    /// Talks to an external system
    Integration,
}

impl Layer {
    /// All layers in declaration order
    pub const ALL: [Layer; 5] = [
        Layer::Human,
        Layer::Cell,
        Layer::Orchestration,
        Layer::Memory,
        Layer::Integration,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Cell => "cell",
            Self::Orchestration => "orchestration",
            Self::Memory => "memory",
            Self::Integration => "integration",
        }
    }
}

impl Display for Layer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|layer| layer.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownLayer(s.to_string()))
    }
}

/// Layer name that matched no known layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer: '{0}'")]
pub struct UnknownLayer(pub String);

/// A unit of work inside a decomposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Identifier, unique within a decomposition
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Responsible person or role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Operational layer
    pub layer: Layer,
    /// Consumed artifacts
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Produced artifacts
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Tools used
    #[serde(default)]
    pub tools: Vec<String>,
    /// How automatable the step is, 0–100
    pub automation_score: u8,
    /// Ids of steps this step depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Step {
    /// Create a human-layer step with no owner and a zero automation score
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            owner: None,
            layer: Layer::Human,
            inputs: Vec::new(),
            outputs: Vec::new(),
            tools: Vec::new(),
            automation_score: 0,
            dependencies: Vec::new(),
        }
    }

    /// With layer
    #[inline]
    #[must_use]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// With owner
    #[inline]
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With automation score, clamped to 100
    #[inline]
    #[must_use]
    pub fn with_automation_score(mut self, score: u8) -> Self {
        self.automation_score = score.min(100);
        self
    }

    /// With tools
    #[must_use]
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Add a dependency on another step
    #[inline]
    #[must_use]
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Owner bucket used for load balancing
    ///
    /// Blank owners and the literal "Unassigned" share one bucket.
    #[must_use]
    pub fn owner_bucket(&self) -> &str {
        match self.owner.as_deref().map(str::trim) {
            Some(owner) if !owner.is_empty() => owner,
            _ => UNASSIGNED_OWNER,
        }
    }

    /// Whether the step names a real owner
    #[must_use]
    pub fn has_owner(&self) -> bool {
        self.owner_bucket() != UNASSIGNED_OWNER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_parse_is_case_insensitive() {
        assert_eq!("Orchestration".parse::<Layer>().unwrap(), Layer::Orchestration);
        assert_eq!(" memory ".parse::<Layer>().unwrap(), Layer::Memory);
        assert!("robot".parse::<Layer>().is_err());
    }

    #[test]
    fn layer_default_is_human() {
        assert_eq!(Layer::default(), Layer::Human);
    }

    #[test]
    fn step_builder() {
        let step = Step::new("b", "Review")
            .with_layer(Layer::Cell)
            .with_owner("Bob")
            .with_automation_score(250)
            .depends_on("a");

        assert_eq!(step.automation_score, 100);
        assert_eq!(step.dependencies, vec!["a".to_string()]);
        assert_eq!(step.owner_bucket(), "Bob");
    }

    #[test]
    fn owner_bucket_collapses_blank_owners() {
        assert_eq!(Step::new("a", "x").owner_bucket(), UNASSIGNED_OWNER);
        assert_eq!(Step::new("a", "x").with_owner("  ").owner_bucket(), UNASSIGNED_OWNER);
        assert!(!Step::new("a", "x").with_owner("Unassigned").has_owner());
        assert!(Step::new("a", "x").with_owner("Ops").has_owner());
    }

    #[test]
    fn step_deserialize_defaults() {
        let step: Step = serde_json::from_str(
            r#"{"id":"s1","name":"Do it","layer":"cell","automationScore":55}"#,
        )
        .unwrap();

        assert!(step.inputs.is_empty());
        assert!(step.dependencies.is_empty());
        assert_eq!(step.owner, None);
        assert_eq!(step.automation_score, 55);
    }
}
