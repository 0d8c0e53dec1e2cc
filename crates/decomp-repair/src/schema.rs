//! Schema validation with field-level recovery
//!
//! A payload that matches the expected shape is returned as
//! [`Validated::Valid`]. Anything else goes through a recovery pass that
//! keeps every entry it can identify, defaults or clamps what it can repair,
//! and drops entries that lack identity fields. The outcome is then
//! [`Validated::Recovered`] with a reason describing what was done.

use crate::error::ExtractionError;
use decomp_model::{Gap, GapType, Layer, Severity, Step};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Title, steps and gaps before integrity enforcement and scoring
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecompositionDraft {
    /// Identifier supplied by the payload, if any
    pub id: Option<String>,
    /// Workflow title
    pub title: String,
    /// Steps in payload order
    pub steps: Vec<Step>,
    /// Gaps in payload order
    pub gaps: Vec<Gap>,
}

impl DecompositionDraft {
    /// Draft with a title and nothing else
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Outcome of validation
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    /// Payload matched the expected shape
    Valid(DecompositionDraft),
    /// Payload needed repair; `partial` is the best-effort result
    Recovered {
        /// Repaired draft
        partial: DecompositionDraft,
        /// What was recovered and why
        reason: String,
    },
}

impl Validated {
    /// Degraded outcome for a response with no extractable JSON
    #[must_use]
    pub fn unextractable(fallback_title: &str, error: &ExtractionError) -> Self {
        Self::Recovered {
            partial: DecompositionDraft::titled(fallback_title),
            reason: error.to_string(),
        }
    }

    /// Whether recovery was needed
    #[inline]
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    /// Recovery reason, if any
    #[inline]
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid(_) => None,
            Self::Recovered { reason, .. } => Some(reason),
        }
    }

    /// Borrow the draft
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &DecompositionDraft {
        match self {
            Self::Valid(draft) | Self::Recovered { partial: draft, .. } => draft,
        }
    }

    /// Take the draft
    #[inline]
    #[must_use]
    pub fn into_draft(self) -> DecompositionDraft {
        match self {
            Self::Valid(draft) | Self::Recovered { partial: draft, .. } => draft,
        }
    }
}

// `id` is read separately with `identity` so its type never fails the payload
#[derive(Deserialize)]
struct StrictPayload {
    title: String,
    steps: Vec<Step>,
    gaps: Vec<Gap>,
}

/// Validate a payload, recovering field by field on failure
///
/// Never fails: the worst case is an empty draft carrying `fallback_title`.
#[must_use]
pub fn validate_or_recover(payload: Map<String, Value>, fallback_title: &str) -> Validated {
    match check_strict(&payload) {
        Ok(strict) => Validated::Valid(DecompositionDraft {
            id: payload.get("id").and_then(identity),
            title: strict.title,
            steps: strict.steps,
            gaps: strict.gaps,
        }),
        Err(violation) => {
            let mut recovery = Recovery::default();
            let partial = recovery.run(&payload, fallback_title);
            let reason = recovery.reason(&violation);
            tracing::warn!(
                steps = partial.steps.len(),
                gaps = partial.gaps.len(),
                reason = %reason,
                "payload failed schema validation, recovered partial decomposition"
            );
            metrics::counter!("decomp_schema_recoveries_total").increment(1);
            Validated::Recovered { partial, reason }
        }
    }
}

fn check_strict(payload: &Map<String, Value>) -> Result<StrictPayload, String> {
    let mut strict: StrictPayload =
        serde_json::from_value(Value::Object(payload.clone())).map_err(|e| e.to_string())?;
    trim_identities(&mut strict);

    if let Some(step) = strict.steps.iter().find(|s| s.automation_score > 100) {
        return Err(format!(
            "automationScore {} out of range on step '{}'",
            step.automation_score, step.id
        ));
    }
    if let Some(step) = strict
        .steps
        .iter()
        .find(|s| s.id.trim().is_empty() || s.name.trim().is_empty())
    {
        return Err(format!("step '{}' has an empty id or name", step.id));
    }

    Ok(strict)
}

/// Trim step ids and references the way `identity` does on recovery
fn trim_identities(strict: &mut StrictPayload) {
    fn trim_in_place(id: &mut String) {
        let trimmed = id.trim();
        if trimmed.len() != id.len() {
            *id = trimmed.to_string();
        }
    }

    for step in &mut strict.steps {
        trim_in_place(&mut step.id);
        step.dependencies.iter_mut().for_each(trim_in_place);
    }
    for gap in &mut strict.gaps {
        gap.step_ids.iter_mut().for_each(trim_in_place);
    }
}

/// Counters describing one recovery pass
#[derive(Debug, Default)]
struct Recovery {
    title_defaulted: bool,
    steps_missing: bool,
    gaps_missing: bool,
    steps_dropped: usize,
    gaps_dropped: usize,
    layers_defaulted: usize,
    scores_clamped: usize,
    scores_defaulted: usize,
    gap_text_defaulted: usize,
    severities_defaulted: usize,
    list_members_dropped: usize,
}

impl Recovery {
    fn run(&mut self, payload: &Map<String, Value>, fallback_title: &str) -> DecompositionDraft {
        let title = match payload.get("title").and_then(non_empty_str) {
            Some(title) => title.to_string(),
            None => {
                self.title_defaulted = true;
                fallback_title.to_string()
            }
        };

        let steps = match payload.get("steps").and_then(Value::as_array) {
            Some(raw_steps) => raw_steps
                .iter()
                .filter_map(|raw| {
                    let step = self.recover_step(raw);
                    if step.is_none() {
                        self.steps_dropped += 1;
                    }
                    step
                })
                .collect(),
            None => {
                self.steps_missing = true;
                Vec::new()
            }
        };

        let gaps = match payload.get("gaps").and_then(Value::as_array) {
            Some(raw_gaps) => raw_gaps
                .iter()
                .filter_map(|raw| {
                    let gap = self.recover_gap(raw);
                    if gap.is_none() {
                        self.gaps_dropped += 1;
                    }
                    gap
                })
                .collect(),
            None => {
                self.gaps_missing = true;
                Vec::new()
            }
        };

        DecompositionDraft {
            id: payload.get("id").and_then(identity),
            title,
            steps,
            gaps,
        }
    }

    fn recover_step(&mut self, raw: &Value) -> Option<Step> {
        let obj = raw.as_object()?;
        let id = obj.get("id").and_then(identity)?;
        let name = obj.get("name").and_then(non_empty_str)?.to_string();

        let layer = match obj.get("layer").and_then(Value::as_str).map(str::parse::<Layer>) {
            Some(Ok(layer)) => layer,
            _ => {
                self.layers_defaulted += 1;
                Layer::default()
            }
        };

        let automation_score = self.recover_score(obj.get("automationScore"));

        Some(Step {
            id,
            name,
            description: text_or_empty(obj.get("description")),
            owner: obj
                .get("owner")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            layer,
            inputs: self.string_list(obj.get("inputs")),
            outputs: self.string_list(obj.get("outputs")),
            tools: self.string_list(obj.get("tools")),
            automation_score,
            dependencies: self.identity_list(obj.get("dependencies")),
        })
    }

    fn recover_score(&mut self, raw: Option<&Value>) -> u8 {
        let numeric = match raw {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match numeric {
            Some(score) if score.is_finite() => {
                let rounded = score.round();
                let clamped = rounded.clamp(0.0, 100.0);
                if (clamped - score).abs() > f64::EPSILON || !matches!(raw, Some(Value::Number(_))) {
                    self.scores_clamped += 1;
                }
                // clamped to [0, 100] above
                clamped as u8
            }
            _ => {
                self.scores_defaulted += 1;
                0
            }
        }
    }

    fn recover_gap(&mut self, raw: &Value) -> Option<Gap> {
        let obj = raw.as_object()?;
        let gap_type = obj
            .get("type")
            .and_then(Value::as_str)?
            .parse::<GapType>()
            .ok()?;

        let severity = match obj.get("severity").and_then(Value::as_str).map(str::parse::<Severity>) {
            Some(Ok(severity)) => severity,
            _ => {
                self.severities_defaulted += 1;
                Severity::default()
            }
        };

        for field in ["description", "suggestion"] {
            if !obj.get(field).is_some_and(Value::is_string) {
                self.gap_text_defaulted += 1;
            }
        }

        Some(Gap {
            gap_type,
            severity,
            step_ids: self.identity_list(obj.get("stepIds")),
            description: text_or_empty(obj.get("description")),
            suggestion: text_or_empty(obj.get("suggestion")),
            confidence: obj.get("confidence").and_then(Value::as_f64),
            time_waste: obj.get("timeWaste").and_then(scalar_text),
            effort_level: obj.get("effortLevel").and_then(scalar_text),
            impacted_roles: self.string_list(obj.get("impactedRoles")),
        })
    }

    fn string_list(&mut self, raw: Option<&Value>) -> Vec<String> {
        let Some(items) = raw.and_then(Value::as_array) else {
            return Vec::new();
        };
        let kept: Vec<String> = items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect();
        self.list_members_dropped += items.len() - kept.len();
        kept
    }

    fn identity_list(&mut self, raw: Option<&Value>) -> Vec<String> {
        let Some(items) = raw.and_then(Value::as_array) else {
            return Vec::new();
        };
        let kept: Vec<String> = items.iter().filter_map(identity).collect();
        self.list_members_dropped += items.len() - kept.len();
        kept
    }

    fn reason(&self, violation: &str) -> String {
        let mut parts = vec![format!("Schema validation failed ({violation})")];

        let mut note = |count: usize, what: &str| {
            if count > 0 {
                parts.push(format!("{what} on {count} entr{}", if count == 1 { "y" } else { "ies" }));
            }
        };
        note(self.steps_dropped, "dropped step missing id or name");
        note(self.gaps_dropped, "dropped gap missing a known type");
        note(self.layers_defaulted, "defaulted layer to human");
        note(self.scores_clamped, "clamped automationScore");
        note(self.scores_defaulted, "defaulted missing automationScore to 0");
        note(self.severities_defaulted, "defaulted severity to medium");
        note(self.gap_text_defaulted, "defaulted missing gap description/suggestion");
        note(self.list_members_dropped, "dropped non-string list member");

        if self.title_defaulted {
            parts.push("used fallback title".to_string());
        }
        if self.steps_missing {
            parts.push("steps missing".to_string());
        }
        if self.gaps_missing {
            parts.push("gaps missing".to_string());
        }

        parts.join("; ")
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Identifier from a string or number
fn identity(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim())
            .filter(|s| !s.is_empty())
            .map(ToString::to_string),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .unwrap_or_default()
}
