//! Testing utilities for the decomp workspace
//!
//! Shared fixtures and a scripted completion source.

#![allow(missing_docs)]

use async_trait::async_trait;
use decomp_cache::AnalysisRequest;
use decomp_core::{AnalyzerConfig, Completion, CompletionError, CompletionSource};
use decomp_model::{Decomposition, Gap, GapType, HealthMetrics, Layer, Severity, Step};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const TEST_PROMPT_VERSION: &str = "test-v1";
pub const TEST_MODEL_ID: &str = "test-model";

pub fn test_config() -> AnalyzerConfig {
    AnalyzerConfig::new()
        .with_prompt_version(TEST_PROMPT_VERSION)
        .with_model_id(TEST_MODEL_ID)
        .with_fallback_title("Untitled workflow")
}

pub fn step(id: &str, name: &str, layer: Layer, score: u8, owner: &str) -> Step {
    Step::new(id, name)
        .with_layer(layer)
        .with_automation_score(score)
        .with_owner(owner)
}

pub fn gap(gap_type: GapType, severity: Severity, step_ids: &[&str], description: &str) -> Gap {
    Gap::new(
        gap_type,
        severity,
        step_ids.iter().map(|s| (*s).to_string()).collect(),
    )
    .with_description(description)
    .with_suggestion("Review the step")
}

/// Three-step invoice flow used across scoring and diff tests
pub fn invoice_steps() -> Vec<Step> {
    vec![
        step("a", "Receive invoice", Layer::Human, 40, "Alice"),
        step("b", "Validate totals", Layer::Cell, 80, "Bob").depends_on("a"),
        step("c", "Approve payment", Layer::Human, 60, "Charlie"),
    ]
}

pub fn invoice_gaps() -> Vec<Gap> {
    vec![
        gap(GapType::Bottleneck, Severity::High, &["a"], "Invoices queue at intake"),
        gap(
            GapType::SingleDependency,
            Severity::Medium,
            &["b"],
            "Only Bob validates totals",
        ),
    ]
}

pub fn invoice_decomposition(health: HealthMetrics) -> Decomposition {
    Decomposition {
        id: "invoice".to_string(),
        title: "Invoice approval".to_string(),
        steps: invoice_steps(),
        gaps: invoice_gaps(),
        health,
    }
}

/// Model response text for the invoice flow, wrapped in a code fence
pub fn invoice_response() -> String {
    let payload = serde_json::json!({
        "title": "Invoice approval",
        "steps": invoice_steps(),
        "gaps": invoice_gaps(),
    });
    format!("Here is the workflow:\n```json\n{payload:#}\n```")
}

/// Completion source that replays scripted responses and counts calls
///
/// Once the script runs out, the last response repeats.
#[derive(Debug)]
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Source whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Err(message.into())])),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Option<Result<String, String>> {
        let mut last = self.last.lock();
        if let Some(next) = self.responses.lock().pop_front() {
            *last = Some(next);
        }
        last.clone()
    }
}

#[async_trait]
impl CompletionSource for ScriptedCompletion {
    async fn complete(
        &self,
        _request: &AnalysisRequest,
        _prompt_version: &str,
    ) -> Result<Completion, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_response() {
            Some(Ok(text)) => Ok(Completion::new(text, TEST_MODEL_ID).with_tokens(1000, 400)),
            Some(Err(message)) => Err(CompletionError::Failed(message)),
            None => Err(CompletionError::EmptyResponse),
        }
    }
}
