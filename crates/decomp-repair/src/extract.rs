//! JSON extraction from free-text model responses
//!
//! Tries progressively looser strategies until one yields a JSON object.

use crate::error::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").expect("valid fence regex"));
static FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?[ \t]*```$").expect("valid fence regex"));
static OBJECT_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid span regex"));

/// Extraction strategies in the order they are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Strip a surrounding code fence
    Fenced,
    /// The whole response as-is
    Raw,
    /// First `{` through last `}`
    Embedded,
}

impl Strategy {
    const ALL: [Strategy; 3] = [Strategy::Fenced, Strategy::Raw, Strategy::Embedded];

    fn name(self) -> &'static str {
        match self {
            Self::Fenced => "fenced",
            Self::Raw => "raw",
            Self::Embedded => "embedded",
        }
    }

    fn candidate(self, raw: &str) -> Option<&str> {
        match self {
            Self::Fenced => strip_fence(raw),
            Self::Raw => Some(raw),
            Self::Embedded => OBJECT_SPAN.find(raw).map(|m| m.as_str()),
        }
    }
}

/// Remove a leading and/or trailing code fence
///
/// Returns `None` when the text carries no fence at all.
fn strip_fence(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let mut body = trimmed;
    if let Some(m) = FENCE_OPEN.find(body) {
        body = &body[m.end()..];
    }
    if let Some(m) = FENCE_CLOSE.find(body) {
        body = &body[..m.start()];
    }
    (body.len() != trimmed.len()).then(|| body.trim())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extract a JSON object from a model response
///
/// # Errors
/// - [`ExtractionError::NoJson`] when no strategy parses
/// - [`ExtractionError::NotAnObject`] when JSON was found but none of it is
///   an object
pub fn extract_json(raw: &str) -> Result<Map<String, Value>, ExtractionError> {
    let mut non_object = None;

    for strategy in Strategy::ALL {
        let Some(candidate) = strategy.candidate(raw) else {
            continue;
        };

        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => {
                tracing::debug!(strategy = strategy.name(), keys = map.len(), "extracted JSON object");
                return Ok(map);
            }
            Ok(other) => {
                tracing::debug!(strategy = strategy.name(), kind = value_kind(&other), "parsed JSON is not an object");
                non_object.get_or_insert(value_kind(&other));
            }
            Err(e) => {
                tracing::trace!(strategy = strategy.name(), error = %e, "extraction attempt failed");
            }
        }
    }

    Err(match non_object {
        Some(found) => ExtractionError::NotAnObject { found },
        None => ExtractionError::NoJson {
            attempts: Strategy::ALL.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json() {
        let map = extract_json(r#"{"title": "x"}"#).unwrap();
        assert_eq!(map["title"], "x");
    }

    #[test]
    fn fenced_json_with_language_tag() {
        let raw = "```json\n{\"title\": \"fenced\"}\n```";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["title"], "fenced");
    }

    #[test]
    fn fenced_json_without_language_tag_and_padding() {
        let raw = "  \n```\n{\"title\": \"bare\"}\n```\n  ";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["title"], "bare");
    }

    #[test]
    fn embedded_in_prose() {
        let raw = "Sure! Here is the decomposition: {\"title\": \"prose\", \"steps\": [{\"id\": \"a\"}]} Hope it helps.";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["title"], "prose");
    }

    #[test]
    fn fence_after_preamble_falls_back_to_embedded() {
        let raw = "Result:\n```json\n{\"title\": \"late fence\"}\n```";
        let map = extract_json(raw).unwrap();
        assert_eq!(map["title"], "late fence");
    }

    #[test]
    fn no_json_at_all() {
        let err = extract_json("I could not produce a workflow.").unwrap_err();
        assert_eq!(err, ExtractionError::NoJson { attempts: 3 });
        assert!(err.to_string().contains("Could not extract JSON"));
    }

    #[test]
    fn unbalanced_braces() {
        let err = extract_json("{\"title\": \"oops\"").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn array_is_not_an_object() {
        let err = extract_json("[1, 2, 3]").unwrap_err();
        assert_eq!(err, ExtractionError::NotAnObject { found: "array" });
    }

    #[test]
    fn array_wrapping_an_object_yields_the_object() {
        let map = extract_json(r#"[{"title": "inner"}]"#).unwrap();
        assert_eq!(map["title"], "inner");
    }

    #[test]
    fn strip_fence_none_without_fence() {
        assert_eq!(strip_fence("{\"a\":1}"), None);
        assert_eq!(strip_fence("```\n{}\n```"), Some("{}"));
    }
}
