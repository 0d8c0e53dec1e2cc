//! Error types for the repair layer
//!
//! Only extraction can fail. Schema problems and referential problems are
//! repaired in place and reported, never raised.

/// Errors while pulling a JSON object out of model output
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// No attempt produced parseable JSON
    #[error("Could not extract JSON from model response ({attempts} attempts failed)")]
    NoJson {
        /// Number of strategies tried
        attempts: usize,
    },

    /// JSON was found but it is not an object
    #[error("Could not extract JSON object: response contained a JSON {found}")]
    NotAnObject {
        /// Kind of JSON value found
        found: &'static str,
    },
}

impl ExtractionError {
    /// Whether the pipeline can degrade to an empty decomposition
    ///
    /// A response with no JSON at all is degraded; a response whose JSON is
    /// the wrong kind of value is reported to the caller.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoJson { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverability() {
        assert!(ExtractionError::NoJson { attempts: 3 }.is_recoverable());
        assert!(!ExtractionError::NotAnObject { found: "array" }.is_recoverable());
    }

    #[test]
    fn messages_mention_extraction() {
        let msg = ExtractionError::NotAnObject { found: "number" }.to_string();
        assert!(msg.contains("Could not extract"));
        assert!(msg.contains("number"));
    }
}
