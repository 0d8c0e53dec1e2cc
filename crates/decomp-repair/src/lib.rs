//! Decomp Repair Layer
//!
//! The trusted boundary between untrusted model output and the typed
//! decomposition model.
//!
//! # Core Operations
//!
//! - **Extract**: pull a JSON object out of free text
//! - **Validate**: check the object against the expected shape, recovering
//!   field by field when it does not fit
//! - **Enforce**: dedup step ids, prune dangling and self dependencies, break
//!   dependency cycles
//!
//! # Architecture
//!
//! ```text
//! raw text → extract_json → validate_or_recover → enforce_integrity → DecompositionDraft
//!                                  ↓
//!                         Valid | Recovered { reason }
//! ```
//!
//! # Example
//!
//! ```rust
//! use decomp_repair::{enforce_integrity, extract_json, validate_or_recover};
//!
//! let raw = "```json\n{\"title\":\"T\",\"steps\":[],\"gaps\":[]}\n```";
//! let object = extract_json(raw).unwrap();
//! let validated = validate_or_recover(object, "Fallback");
//! assert!(!validated.is_partial());
//!
//! let (draft, report) = enforce_integrity(validated.into_draft());
//! assert!(report.is_clean());
//! assert_eq!(draft.title, "T");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod extract;
pub mod integrity;
pub mod schema;

// Re-exports for convenience
pub use error::ExtractionError;
pub use extract::extract_json;
pub use integrity::{enforce_integrity, DependencyEdge, DependencyGraph, IntegrityReport};
pub use schema::{validate_or_recover, DecompositionDraft, Validated};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the repair layer
    pub use crate::error::ExtractionError;
    pub use crate::extract::extract_json;
    pub use crate::integrity::{enforce_integrity, DependencyGraph, IntegrityReport};
    pub use crate::schema::{validate_or_recover, DecompositionDraft, Validated};
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn fenced_payload_with_cycle_comes_out_acyclic() {
        let raw = r#"Here you go:
```json
{
  "title": "Invoice approval",
  "steps": [
    {"id": "a", "name": "Receive", "layer": "human", "automationScore": 20, "dependencies": ["c"]},
    {"id": "b", "name": "Check", "layer": "cell", "automationScore": 70, "dependencies": ["a"]},
    {"id": "c", "name": "Approve", "layer": "human", "automationScore": 10, "dependencies": ["b"]}
  ],
  "gaps": []
}
```"#;

        let object = extract_json(raw).unwrap();
        let validated = validate_or_recover(object, "Fallback");
        assert!(!validated.is_partial());

        let (draft, report) = enforce_integrity(validated.into_draft());
        assert_eq!(report.cycle_edges_removed.len(), 1);
        assert!(DependencyGraph::from_steps(&draft.steps).topological_order().is_some());
    }

    #[test]
    fn garbage_text_fails_extraction() {
        let err = extract_json("no json to be found").unwrap_err();
        assert!(err.to_string().starts_with("Could not extract JSON"));
    }
}
