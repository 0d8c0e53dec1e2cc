//! Decomp Model
//!
//! Typed workflow decompositions and the values derived from them.
//!
//! # Core Concepts
//!
//! - [`Step`]: a unit of work with a [`Layer`], owner and dependencies
//! - [`Gap`]: a structural deficiency attached to one or more steps
//! - [`HealthMetrics`]: four 0–100 composite scores
//! - [`Decomposition`]: the repaired graph handed to callers
//! - [`CompareResult`]: the change report between two decompositions
//! - [`AnalysisHash`]: 16-hex-character cache key
//!
//! # Example
//!
//! ```rust
//! use decomp_model::{Layer, Step};
//!
//! let step = Step::new("step_1", "Collect invoices")
//!     .with_layer(Layer::Integration)
//!     .with_automation_score(70);
//!
//! assert_eq!(step.layer, Layer::Integration);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod compare;
mod decomposition;
mod gap;
mod hash;
mod health;
mod step;

// Re-exports
pub use compare::{CompareResult, HealthDelta, MatchScore, ModifiedStep, StepField, UnchangedStep};
pub use decomposition::{AnalysisMeta, AnalysisOutput, Decomposition};
pub use gap::{Gap, GapType, Severity, UnknownGapType, UnknownSeverity};
pub use hash::{AnalysisHash, HashError, ANALYSIS_HASH_LEN};
pub use health::{ConfidenceLevel, HealthConfidence, HealthMetrics};
pub use step::{Layer, Step, UnknownLayer, UNASSIGNED_OWNER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
