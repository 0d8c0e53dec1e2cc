//! Decomp Health Scoring
//!
//! Team-calibrated health metrics for a repaired step graph.
//!
//! # Metrics
//!
//! | Metric | Meaning |
//! |--------|---------|
//! | `complexity` | size and wiring of the graph |
//! | `fragility` | weighted gap severity, scaled by team tier |
//! | `automationPotential` | mean automation score |
//! | `teamLoadBalance` | evenness of work across owners |
//!
//! Every metric is an integer in `0..=100`.
//!
//! # Example
//!
//! ```rust
//! use decomp_health::score;
//! use decomp_model::{Gap, GapType, Severity, Step};
//!
//! let steps = vec![Step::new("a", "Intake").with_automation_score(50)];
//! let gaps = vec![Gap::new(GapType::Bottleneck, Severity::High, vec!["a".into()])];
//!
//! assert_eq!(score(&steps, &gaps, Some(1)).fragility, 36);
//! assert_eq!(score(&steps, &gaps, Some(40)).fragility, 16);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod calibration;
pub mod scoring;

pub use calibration::{thresholds, TeamThresholds, TeamTier};
pub use scoring::{score, score_with_breakdown, HealthReport, MAX_SCORE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
