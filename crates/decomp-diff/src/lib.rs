//! Decomp Diff Engine
//!
//! Compares two decompositions of the same workflow.
//!
//! # How Matching Works
//!
//! - **Steps** are paired greedily by a weighted name and position score
//!   (see [`similarity`]); pairs are then compared field by field
//! - **Gaps** are paired by a type-plus-keywords [`fingerprint`]
//! - **Health** is compared metric by metric
//!
//! # Example
//!
//! ```rust
//! use decomp_diff::compare;
//! use decomp_model::{Decomposition, Step};
//!
//! let mut before = Decomposition::empty("d1", "Payroll");
//! before.steps.push(Step::new("a", "Collect timesheets"));
//!
//! let report = compare(&before, &before);
//! assert_eq!(report.summary, "No significant changes detected.");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod gaps;
pub mod similarity;
pub mod steps;
pub mod summary;

pub use gaps::{diff_gaps, fingerprint, GapChanges};
pub use steps::{diff_steps, match_steps, StepChanges, StepMatch, MATCH_THRESHOLD};
pub use summary::{summarize, SummaryInput, NO_CHANGES};

use decomp_model::{CompareResult, Decomposition, HealthDelta};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compare a "before" and an "after" decomposition
#[must_use]
pub fn compare(before: &Decomposition, after: &Decomposition) -> CompareResult {
    let steps = diff_steps(&before.steps, &after.steps);
    let gaps = diff_gaps(&before.gaps, &after.gaps);
    let health_delta = HealthDelta::between(&before.health, &after.health);

    let summary = summarize(&SummaryInput {
        gaps_resolved: gaps.resolved.len(),
        gaps_new: gaps.new.len(),
        steps_added: steps.added.len(),
        steps_removed: steps.removed.len(),
        health_delta,
    });

    tracing::info!(
        before = %before.id,
        after = %after.id,
        added = steps.added.len(),
        removed = steps.removed.len(),
        modified = steps.modified.len(),
        gaps_resolved = gaps.resolved.len(),
        gaps_new = gaps.new.len(),
        "compared decompositions"
    );

    CompareResult {
        steps_added: steps.added,
        steps_removed: steps.removed,
        steps_modified: steps.modified,
        steps_unchanged: steps.unchanged,
        gaps_resolved: gaps.resolved,
        gaps_new: gaps.new,
        gaps_persistent: gaps.persistent,
        health_delta,
        summary,
    }
}
