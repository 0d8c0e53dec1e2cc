//! Greedy step matching between two decompositions

use crate::similarity::{name_match_score, relative_position};
use decomp_model::{MatchScore, ModifiedStep, Step, StepField, UnchangedStep};

/// Minimum score for two steps to count as the same step
pub const MATCH_THRESHOLD: f64 = 0.55;

/// Step-level outcome of a comparison
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepChanges {
    pub added: Vec<Step>,
    pub removed: Vec<Step>,
    pub modified: Vec<ModifiedStep>,
    pub unchanged: Vec<UnchangedStep>,
}

/// A paired `(before, after)` index with its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepMatch {
    pub before: usize,
    pub after: usize,
    pub score: f64,
}

/// Pair `after` steps with `before` steps
///
/// Walks `after` in order and takes the best unclaimed `before` candidate
/// scoring at least [`MATCH_THRESHOLD`]. Earlier candidates win ties. The
/// assignment is first-come, not globally optimal.
#[must_use]
pub fn match_steps(before: &[Step], after: &[Step]) -> Vec<StepMatch> {
    let mut claimed = vec![false; before.len()];
    let mut matches = Vec::new();

    for (after_idx, after_step) in after.iter().enumerate() {
        let after_pos = relative_position(after_idx, after.len());
        let mut best: Option<StepMatch> = None;

        for (before_idx, before_step) in before.iter().enumerate() {
            if claimed[before_idx] {
                continue;
            }
            let score = name_match_score(
                &before_step.name,
                &after_step.name,
                relative_position(before_idx, before.len()),
                after_pos,
            );
            tracing::trace!(before = %before_step.id, after = %after_step.id, score, "scored step pair");

            if score >= MATCH_THRESHOLD && best.map_or(true, |b| score > b.score) {
                best = Some(StepMatch {
                    before: before_idx,
                    after: after_idx,
                    score,
                });
            }
        }

        if let Some(found) = best {
            claimed[found.before] = true;
            matches.push(found);
        }
    }

    matches
}

/// Fields that differ between two matched steps, in comparison order
#[must_use]
pub fn changed_fields(before: &Step, after: &Step) -> Vec<StepField> {
    StepField::ALL
        .into_iter()
        .filter(|field| field.differs(before, after))
        .collect()
}

/// Classify steps into added, removed, modified and unchanged
#[must_use]
pub fn diff_steps(before: &[Step], after: &[Step]) -> StepChanges {
    let matches = match_steps(before, after);

    let mut matched_before = vec![false; before.len()];
    let mut matched_after = vec![false; after.len()];
    let mut changes = StepChanges::default();

    for m in &matches {
        matched_before[m.before] = true;
        matched_after[m.after] = true;

        let (old, new) = (&before[m.before], &after[m.after]);
        let fields = changed_fields(old, new);
        if fields.is_empty() {
            changes.unchanged.push(UnchangedStep {
                before_id: old.id.clone(),
                after: new.clone(),
            });
        } else {
            tracing::debug!(before = %old.id, after = %new.id, fields = fields.len(), "step modified");
            changes.modified.push(ModifiedStep {
                before: old.clone(),
                after: new.clone(),
                changed_fields: fields,
                similarity: to_match_score(m.score),
            });
        }
    }

    changes.added = after
        .iter()
        .zip(&matched_after)
        .filter(|(_, &matched)| !matched)
        .map(|(step, _)| step.clone())
        .collect();
    changes.removed = before
        .iter()
        .zip(&matched_before)
        .filter(|(_, &matched)| !matched)
        .map(|(step, _)| step.clone())
        .collect();

    changes
}

fn to_match_score(score: f64) -> MatchScore {
    // score is within 0.0..=1.0
    (score.clamp(0.0, 1.0) * 1000.0).round() as MatchScore
}
