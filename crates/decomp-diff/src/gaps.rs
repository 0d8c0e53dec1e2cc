//! Gap matching by fingerprint

use decomp_model::Gap;
use std::collections::HashSet;

/// Keywords kept per fingerprint
pub const FINGERPRINT_WORDS: usize = 8;

/// Gap-level outcome of a comparison
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapChanges {
    /// Only in "before"
    pub resolved: Vec<Gap>,
    /// Only in "after"
    pub new: Vec<Gap>,
    /// In both, reported as the "after" version
    pub persistent: Vec<Gap>,
}

/// `type:kw1,kw2,...` digest of a gap
///
/// Keywords are the first eight words longer than three characters in the
/// lower-cased description with punctuation removed, sorted alphabetically.
#[must_use]
pub fn fingerprint(gap: &Gap) -> String {
    let cleaned: String = gap
        .description
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut keywords: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .take(FINGERPRINT_WORDS)
        .collect();
    keywords.sort_unstable();

    format!("{}:{}", gap.gap_type, keywords.join(","))
}

/// Classify gaps into resolved, new and persistent
#[must_use]
pub fn diff_gaps(before: &[Gap], after: &[Gap]) -> GapChanges {
    let before_prints: HashSet<String> = before.iter().map(fingerprint).collect();
    let after_prints: HashSet<String> = after.iter().map(fingerprint).collect();

    let mut changes = GapChanges::default();
    for gap in before {
        if !after_prints.contains(&fingerprint(gap)) {
            changes.resolved.push(gap.clone());
        }
    }
    for gap in after {
        if before_prints.contains(&fingerprint(gap)) {
            changes.persistent.push(gap.clone());
        } else {
            changes.new.push(gap.clone());
        }
    }
    changes
}
