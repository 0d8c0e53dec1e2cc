//! String and position similarity measures used to pair steps
//!
//! Every measure returns a value in `0.0..=1.0`.

use std::collections::HashSet;

/// Weight of the edit-distance term
pub const LEVENSHTEIN_WEIGHT: f64 = 0.4;
/// Weight of the word-overlap term
pub const JACCARD_WEIGHT: f64 = 0.4;
/// Weight of the relative-position term
pub const POSITION_WEIGHT: f64 = 0.2;

/// `1 - distance / max(len)`, 1.0 when both strings are empty
#[must_use]
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}

/// Character edit distance
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // single rolling row
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b.len()]
}

/// Intersection over union of lower-cased whitespace-separated words
///
/// 1.0 when both are empty, 0.0 when exactly one is.
#[must_use]
pub fn jaccard_word_similarity(a: &str, b: &str) -> f64 {
    let words = |s: &str| -> HashSet<String> { s.split_whitespace().map(str::to_lowercase).collect() };
    let (a, b) = (words(a), words(b));

    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let shared = a.intersection(&b).count() as f64;
            let union = a.union(&b).count() as f64;
            shared / union
        }
    }
}

/// Relative position of `index` within a list of `count` items
///
/// 0.5 for a single-item list.
#[must_use]
pub fn relative_position(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.5
    } else {
        index as f64 / (count - 1) as f64
    }
}

/// `1 - |a - b|` over relative positions
#[must_use]
pub fn position_similarity(a: f64, b: f64) -> f64 {
    (1.0 - (a - b).abs()).clamp(0.0, 1.0)
}

/// Weighted match score for two step names at given relative positions
///
/// Edit distance runs over the names as written; only the word-overlap term
/// ignores case.
#[must_use]
pub fn name_match_score(before: &str, after: &str, before_pos: f64, after_pos: f64) -> f64 {
    LEVENSHTEIN_WEIGHT * levenshtein_similarity(before, after)
        + JACCARD_WEIGHT * jaccard_word_similarity(before, after)
        + POSITION_WEIGHT * position_similarity(before_pos, after_pos)
}
