//! Similarity between two normalized keys.
//!
//! Two independent measures: a global edit-distance percentage used for
//! ranking and display, and a prefix run used as the gate for fuzzy matches.

use serde::{Deserialize, Serialize};

/// Shared-prefix length from which two keys count as a strict match.
pub const STRICT_PREFIX_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// Edit-distance similarity in percent, rounded to two decimals.
    pub similarity: f64,
    /// Identical characters from index 0 up to the first divergence.
    pub consecutive_count: usize,
    pub is_strict_match: bool,
}

/// Levenshtein distance over characters, unit cost for every operation.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// `(longest - distance) / longest * 100`, rounded to two decimals.
///
/// Two empty keys score 100, one empty key against a non-empty one scores 0.
pub fn similarity_percent(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = edit_distance(a, b);
    round2((longest - distance) as f64 / longest as f64 * 100.0)
}

/// Count of identical characters scanning from the start, stopping at the
/// first mismatch. No resynchronisation after a gap.
pub fn consecutive_prefix_match(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Score two keys with the default strict-prefix length.
pub fn score_similarity(a: &str, b: &str) -> SimilarityScore {
    score_with_prefix(a, b, STRICT_PREFIX_LENGTH)
}

/// Score two keys; `is_strict_match` holds iff the shared prefix reaches
/// `strict_prefix_length`. Global similarity never gates the match.
pub fn score_with_prefix(a: &str, b: &str, strict_prefix_length: usize) -> SimilarityScore {
    let consecutive_count = consecutive_prefix_match(a, b);
    SimilarityScore {
        similarity: similarity_percent(a, b),
        consecutive_count,
        is_strict_match: consecutive_count >= strict_prefix_length.max(1),
    }
}

pub fn is_strict_match(a: &str, b: &str) -> bool {
    consecutive_prefix_match(a, b) >= STRICT_PREFIX_LENGTH
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
