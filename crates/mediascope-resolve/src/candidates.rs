//! Candidate extraction: the normalized titles a record can be matched on.

use std::collections::HashSet;

use mediascope_core::{MatchConfig, TitledRecord, TitlePriority};
use serde::{Deserialize, Serialize};

use crate::normalize::normalize_title;

/// One comparable title of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCandidate {
    /// Normalized key, never empty.
    pub key: String,
    pub priority: TitlePriority,
    /// Trimmed source text the key came from, for display.
    pub text: String,
}

/// Extract candidates with the default separators.
pub fn extract_candidates<R: TitledRecord + ?Sized>(record: &R) -> Vec<TitleCandidate> {
    extract_with(record, &MatchConfig::default())
}

/// Extract `(key, priority)` candidates from every populated title field.
///
/// Alternate fields are split on the configured separators first, since one
/// field commonly packs several titles. Keys that normalize to nothing are
/// dropped, and a key seen on several fields keeps its most trusted priority.
/// Output is ordered by priority.
pub fn extract_with<R: TitledRecord + ?Sized>(
    record: &R,
    config: &MatchConfig,
) -> Vec<TitleCandidate> {
    let mut candidates: Vec<TitleCandidate> = Vec::new();

    for field in record.title_fields() {
        if field.priority == TitlePriority::Alternate {
            for part in field.text.split(|c: char| config.is_alternate_separator(c)) {
                push_candidate(&mut candidates, part, field.priority);
            }
        } else {
            push_candidate(&mut candidates, &field.text, field.priority);
        }
    }

    candidates.sort_by_key(|c| c.priority);

    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.key.clone()));
    candidates
}

fn push_candidate(candidates: &mut Vec<TitleCandidate>, text: &str, priority: TitlePriority) {
    let text = text.trim();
    let key = normalize_title(text);
    if key.is_empty() {
        return;
    }
    candidates.push(TitleCandidate {
        key,
        priority,
        text: text.to_string(),
    });
}
