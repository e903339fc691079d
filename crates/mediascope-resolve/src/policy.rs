//! Turns a match into an import action.

use mediascope_core::{ExternalId, RecordId, TitledRecord, ids_conflict};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::resolver::{MatchMethod, MatchResult};

/// An exact title match vetoed because both sides carry different external
/// ids. Kept so a human can look at it instead of losing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearMiss {
    pub record_id: RecordId,
    pub matched_title: String,
    pub incoming_external_id: ExternalId,
    pub existing_external_id: ExternalId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum MergeDecision {
    /// Update the existing record.
    AutoMerge { record_id: RecordId },
    /// Create a new record, but keep the suggestion for manual linking.
    ReviewSuggested {
        record_id: RecordId,
        similarity: f64,
        matched_title: String,
    },
    /// Create a new record. `near_miss` is set when an identifier conflict
    /// blocked an otherwise exact match.
    CreateNew {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        near_miss: Option<NearMiss>,
    },
}

impl MergeDecision {
    pub fn create_new() -> Self {
        Self::CreateNew { near_miss: None }
    }

    pub fn is_auto_merge(&self) -> bool {
        matches!(self, Self::AutoMerge { .. })
    }

    pub fn is_create_new(&self) -> bool {
        matches!(self, Self::CreateNew { .. })
    }

    /// Record the caller should offer for manual linking, if any.
    pub fn review_target(&self) -> Option<RecordId> {
        match self {
            Self::ReviewSuggested { record_id, .. } => Some(*record_id),
            Self::CreateNew {
                near_miss: Some(near_miss),
            } => Some(near_miss.record_id),
            _ => None,
        }
    }

    pub fn near_miss(&self) -> Option<&NearMiss> {
        match self {
            Self::CreateNew { near_miss } => near_miss.as_ref(),
            _ => None,
        }
    }
}

/// Decide what the import driver should do with `incoming`.
///
/// - no match: create
/// - external id match: merge
/// - trusted exact title: merge, unless both records carry different
///   external ids, which proves two distinct works
/// - anything else: create and suggest the match for review
pub fn decide<I: TitledRecord + ?Sized>(incoming: &I, matched: Option<&MatchResult>) -> MergeDecision {
    let Some(matched) = matched else {
        return MergeDecision::create_new();
    };

    match matched.match_method {
        MatchMethod::ExternalId => MergeDecision::AutoMerge {
            record_id: matched.matched_record_id,
        },
        MatchMethod::TitleExact
            if matched.is_exact && matched.matched_priority.allows_auto_merge() =>
        {
            let incoming_id = incoming.external_id();
            if let (Some(incoming_external_id), Some(existing_external_id)) =
                (incoming_id, matched.matched_external_id)
                && ids_conflict(incoming_id, matched.matched_external_id)
            {
                warn!(
                    record = %matched.matched_record_id,
                    incoming_external_id,
                    existing_external_id,
                    title = %matched.matched_title,
                    "external id conflict, refusing exact title merge"
                );
                return MergeDecision::CreateNew {
                    near_miss: Some(NearMiss {
                        record_id: matched.matched_record_id,
                        matched_title: matched.matched_title.clone(),
                        incoming_external_id,
                        existing_external_id,
                    }),
                };
            }
            MergeDecision::AutoMerge {
                record_id: matched.matched_record_id,
            }
        }
        MatchMethod::TitleExact | MatchMethod::TitleSimilarity => MergeDecision::ReviewSuggested {
            record_id: matched.matched_record_id,
            similarity: matched.similarity,
            matched_title: matched.matched_title.clone(),
        },
    }
}
