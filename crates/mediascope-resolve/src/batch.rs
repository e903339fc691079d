//! Batch resolution of an import against one corpus snapshot.

use mediascope_core::{LibraryEntry, TitledRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::policy::{MergeDecision, NearMiss, decide};
use crate::resolver::{MatchResult, Resolver};

/// Outcome for one incoming record, by position in the import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub index: usize,
    pub matched: Option<MatchResult>,
    pub decision: MergeDecision,
}

impl Resolver {
    /// Resolve every incoming record against the same `corpus`.
    ///
    /// Records are independent of each other, so they are matched in
    /// parallel. Output order follows `incoming`. Records created by this
    /// batch are not visible to later records of the same batch.
    pub fn resolve_batch<I, L>(&self, incoming: &[I], corpus: &[L]) -> Vec<Resolution>
    where
        I: TitledRecord + Sync,
        L: LibraryEntry + Sync,
    {
        let resolutions: Vec<Resolution> = incoming
            .par_iter()
            .enumerate()
            .map(|(index, record)| {
                let matched = self.resolve(record, corpus);
                let decision = decide(record, matched.as_ref());
                Resolution {
                    index,
                    matched,
                    decision,
                }
            })
            .collect();

        let report = ImportReport::from_resolutions(&resolutions);
        info!(
            total = report.total,
            auto_merged = report.auto_merged,
            review_suggested = report.review_suggested,
            created = report.created,
            near_misses = report.near_misses.len(),
            "import batch resolved"
        );
        resolutions
    }
}

/// Resolve a batch with the default configuration.
pub fn resolve_batch<I, L>(incoming: &[I], corpus: &[L]) -> Vec<Resolution>
where
    I: TitledRecord + Sync,
    L: LibraryEntry + Sync,
{
    Resolver::new().resolve_batch(incoming, corpus)
}

/// Counts per decision for a resolved batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total: usize,
    pub auto_merged: usize,
    pub review_suggested: usize,
    /// Includes records blocked by an identifier conflict.
    pub created: usize,
    pub near_misses: Vec<NearMiss>,
}

impl ImportReport {
    pub fn from_resolutions(resolutions: &[Resolution]) -> Self {
        let mut report = Self {
            total: resolutions.len(),
            ..Default::default()
        };
        for resolution in resolutions {
            match &resolution.decision {
                MergeDecision::AutoMerge { .. } => report.auto_merged += 1,
                MergeDecision::ReviewSuggested { .. } => report.review_suggested += 1,
                MergeDecision::CreateNew { near_miss } => {
                    report.created += 1;
                    if let Some(near_miss) = near_miss {
                        report.near_misses.push(near_miss.clone());
                    }
                }
            }
        }
        report
    }
}
