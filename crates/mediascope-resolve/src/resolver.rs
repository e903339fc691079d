//! Three-tier match search of one incoming record against a corpus snapshot.
//!
//! Tiers run in order and the first one that produces a hit wins:
//! 1. external identifier equality
//! 2. exact normalized title, when the agreeing corpus field is trusted enough
//! 3. fuzzy title (strict prefix + similarity threshold), which also picks up
//!    exact agreements demoted from tier 2

use std::cmp::Ordering;

use mediascope_core::{
    ExternalId, LibraryEntry, MatchConfig, RecordId, TitlePriority, TitledRecord,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::candidates::{TitleCandidate, extract_with};
use crate::similarity::{SimilarityScore, score_with_prefix};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    ExternalId,
    TitleExact,
    TitleSimilarity,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExternalId => write!(f, "external_id"),
            Self::TitleExact => write!(f, "title_exact"),
            Self::TitleSimilarity => write!(f, "title_similarity"),
        }
    }
}

/// Best match found for an incoming record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_record_id: RecordId,
    /// Exact match eligible for automatic merging.
    pub is_exact: bool,
    pub similarity: f64,
    pub consecutive_count: usize,
    /// Corpus-side title that produced the match.
    pub matched_title: String,
    /// Priority of the corpus field that produced the match.
    pub matched_priority: TitlePriority,
    pub match_method: MatchMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_external_id: Option<ExternalId>,
}

/// Ranking key of a fuzzy-tier hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyRank {
    pub priority: TitlePriority,
    pub consecutive_count: usize,
    pub similarity: f64,
}

impl FuzzyRank {
    /// `Less` means `self` is preferred: more trusted corpus field, then
    /// longer shared prefix, then higher similarity.
    pub fn preference(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.consecutive_count.cmp(&self.consecutive_count))
            .then_with(|| other.similarity.total_cmp(&self.similarity))
    }
}

/// Corpus records eligible for an incoming record carrying `hint`.
///
/// Records whose category is set and differs from the hint are skipped;
/// uncategorized records stay eligible.
pub fn prefilter<'a, L: LibraryEntry>(hint: Option<&str>, corpus: &'a [L]) -> Vec<&'a L> {
    match hint {
        None => corpus.iter().collect(),
        Some(hint) => corpus
            .iter()
            .filter(|record| record.category().is_none_or(|c| c == hint))
            .collect(),
    }
}

struct Pair<'a, L> {
    record: &'a L,
    existing: &'a TitleCandidate,
    incoming: &'a TitleCandidate,
}

struct FuzzyHit<'a, L> {
    pair: Pair<'a, L>,
    score: SimilarityScore,
    exact: bool,
}

impl<L> FuzzyHit<'_, L> {
    fn rank(&self) -> FuzzyRank {
        FuzzyRank {
            priority: self.pair.existing.priority,
            consecutive_count: self.score.consecutive_count,
            similarity: self.score.similarity,
        }
    }
}

/// Resolves incoming records against a corpus snapshot. Holds no state
/// besides its configuration, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: MatchConfig,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Find the single best match for `incoming` in `corpus`, or `None`.
    pub fn resolve<I, L>(&self, incoming: &I, corpus: &[L]) -> Option<MatchResult>
    where
        I: TitledRecord + ?Sized,
        L: LibraryEntry,
    {
        let eligible = if self.config.category_prefilter {
            prefilter(incoming.category(), corpus)
        } else {
            corpus.iter().collect()
        };
        trace!(
            eligible = eligible.len(),
            total = corpus.len(),
            "corpus prefiltered"
        );

        if let Some(hit) = self.match_external_id(incoming, &eligible) {
            return Some(hit);
        }

        let incoming_candidates = extract_with(incoming, &self.config);
        if incoming_candidates.is_empty() {
            return None;
        }
        let indexed: Vec<(&L, Vec<TitleCandidate>)> = eligible
            .into_iter()
            .map(|record| (record, extract_with(record, &self.config)))
            .collect();

        if let Some(hit) = self.match_exact_title(&indexed, &incoming_candidates) {
            return Some(hit);
        }

        self.match_fuzzy_title(&indexed, &incoming_candidates)
    }

    fn match_external_id<I, L>(&self, incoming: &I, eligible: &[&L]) -> Option<MatchResult>
    where
        I: TitledRecord + ?Sized,
        L: LibraryEntry,
    {
        let external_id = incoming.external_id()?;
        let record = eligible
            .iter()
            .find(|record| record.external_id() == Some(external_id))?;

        // No title comparison here; report the record's most trusted title for display.
        let display = extract_with(*record, &self.config).into_iter().next();
        let result = MatchResult {
            matched_record_id: record.record_id(),
            is_exact: true,
            similarity: 100.0,
            consecutive_count: 0,
            matched_title: display.as_ref().map(|c| c.text.clone()).unwrap_or_default(),
            matched_priority: display.map_or(TitlePriority::Romanized, |c| c.priority),
            match_method: MatchMethod::ExternalId,
            matched_external_id: Some(external_id),
        };
        debug!(record = %result.matched_record_id, external_id, "matched on external id");
        Some(result)
    }

    fn match_exact_title<L: LibraryEntry>(
        &self,
        indexed: &[(&L, Vec<TitleCandidate>)],
        incoming: &[TitleCandidate],
    ) -> Option<MatchResult> {
        let best = candidate_pairs(indexed, incoming)
            .filter(|pair| pair.existing.key == pair.incoming.key)
            .reduce(|current, pair| {
                if pair.existing.priority < current.existing.priority {
                    pair
                } else {
                    current
                }
            })?;

        if !self.config.auto_merges_on(best.existing.priority) {
            debug!(
                record = %best.record.record_id(),
                priority = %best.existing.priority,
                "exact title only on untrusted field, demoted to review"
            );
            return None;
        }

        let result = MatchResult {
            matched_record_id: best.record.record_id(),
            is_exact: true,
            similarity: 100.0,
            consecutive_count: best.existing.key.chars().count(),
            matched_title: best.existing.text.clone(),
            matched_priority: best.existing.priority,
            match_method: MatchMethod::TitleExact,
            matched_external_id: best.record.external_id(),
        };
        debug!(
            record = %result.matched_record_id,
            priority = %result.matched_priority,
            "matched on exact title"
        );
        Some(result)
    }

    fn match_fuzzy_title<L: LibraryEntry>(
        &self,
        indexed: &[(&L, Vec<TitleCandidate>)],
        incoming: &[TitleCandidate],
    ) -> Option<MatchResult> {
        let threshold = self.config.fuzzy_similarity_threshold;
        let prefix = self.config.strict_prefix_length;

        let best = candidate_pairs(indexed, incoming)
            .filter_map(|pair| {
                let score = score_with_prefix(&pair.incoming.key, &pair.existing.key, prefix);
                let exact = pair.incoming.key == pair.existing.key;
                (exact || (score.is_strict_match && score.similarity >= threshold))
                    .then_some(FuzzyHit { pair, score, exact })
            })
            .reduce(|current, hit| {
                if hit.rank().preference(&current.rank()) == Ordering::Less {
                    hit
                } else {
                    current
                }
            })?;

        let result = MatchResult {
            matched_record_id: best.pair.record.record_id(),
            is_exact: false,
            similarity: best.score.similarity,
            consecutive_count: best.score.consecutive_count,
            matched_title: best.pair.existing.text.clone(),
            matched_priority: best.pair.existing.priority,
            match_method: if best.exact {
                MatchMethod::TitleExact
            } else {
                MatchMethod::TitleSimilarity
            },
            matched_external_id: best.pair.record.external_id(),
        };
        debug!(
            record = %result.matched_record_id,
            similarity = result.similarity,
            consecutive = result.consecutive_count,
            "matched on similar title"
        );
        Some(result)
    }
}

/// Every (corpus candidate, incoming candidate) pair, corpus order first.
fn candidate_pairs<'a, L>(
    indexed: &'a [(&'a L, Vec<TitleCandidate>)],
    incoming: &'a [TitleCandidate],
) -> impl Iterator<Item = Pair<'a, L>> + 'a {
    indexed.iter().flat_map(move |(record, existing)| {
        existing.iter().flat_map(move |existing| {
            incoming.iter().map(move |incoming| Pair {
                record: *record,
                existing,
                incoming,
            })
        })
    })
}

/// Resolve with the default configuration.
pub fn resolve<I, L>(incoming: &I, corpus: &[L]) -> Option<MatchResult>
where
    I: TitledRecord + ?Sized,
    L: LibraryEntry,
{
    Resolver::new().resolve(incoming, corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediascope_core::{IncomingRecord, LibraryRecord};
    use uuid::Uuid;

    fn record(id: u128) -> LibraryRecord {
        LibraryRecord::new(Uuid::from_u128(id))
    }

    #[test]
    fn external_id_dominates_titles() {
        let corpus = vec![
            record(1).with_title("Naruto", TitlePriority::Romanized),
            record(2)
                .with_external_id(42)
                .with_title("Completely Different", TitlePriority::Romanized),
        ];
        let incoming = IncomingRecord::new()
            .with_external_id(42)
            .with_title("Naruto", TitlePriority::Display);

        let hit = resolve(&incoming, &corpus).unwrap();
        assert_eq!(hit.match_method, MatchMethod::ExternalId);
        assert_eq!(hit.matched_record_id, Uuid::from_u128(2));
        assert!(hit.is_exact);
        assert_eq!(hit.similarity, 100.0);
        assert_eq!(hit.matched_title, "Completely Different");
    }

    #[test]
    fn unknown_external_id_falls_through_to_titles() {
        let corpus = vec![record(1).with_external_id(7).with_title("Naruto", TitlePriority::Romanized)];
        let incoming = IncomingRecord::new()
            .with_external_id(8)
            .with_title("NARUTO", TitlePriority::Display);

        let hit = resolve(&incoming, &corpus).unwrap();
        assert_eq!(hit.match_method, MatchMethod::TitleExact);
        assert_eq!(hit.matched_external_id, Some(7));
    }

    #[test]
    fn exact_title_on_romanized_field() {
        let corpus = vec![record(1).with_title("Shingeki no Kyojin", TitlePriority::Romanized)];
        let incoming = IncomingRecord::new().with_title("Shingeki no Kyojin", TitlePriority::Display);

        let hit = resolve(&incoming, &corpus).unwrap();
        assert!(hit.is_exact);
        assert_eq!(hit.match_method, MatchMethod::TitleExact);
        assert_eq!(hit.matched_priority, TitlePriority::Romanized);
        assert_eq!(hit.matched_record_id, Uuid::from_u128(1));
    }

    #[test]
    fn exact_title_prefers_most_trusted_corpus_field() {
        let corpus = vec![
            record(1).with_title("Berserk", TitlePriority::Display),
            record(2).with_title("Berserk", TitlePriority::Native),
            record(3).with_title("Berserk", TitlePriority::English),
        ];
        let incoming = IncomingRecord::new().with_title("berserk", TitlePriority::Display);

        let hit = resolve(&incoming, &corpus).unwrap();
        assert_eq!(hit.matched_record_id, Uuid::from_u128(2));
        assert_eq!(hit.matched_priority, TitlePriority::Native);
    }

    #[test]
    fn exact_title_tracks_priority_of_the_field_that_matched() {
        let corpus = vec![
            record(1)
                .with_title("Kimetsu no Yaiba", TitlePriority::Romanized)
                .with_title("Demon Slayer", TitlePriority::English),
        ];
        let incoming = IncomingRecord::new().with_title("Demon Slayer", TitlePriority::Display);

        let hit = resolve(&incoming, &corpus).unwrap();
        assert_eq!(hit.matched_priority, TitlePriority::English);
        assert_eq!(hit.matched_title, "Demon Slayer");
    }

    #[test]
    fn alternate_only_exact_match_is_demoted() {
        let corpus = vec![
            record(1)
                .with_title("Boku no Hero Academia", TitlePriority::Romanized)
                .with_title("BNHA / MHA", TitlePriority::Alternate),
        ];
        let incoming = IncomingRecord::new().with_title("MHA", TitlePriority::Display);

        let hit = resolve(&incoming, &corpus).unwrap();
        assert!(!hit.is_exact);
        assert_eq!(hit.match_method, MatchMethod::TitleExact);
        assert_eq!(hit.matched_priority, TitlePriority::Alternate);
        assert_eq!(hit.matched_title, "MHA");
    }

    #[test]
    fn fuzzy_requires_prefix_and_similarity() {
        let corpus = vec![record(1).with_title("Attack on Titan Season", TitlePriority::English)];

        let close = IncomingRecord::new().with_title("Attack on Titan Season 2", TitlePriority::Display);
        let hit = resolve(&close, &corpus).unwrap();
        assert_eq!(hit.match_method, MatchMethod::TitleSimilarity);
        assert!(!hit.is_exact);
        assert_eq!(hit.similarity, 95.0);
        assert_eq!(hit.consecutive_count, 19);

        // Long shared prefix but too dissimilar overall.
        let far = IncomingRecord::new().with_title("Attack on Titan", TitlePriority::Display);
        let far_corpus = vec![record(2).with_title("Attack on Titan Season 2", TitlePriority::English)];
        assert_eq!(resolve(&far, &far_corpus), None);

        // Similar but diverging in the first characters.
        let shifted = IncomingRecord::new().with_title("Xttack on Titan Season", TitlePriority::Display);
        assert_eq!(resolve(&shifted, &corpus), None);
    }

    #[test]
    fn fuzzy_prefers_trusted_field_over_higher_similarity() {
        let corpus = vec![
            record(1).with_title("Fullmetal Alchemist Brotherhood", TitlePriority::Alternate),
            record(2).with_title("Fullmetal Alchemist Brotherhoo", TitlePriority::Display),
        ];
        let incoming =
            IncomingRecord::new().with_title("Fullmetal Alchemist: Brotherhood!", TitlePriority::English);

        // record 1 is an exact agreement, but on an alternate field
        let hit = resolve(&incoming, &corpus).unwrap();
        assert_eq!(hit.matched_record_id, Uuid::from_u128(2));
        assert_eq!(hit.matched_priority, TitlePriority::Display);
    }

    #[test]
    fn fuzzy_tie_break_prefix_then_similarity() {
        let base = FuzzyRank {
            priority: TitlePriority::English,
            consecutive_count: 10,
            similarity: 80.0,
        };
        let longer_prefix = FuzzyRank {
            consecutive_count: 12,
            similarity: 76.0,
            ..base
        };
        let more_similar = FuzzyRank {
            similarity: 90.0,
            ..base
        };
        let more_trusted = FuzzyRank {
            priority: TitlePriority::Romanized,
            consecutive_count: 5,
            similarity: 75.0,
        };

        assert_eq!(longer_prefix.preference(&base), Ordering::Less);
        assert_eq!(more_similar.preference(&base), Ordering::Less);
        assert_eq!(more_trusted.preference(&longer_prefix), Ordering::Less);
        assert_eq!(base.preference(&base), Ordering::Equal);
    }

    #[test]
    fn fully_tied_fuzzy_hits_keep_first_seen() {
        let corpus = vec![
            record(1).with_title("Spy x Family Code", TitlePriority::English),
            record(2).with_title("Spy x Family Code", TitlePriority::English),
        ];
        let incoming = IncomingRecord::new().with_title("Spy x Family Codes", TitlePriority::Display);

        let hit = resolve(&incoming, &corpus).unwrap();
        assert_eq!(hit.matched_record_id, Uuid::from_u128(1));
    }

    #[test]
    fn category_hint_prunes_corpus() {
        let corpus = vec![
            record(1).with_category("anime").with_title("Monster", TitlePriority::Romanized),
            record(2).with_category("book").with_title("Monster", TitlePriority::Romanized),
        ];
        let incoming = IncomingRecord::new()
            .with_category("book")
            .with_title("Monster", TitlePriority::Display);

        let hit = resolve(&incoming, &corpus).unwrap();
        assert_eq!(hit.matched_record_id, Uuid::from_u128(2));

        let uncategorized = vec![record(3).with_title("Monster", TitlePriority::Romanized)];
        assert_eq!(prefilter(Some("book"), &uncategorized).len(), 1);
        assert_eq!(prefilter(Some("book"), &corpus[..1]).len(), 0);
    }

    #[test]
    fn category_hint_applies_to_external_ids() {
        let corpus = vec![record(1).with_category("anime").with_external_id(42)];
        let incoming = IncomingRecord::new().with_category("book").with_external_id(42);
        assert_eq!(resolve(&incoming, &corpus), None);

        let resolver = Resolver::with_config(MatchConfig {
            category_prefilter: false,
            ..Default::default()
        });
        assert!(resolver.resolve(&incoming, &corpus).is_some());
    }

    #[test]
    fn empty_inputs_resolve_to_none() {
        let corpus = vec![record(1).with_title("Mushishi", TitlePriority::Romanized)];
        let empty: Vec<LibraryRecord> = Vec::new();
        let incoming = IncomingRecord::new().with_title("Mushishi", TitlePriority::Display);

        assert_eq!(resolve(&incoming, &empty), None);
        assert_eq!(resolve(&IncomingRecord::new(), &corpus), None);

        let punctuation = IncomingRecord::new().with_title("...", TitlePriority::Display);
        let punct_corpus = vec![record(2).with_title("!!!", TitlePriority::Romanized)];
        assert_eq!(resolve(&punctuation, &punct_corpus), None);
    }

    #[test]
    fn stricter_auto_merge_priority_demotes_display_match() {
        let resolver = Resolver::with_config(MatchConfig {
            auto_merge_max_priority: TitlePriority::English,
            ..Default::default()
        });
        let corpus = vec![record(1).with_title("Hunter x Hunter", TitlePriority::Display)];
        let incoming = IncomingRecord::new().with_title("HUNTER X HUNTER", TitlePriority::Display);

        let hit = resolver.resolve(&incoming, &corpus).unwrap();
        assert!(!hit.is_exact);
    }
}
