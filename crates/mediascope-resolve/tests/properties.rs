//! Property tests for the normalizer, the scorer and the decision policy.
//!
//! Inputs come from a title-like alphabet (Latin with diacritics, full-width
//! Latin, kana, CJK, Hangul, the usual punctuation) rather than arbitrary
//! code points.

use mediascope_core::{IncomingRecord, LibraryRecord, TitlePriority};
use mediascope_resolve::{
    MatchMethod, MergeDecision, STRICT_PREFIX_LENGTH, decide, normalize_title, resolve,
    score_similarity,
};
use proptest::prelude::*;
use uuid::Uuid;

const TITLE_PATTERN: &str = "[a-zA-Z0-9 .:!?'()\\-/ōūāéèüÀ-ÖＡ-Ｚア-ン進撃の巨人가-힣]{0,24}";
const KEY_PATTERN: &str = "[a-e]{0,12}";

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn normalization_is_idempotent(title in TITLE_PATTERN) {
        let once = normalize_title(&title);
        prop_assert_eq!(normalize_title(&once), once);
    }

    #[test]
    fn normalized_keys_have_no_whitespace_or_punctuation(title in TITLE_PATTERN) {
        let key = normalize_title(&title);
        prop_assert!(!key.chars().any(|c| c.is_whitespace() || c.is_ascii_punctuation()));
        prop_assert!(!key.chars().any(char::is_uppercase));
    }

    #[test]
    fn ascii_case_does_not_matter(title in "[a-zA-Z0-9 .'-]{0,24}") {
        prop_assert_eq!(normalize_title(&title.to_uppercase()), normalize_title(&title));
    }

    #[test]
    fn similarity_is_bounded_and_symmetric(a in KEY_PATTERN, b in KEY_PATTERN) {
        let ab = score_similarity(&a, &b);
        let ba = score_similarity(&b, &a);
        prop_assert!((0.0..=100.0).contains(&ab.similarity));
        prop_assert_eq!(ab.similarity, ba.similarity);
        prop_assert_eq!(ab.consecutive_count, ba.consecutive_count);
    }

    #[test]
    fn identical_keys_score_full(a in KEY_PATTERN) {
        let score = score_similarity(&a, &a);
        prop_assert_eq!(score.similarity, 100.0);
        prop_assert_eq!(score.consecutive_count, a.chars().count());
    }

    #[test]
    fn strict_match_is_exactly_the_prefix_gate(a in KEY_PATTERN, b in KEY_PATTERN) {
        let score = score_similarity(&a, &b);
        prop_assert!(score.consecutive_count <= a.chars().count().min(b.chars().count()));
        prop_assert_eq!(score.is_strict_match, score.consecutive_count >= STRICT_PREFIX_LENGTH);
    }

    #[test]
    fn alternate_only_agreement_never_auto_merges(title in "[a-z]{3,16}") {
        let corpus = vec![
            LibraryRecord::new(Uuid::from_u128(1))
                .with_title("1 Placeholder 1", TitlePriority::Romanized)
                .with_title(title.clone(), TitlePriority::Alternate),
        ];
        let incoming = IncomingRecord::new().with_title(title, TitlePriority::Display);

        let matched = resolve(&incoming, &corpus);
        prop_assert!(matched.is_some());
        prop_assert!(!decide(&incoming, matched.as_ref()).is_auto_merge());
    }

    #[test]
    fn shared_external_id_always_merges(id in any::<i64>(), a in TITLE_PATTERN, b in TITLE_PATTERN) {
        let corpus = vec![
            LibraryRecord::new(Uuid::from_u128(7))
                .with_external_id(id)
                .with_title(a, TitlePriority::Romanized),
        ];
        let incoming = IncomingRecord::new()
            .with_external_id(id)
            .with_title(b, TitlePriority::Display);

        let matched = resolve(&incoming, &corpus);
        prop_assert_eq!(matched.as_ref().map(|m| m.match_method), Some(MatchMethod::ExternalId));
        prop_assert_eq!(
            decide(&incoming, matched.as_ref()),
            MergeDecision::AutoMerge { record_id: Uuid::from_u128(7) }
        );
    }
}
