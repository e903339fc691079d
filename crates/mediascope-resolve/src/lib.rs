//! Mediascope Resolve: matching imported records against the library.

pub mod normalize;
pub mod similarity;
pub mod candidates;
pub mod resolver;
pub mod policy;
pub mod batch;

pub use normalize::{normalize_title, normalized_key};
pub use similarity::{SimilarityScore, STRICT_PREFIX_LENGTH, score_similarity, score_with_prefix};
pub use candidates::{TitleCandidate, extract_candidates, extract_with};
pub use resolver::{MatchMethod, MatchResult, Resolver, prefilter, resolve};
pub use policy::{MergeDecision, NearMiss, decide};
pub use batch::{ImportReport, Resolution, resolve_batch};
