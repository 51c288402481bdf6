//! Posting recommendations for candidates.
//!
//! [`ScoringEngine`] turns a (profile, posting) pair into a bounded match score,
//! [`RecommendationRanker`] filters and orders a posting set with it, and
//! [`MatchingService`] wires both to the profile and posting repositories.

pub mod domain;
pub mod import;
mod ranking;
pub mod repository;
pub mod router;
mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{MatchScore, PostingSnapshot, ProfileSnapshot, WageRange};
pub use import::{PostingImportError, PostingImporter};
pub use ranking::{RankedPosting, RecommendationRanker, Recommendations, DEFAULT_PREVIEW_LEN};
pub use repository::{PostingRepository, ProfileRepository};
pub use router::matching_router;
pub use scoring::{KeywordVocabulary, MatchEvaluation, MatchFactor, ScoreComponent, ScoringEngine};
pub use service::{MatchingService, MatchingServiceError};

/// Tunables for the recommendation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingConfig {
    pub preview_len: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}
