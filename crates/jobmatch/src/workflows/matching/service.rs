use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::ranking::{RecommendationRanker, Recommendations};
use super::repository::{PostingRepository, ProfileRepository};
use super::scoring::{MatchEvaluation, ScoringEngine};
use super::MatchingConfig;
use crate::workflows::identity::{PostingId, UserId};
use crate::workflows::repository::RepositoryError;

/// Service fetching snapshots from the repositories and ranking them for a candidate.
pub struct MatchingService<P, J> {
    profiles: Arc<P>,
    postings: Arc<J>,
    ranker: RecommendationRanker,
}

impl<P, J> MatchingService<P, J>
where
    P: ProfileRepository + 'static,
    J: PostingRepository + 'static,
{
    pub fn new(profiles: Arc<P>, postings: Arc<J>, config: MatchingConfig) -> Self {
        let ranker = RecommendationRanker::new(ScoringEngine::default(), config.preview_len);
        Self::with_ranker(profiles, postings, ranker)
    }

    pub fn with_ranker(profiles: Arc<P>, postings: Arc<J>, ranker: RecommendationRanker) -> Self {
        Self {
            profiles,
            postings,
            ranker,
        }
    }

    /// Rank every open posting the candidate has not applied to yet.
    pub async fn recommendations(
        &self,
        candidate_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Recommendations, MatchingServiceError> {
        let profile = self
            .profiles
            .profile(candidate_id)
            .await?
            .ok_or_else(|| MatchingServiceError::ProfileNotFound(candidate_id.clone()))?;
        let postings = self.postings.active_postings().await?;
        let applied = self.postings.applied_posting_ids(candidate_id).await?;

        let recommendations = self.ranker.rank(&profile, &postings, &applied, now);
        debug!(
            candidate = %candidate_id,
            considered = postings.len(),
            excluded = applied.len(),
            ranked = recommendations.len(),
            "ranked postings for candidate"
        );

        Ok(recommendations)
    }

    /// Explain how a single open posting scores for the candidate.
    pub async fn explain(
        &self,
        candidate_id: &UserId,
        posting_id: &PostingId,
        now: DateTime<Utc>,
    ) -> Result<MatchEvaluation, MatchingServiceError> {
        let profile = self
            .profiles
            .profile(candidate_id)
            .await?
            .ok_or_else(|| MatchingServiceError::ProfileNotFound(candidate_id.clone()))?;
        let posting = self
            .postings
            .active_postings()
            .await?
            .into_iter()
            .find(|posting| &posting.id == posting_id)
            .ok_or_else(|| MatchingServiceError::PostingNotFound(posting_id.clone()))?;

        Ok(self.ranker.engine().evaluate(&profile, &posting, now))
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error("no profile found for candidate {0}")]
    ProfileNotFound(UserId),
    #[error("no open posting with id {0}")]
    PostingNotFound(PostingId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
