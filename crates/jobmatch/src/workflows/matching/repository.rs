use std::collections::HashSet;

use async_trait::async_trait;

use super::domain::{PostingSnapshot, ProfileSnapshot};
use crate::workflows::identity::{PostingId, UserId};
use crate::workflows::repository::RepositoryError;

/// Source of candidate profiles; `Ok(None)` when the candidate has no profile yet.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn profile(&self, candidate_id: &UserId)
        -> Result<Option<ProfileSnapshot>, RepositoryError>;
}

/// Source of open postings and of each candidate's prior applications.
#[async_trait]
pub trait PostingRepository: Send + Sync {
    async fn active_postings(&self) -> Result<Vec<PostingSnapshot>, RepositoryError>;

    async fn applied_posting_ids(
        &self,
        candidate_id: &UserId,
    ) -> Result<HashSet<PostingId>, RepositoryError>;
}
