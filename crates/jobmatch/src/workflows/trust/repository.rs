use async_trait::async_trait;

use super::domain::EvaluationRecord;
use crate::workflows::identity::UserId;
use crate::workflows::repository::RepositoryError;

/// Source of evaluation records; returns every record about `user_id`.
#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    async fn evaluations_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}
