use std::sync::Arc;

use tracing::debug;

use super::domain::TrustStats;
use super::repository::EvaluationRepository;
use super::stats::compute_stats;
use crate::workflows::identity::UserId;
use crate::workflows::repository::RepositoryError;

/// Recomputes trust stats from the evaluation repository on every call.
pub struct TrustService<E> {
    evaluations: Arc<E>,
}

impl<E> TrustService<E>
where
    E: EvaluationRepository + 'static,
{
    pub fn new(evaluations: Arc<E>) -> Self {
        Self { evaluations }
    }

    pub async fn stats_for(&self, user_id: &UserId) -> Result<TrustStats, RepositoryError> {
        let records = self.evaluations.evaluations_for(user_id).await?;
        let stats = compute_stats(user_id, &records);
        debug!(
            user = %user_id,
            evaluations = stats.total_evaluations,
            level = %stats.trust_level,
            "computed trust stats"
        );
        Ok(stats)
    }
}
