use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::TrustStats;
use super::repository::EvaluationRepository;
use super::service::TrustService;
use crate::workflows::identity::UserId;
use crate::workflows::repository::RepositoryError;

pub fn trust_router<E>(service: Arc<TrustService<E>>) -> Router
where
    E: EvaluationRepository + 'static,
{
    Router::new()
        .route("/api/v1/users/:user_id/trust", get(trust_handler::<E>))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize)]
pub struct TrustStatsView {
    pub user_id: UserId,
    #[serde(flatten)]
    pub stats: TrustStats,
}

pub(crate) async fn trust_handler<E>(
    State(service): State<Arc<TrustService<E>>>,
    Path(user_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
{
    let user_id = UserId(user_id);
    match service.stats_for(&user_id).await {
        Ok(stats) => (StatusCode::OK, axum::Json(TrustStatsView { user_id, stats })).into_response(),
        Err(error) => {
            let status = match error {
                RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let payload = json!({
                "error": error.to_string(),
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}
