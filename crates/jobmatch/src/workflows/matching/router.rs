use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::WageRange;
use super::ranking::{RankedPosting, Recommendations};
use super::repository::{PostingRepository, ProfileRepository};
use super::service::{MatchingService, MatchingServiceError};
use crate::workflows::identity::{PostingId, UserId};

/// Router builder exposing candidate recommendations over HTTP.
pub fn matching_router<P, J>(service: Arc<MatchingService<P, J>>) -> Router
where
    P: ProfileRepository + 'static,
    J: PostingRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/candidates/:candidate_id/recommendations",
            get(recommendations_handler::<P, J>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/postings/:posting_id/score",
            get(explain_handler::<P, J>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecommendationQuery {
    #[serde(default)]
    pub(crate) full: bool,
}

/// Wire shape of a ranked posting.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPostingView {
    pub posting_id: PostingId,
    pub title: String,
    pub location: Option<String>,
    pub wage: WageRange,
    pub created_at: DateTime<Utc>,
    pub score: u8,
}

impl From<&RankedPosting> for RankedPostingView {
    fn from(entry: &RankedPosting) -> Self {
        Self {
            posting_id: entry.posting.id.clone(),
            title: entry.posting.title.clone(),
            location: entry.posting.location.clone(),
            wage: entry.posting.wage,
            created_at: entry.posting.created_at,
            score: entry.score.value(),
        }
    }
}

/// Preview slice, optional full list, and the totals a client needs to page.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsView {
    pub candidate_id: UserId,
    pub total: usize,
    pub has_more: bool,
    pub preview: Vec<RankedPostingView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postings: Option<Vec<RankedPostingView>>,
}

impl RecommendationsView {
    pub fn new(candidate_id: UserId, recommendations: &Recommendations, full: bool) -> Self {
        let postings = full.then(|| {
            recommendations
                .all()
                .iter()
                .map(RankedPostingView::from)
                .collect()
        });

        Self {
            candidate_id,
            total: recommendations.len(),
            has_more: recommendations.has_more(),
            preview: recommendations
                .preview()
                .iter()
                .map(RankedPostingView::from)
                .collect(),
            postings,
        }
    }
}

pub(crate) async fn recommendations_handler<P, J>(
    State(service): State<Arc<MatchingService<P, J>>>,
    Path(candidate_id): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> Response
where
    P: ProfileRepository + 'static,
    J: PostingRepository + 'static,
{
    let candidate_id = UserId(candidate_id);
    match service.recommendations(&candidate_id, Utc::now()).await {
        Ok(recommendations) => {
            let view = RecommendationsView::new(candidate_id, &recommendations, query.full);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn explain_handler<P, J>(
    State(service): State<Arc<MatchingService<P, J>>>,
    Path((candidate_id, posting_id)): Path<(String, String)>,
) -> Response
where
    P: ProfileRepository + 'static,
    J: PostingRepository + 'static,
{
    let candidate_id = UserId(candidate_id);
    let posting_id = PostingId(posting_id);
    match service.explain(&candidate_id, &posting_id, Utc::now()).await {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: MatchingServiceError) -> Response {
    let status = match error {
        MatchingServiceError::ProfileNotFound(_) | MatchingServiceError::PostingNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        MatchingServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
