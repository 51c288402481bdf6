use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ActorRole, ApplicationSubmission, NotificationRequest};
use super::lifecycle::TransitionOutcome;
use super::repository::{ApplicationStore, ApplicationView, NotificationDispatcher};
use super::service::{ApplicationLifecycleService, LifecycleServiceError, StatusChangeRequest};
use crate::workflows::identity::ApplicationId;
use crate::workflows::repository::RepositoryError;

/// Router builder exposing submission, lookup, and status transitions.
pub fn application_router<S, N>(service: Arc<ApplicationLifecycleService<S, N>>) -> Router
where
    S: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<S, N>))
        .route(
            "/api/v1/applications/:application_id",
            get(fetch_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(status_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/withdraw",
            post(withdraw_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WithdrawRequest {
    pub(crate) actor: ActorRole,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

/// Response body for an applied transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionView {
    pub application: ApplicationView,
    pub notification: NotificationRequest,
}

impl From<&TransitionOutcome> for TransitionView {
    fn from(outcome: &TransitionOutcome) -> Self {
        Self {
            application: ApplicationView::from(&outcome.application),
            notification: outcome.notification.clone(),
        }
    }
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<ApplicationLifecycleService<S, N>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.submit(submission, Utc::now()).await {
        Ok(application) => {
            let view = ApplicationView::from(&application);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<S, N>(
    State(service): State<Arc<ApplicationLifecycleService<S, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
{
    match service.get(&ApplicationId(application_id)).await {
        Ok(application) => {
            (StatusCode::OK, axum::Json(ApplicationView::from(&application))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S, N>(
    State(service): State<Arc<ApplicationLifecycleService<S, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusChangeRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let id = ApplicationId(application_id);
    match service.update_status(&id, request, Utc::now()).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(TransitionView::from(&outcome))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn withdraw_handler<S, N>(
    State(service): State<Arc<ApplicationLifecycleService<S, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<WithdrawRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
{
    let id = ApplicationId(application_id);
    match service
        .withdraw(&id, request.actor, request.reason.as_deref(), Utc::now())
        .await
    {
        Ok(outcome) => (StatusCode::OK, axum::Json(TransitionView::from(&outcome))).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: LifecycleServiceError) -> Response {
    let (status, payload) = match &error {
        LifecycleServiceError::Transition(transition) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": transition.to_string(),
                "kind": transition.kind(),
            }),
        ),
        LifecycleServiceError::ConcurrentModification { .. } => (
            StatusCode::CONFLICT,
            json!({
                "error": error.to_string(),
                "kind": "concurrent_modification",
            }),
        ),
        LifecycleServiceError::Repository(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            json!({
                "error": "application not found",
            }),
        ),
        LifecycleServiceError::Repository(RepositoryError::Conflict) => (
            StatusCode::CONFLICT,
            json!({
                "error": "application already exists",
            }),
        ),
        LifecycleServiceError::Repository(RepositoryError::Unavailable(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({
                "error": error.to_string(),
            }),
        ),
    };
    (status, axum::Json(payload)).into_response()
}
