use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use jobmatch::workflows::applications::{
    application_router, ApplicationLifecycleService, ApplicationStore, NotificationDispatcher,
};
use jobmatch::workflows::matching::{
    matching_router, MatchingService, PostingRepository, ProfileRepository,
};
use jobmatch::workflows::trust::{trust_router, EvaluationRepository, TrustService};
use serde_json::json;

use crate::infra::AppState;

/// Workflow services mounted by the HTTP server.
pub(crate) struct Services<P, J, S, N, E> {
    pub(crate) matching: Arc<MatchingService<P, J>>,
    pub(crate) lifecycle: Arc<ApplicationLifecycleService<S, N>>,
    pub(crate) trust: Arc<TrustService<E>>,
}

pub(crate) fn with_workflow_routes<P, J, S, N, E>(services: Services<P, J, S, N, E>) -> Router
where
    P: ProfileRepository + 'static,
    J: PostingRepository + 'static,
    S: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
    E: EvaluationRepository + 'static,
{
    matching_router(services.matching)
        .merge(application_router(services.lifecycle))
        .merge(trust_router(services.trust))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
