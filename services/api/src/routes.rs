use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use talent_ats::auth::auth_router;
use talent_ats::workflows::intake::application_router;
use talent_ats::workflows::jobs::job_router;
use talent_ats::workflows::report::dashboard_router;

/// Full HTTP surface: module routers plus the operational endpoints.
pub(crate) fn app_router(services: Services) -> Router {
    let Services {
        jobs,
        applications,
        dashboard,
        auth,
    } = services;

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(auth_router(auth.clone()))
        .merge(job_router(jobs, auth.clone()))
        .merge(application_router(applications, auth.clone()))
        .merge(dashboard_router(dashboard, auth))
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
