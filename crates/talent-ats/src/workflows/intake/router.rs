use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationRequest, ExperienceEntry, StepData};
use super::experience::total_experience;
use super::repository::{ApplicationFilter, ApplicationId, ApplicationStatus, RepositoryError};
use super::service::{ApplicationService, ApplicationServiceError};
use crate::auth::{require_admin, AuthService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRequest {
    #[serde(default)]
    pub entries: Vec<ExperienceEntry>,
    /// Reference date for ongoing roles; defaults to today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Router builder exposing public intake endpoints and the admin review surface.
pub fn application_router(service: Arc<ApplicationService>, auth: Arc<AuthService>) -> Router {
    let admin = Router::new()
        .route("/api/v1/applications", get(list_handler))
        .route("/api/v1/applications/:application_id", get(fetch_handler))
        .route(
            "/api/v1/applications/:application_id/status",
            patch(status_update_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_admin));

    Router::new()
        .route("/api/v1/applications", post(submit_handler))
        .route("/api/v1/applications/validate", post(validate_handler))
        .route("/api/v1/applications/experience", post(experience_handler))
        .merge(admin)
        .with_state(service)
}

fn error_response(error: ApplicationServiceError) -> Response {
    match error {
        ApplicationServiceError::Validation(report) => {
            let payload = json!({
                "error": "application failed validation",
                "firstInvalidStep": report.first_invalid_step(),
                "report": report,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        ApplicationServiceError::TermsNotAccepted => {
            let payload = json!({ "error": error.to_string(), "field": "termsAccepted" });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        ApplicationServiceError::JobNotFound(_)
        | ApplicationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        ApplicationServiceError::JobClosed(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::Conflict(_)) => {
            let payload = json!({ "error": "you have already applied for this position" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(other) => {
            tracing::error!(error = %other, "application repository failure");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<ApplicationService>>,
    Json(request): Json<ApplicationRequest>,
) -> Response {
    match service.submit(request, Utc::now()).await {
        Ok(record) => (StatusCode::CREATED, Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validate_handler(
    State(service): State<Arc<ApplicationService>>,
    Json(data): Json<StepData>,
) -> Response {
    let step = data.step();
    let errors = service.validate_step(data);
    let payload = json!({
        "step": step,
        "valid": errors.is_empty(),
        "errors": errors,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn experience_handler(Json(request): Json<ExperienceRequest>) -> Response {
    let today = request.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let total = total_experience(&request.entries, today);
    let payload = json!({
        "years": total.years,
        "months": total.months,
        "label": total.to_string(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn list_handler(
    State(service): State<Arc<ApplicationService>>,
    Query(filter): Query<ApplicationFilter>,
) -> Response {
    match service.list(&filter).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler(
    State(service): State<Arc<ApplicationService>>,
    Path(application_id): Path<String>,
) -> Response {
    match service.get(&ApplicationId(application_id)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_update_handler(
    State(service): State<Arc<ApplicationService>>,
    Path(application_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Response {
    let id = ApplicationId(application_id);
    match service
        .update_status(&id, request.status, request.notes, Utc::now())
        .await
    {
        Ok(record) => (StatusCode::OK, Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}
