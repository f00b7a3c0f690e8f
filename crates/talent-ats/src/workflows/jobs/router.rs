use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{parse_list, JobFilter, JobId, JobInput, JobType};
use super::service::{JobCatalog, JobError};
use crate::auth::{require_admin, AuthService};

/// Query string accepted by the public listing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    /// Comma-separated; every skill must be listed on the job.
    pub skills: Option<String>,
    pub featured: Option<bool>,
    /// Only jobs still accepting applications on this date.
    pub open_on: Option<NaiveDate>,
}

impl JobQuery {
    fn into_filter(self) -> Result<JobFilter, String> {
        let job_type = match self.job_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                JobType::from_label(raw).ok_or_else(|| format!("unknown job type '{raw}'"))?,
            ),
        };
        Ok(JobFilter {
            search: self.search,
            location: self.location,
            job_type,
            skills: self.skills.as_deref().map(parse_list).unwrap_or_default(),
            featured_only: self.featured.unwrap_or(false),
            open_on: self.open_on,
        })
    }
}

/// Router for the job catalogue: public reads, admin writes.
pub fn job_router(catalog: Arc<JobCatalog>, auth: Arc<AuthService>) -> Router {
    let admin = Router::new()
        .route("/api/v1/jobs", post(create_handler))
        .route(
            "/api/v1/jobs/:job_id",
            put(update_handler).delete(delete_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_admin));

    Router::new()
        .route("/api/v1/jobs", get(list_handler))
        .route("/api/v1/jobs/:job_id", get(fetch_handler))
        .merge(admin)
        .with_state(catalog)
}

fn error_response(error: JobError) -> Response {
    match error {
        JobError::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "job input is invalid", "fields": errors })),
        )
            .into_response(),
        JobError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("job {id} not found") })),
        )
            .into_response(),
        JobError::Repository(error) => {
            tracing::error!(%error, "job repository failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}

pub(crate) async fn list_handler(
    State(catalog): State<Arc<JobCatalog>>,
    Query(query): Query<JobQuery>,
) -> Response {
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    };
    match catalog.list(&filter).await {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler(
    State(catalog): State<Arc<JobCatalog>>,
    Path(job_id): Path<String>,
) -> Response {
    match catalog.get(&JobId(job_id)).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler(
    State(catalog): State<Arc<JobCatalog>>,
    Json(input): Json<JobInput>,
) -> Response {
    match catalog.create(input, Utc::now()).await {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler(
    State(catalog): State<Arc<JobCatalog>>,
    Path(job_id): Path<String>,
    Json(input): Json<JobInput>,
) -> Response {
    match catalog.update(&JobId(job_id), input, Utc::now()).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler(
    State(catalog): State<Arc<JobCatalog>>,
    Path(job_id): Path<String>,
) -> Response {
    match catalog.delete(&JobId(job_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}
