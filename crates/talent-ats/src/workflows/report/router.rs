use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::json;

use super::summary::DashboardReport;
use super::views::DashboardSummary;
use crate::auth::{require_admin, AuthService};
use crate::storage::RepositoryError;
use crate::workflows::intake::{ApplicationFilter, ApplicationRepository};
use crate::workflows::jobs::{JobFilter, JobRepository};

/// Reads both stores and summarises them for the admin dashboard.
pub struct DashboardService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl DashboardService {
    pub fn new(jobs: Arc<dyn JobRepository>, applications: Arc<dyn ApplicationRepository>) -> Self {
        Self { jobs, applications }
    }

    pub async fn summary(&self, today: NaiveDate) -> Result<DashboardSummary, RepositoryError> {
        let jobs = self.jobs.list(&JobFilter::default()).await?;
        let applications = self
            .applications
            .list(&ApplicationFilter::default())
            .await?;
        Ok(DashboardReport::build(&jobs, &applications, today).summary())
    }
}

pub fn dashboard_router(service: Arc<DashboardService>, auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/v1/dashboard", get(summary_handler))
        .route_layer(middleware::from_fn_with_state(auth, require_admin))
        .with_state(service)
}

pub(crate) async fn summary_handler(State(service): State<Arc<DashboardService>>) -> Response {
    match service.summary(Utc::now().date_naive()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => {
            tracing::error!(%error, "dashboard summary failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}
