use serde::Serialize;

use crate::workflows::intake::{ApplicationStatus, ApplicationStatusView, TotalExperience};
use crate::workflows::jobs::JobId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub total: usize,
    pub open: usize,
    pub featured: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineEntry {
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationsEntry {
    pub job_id: JobId,
    pub title: String,
    pub applications: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub jobs: JobCounts,
    pub total_applications: usize,
    pub pipeline: Vec<PipelineEntry>,
    pub applications_per_job: Vec<JobApplicationsEntry>,
    /// Applications not tied to any job posting.
    pub unassigned_applications: usize,
    pub recent_applications: Vec<ApplicationStatusView>,
    pub average_experience: TotalExperience,
    pub average_experience_label: String,
}
