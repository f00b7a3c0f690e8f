use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::SubmissionPayload;
use super::experience::{total_experience, TotalExperience};
use crate::workflows::jobs::JobId;

pub use crate::storage::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Recruitment pipeline stage of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interview,
    Shortlisted,
    Offered,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    /// Pipeline order, as shown on the dashboard.
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Applied,
            Self::Screening,
            Self::Interview,
            Self::Shortlisted,
            Self::Offered,
            Self::Hired,
            Self::Rejected,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Screening => "screening",
            Self::Interview => "interview",
            Self::Shortlisted => "shortlisted",
            Self::Offered => "offered",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Screening => "Screening",
            Self::Interview => "Interview",
            Self::Shortlisted => "Shortlisted",
            Self::Offered => "Offered",
            Self::Hired => "Hired",
            Self::Rejected => "Rejected",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(value.trim()))
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Stored application: the candidate's payload linked to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub candidate_id: CandidateId,
    pub job_id: Option<JobId>,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_experience: TotalExperience,
    pub payload: SubmissionPayload,
}

impl ApplicationRecord {
    /// New `applied` record with fresh ids and the experience snapshot taken at submission.
    pub fn new(payload: SubmissionPayload, submitted_at: DateTime<Utc>) -> Self {
        let total_experience = total_experience(&payload.experience, submitted_at.date_naive());
        Self {
            id: ApplicationId::generate(),
            candidate_id: CandidateId::generate(),
            job_id: payload.job_id.clone(),
            status: ApplicationStatus::Applied,
            notes: None,
            submitted_at,
            updated_at: submitted_at,
            total_experience,
            payload,
        }
    }

    pub fn candidate_email(&self) -> &str {
        self.payload.personal.email.trim()
    }

    pub fn candidate_name(&self) -> String {
        self.payload.personal.full_name()
    }

    /// Same candidate (by e-mail, case-insensitive) applying to the same job.
    pub fn is_duplicate_of(&self, other: &ApplicationRecord) -> bool {
        self.job_id == other.job_id
            && self
                .candidate_email()
                .eq_ignore_ascii_case(other.candidate_email())
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            status: self.status.code(),
            status_label: self.status.label(),
            job_id: self.job_id.clone(),
            candidate_name: self.candidate_name(),
            submitted_at: self.submitted_at,
            total_experience: self.total_experience.to_string(),
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub candidate_name: String,
    pub submitted_at: DateTime<Utc>,
    pub total_experience: String,
}

/// Admin listing filter; results are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationFilter {
    pub job_id: Option<JobId>,
    pub status: Option<ApplicationStatus>,
    pub email: Option<String>,
    pub limit: Option<usize>,
}

impl ApplicationFilter {
    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        if self.job_id.as_ref().is_some_and(|job| record.job_id.as_ref() != Some(job)) {
            return false;
        }
        if self.status.is_some_and(|status| status != record.status) {
            return false;
        }
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => {
                record.candidate_email().eq_ignore_ascii_case(email)
            }
            _ => true,
        }
    }

    /// Filters, orders newest first and truncates to `limit`.
    pub fn apply(
        &self,
        records: impl IntoIterator<Item = ApplicationRecord>,
    ) -> Vec<ApplicationRecord> {
        let mut records: Vec<_> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        records
    }
}

/// Persistence adapter for submitted applications.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Stores a new application; a duplicate candidate for the same job is a `Conflict`.
    async fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    async fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        notes: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError>;
}

/// Outbound e-mail hook.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: EmailNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailNotification {
    pub template: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
}

impl EmailNotification {
    pub fn application_received(record: &ApplicationRecord, job_title: Option<&str>) -> Self {
        let position = job_title.unwrap_or("our open position");
        Self {
            template: "application_received".to_string(),
            recipients: vec![record.candidate_email().to_string()],
            subject: format!("Application received: {position}"),
            text: format!(
                "Dear {},\n\nThank you for applying for {position}. Your application reference is {}.\nWe will contact you about the next steps.",
                record.candidate_name(),
                record.id
            ),
            application_id: Some(record.id.clone()),
        }
    }

    pub fn status_changed(record: &ApplicationRecord) -> Self {
        Self {
            template: "application_status_changed".to_string(),
            recipients: vec![record.candidate_email().to_string()],
            subject: format!("Application update: {}", record.status.label()),
            text: format!(
                "Dear {},\n\nThe status of application {} is now {}.",
                record.candidate_name(),
                record.id,
                record.status.label()
            ),
            application_id: Some(record.id.clone()),
        }
    }

    /// Rejects messages the mail transport would refuse.
    pub fn validate(&self) -> Result<(), NotificationError> {
        if self.recipients.iter().all(|recipient| recipient.trim().is_empty()) {
            return Err(NotificationError::InvalidMessage("no recipients".to_string()));
        }
        if self.subject.trim().is_empty() {
            return Err(NotificationError::InvalidMessage("empty subject".to_string()));
        }
        if self.text.trim().is_empty() {
            return Err(NotificationError::InvalidMessage("empty body".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification rejected: {0}")]
    InvalidMessage(String),
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
