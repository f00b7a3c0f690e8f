use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{ApplicationRequest, StepData};
use super::repository::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationRepository,
    ApplicationStatus, EmailNotification, NotificationPublisher, RepositoryError,
};
use super::submission::{self, SubmissionError};
use super::validation::{StepErrors, ValidationReport, TERMS_MESSAGE};
use super::wizard::{ApplicationDraft, ApplicationWizard};
use crate::workflows::jobs::{Job, JobId, JobRepository};

/// Service composing the intake state machine, job catalogue and persistence adapter.
pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    jobs: Arc<dyn JobRepository>,
    notifications: Arc<dyn NotificationPublisher>,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobRepository>,
        notifications: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            applications,
            jobs,
            notifications,
        }
    }

    /// Validate and store a complete application, then acknowledge it by e-mail.
    pub async fn submit(
        &self,
        request: ApplicationRequest,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let ApplicationRequest {
            payload,
            terms_accepted,
        } = request;
        let mut wizard = ApplicationWizard::from_payload(payload);
        wizard.set_terms_accepted(terms_accepted);

        let report = wizard.validate_all();
        if !report.steps.is_empty() {
            tracing::debug!(
                first_invalid = ?report.first_invalid_step(),
                "application rejected by validation"
            );
            return Err(ApplicationServiceError::Validation(report));
        }

        let draft = wizard.into_draft();
        let job = self.resolve_job(&draft, now).await?;

        let record = submission::submit(&draft, self.applications.as_ref(), now).await?;
        tracing::info!(
            application_id = %record.id,
            job_id = ?record.job_id,
            experience = %record.total_experience,
            "application submitted"
        );

        self.notify(EmailNotification::application_received(
            &record,
            job.as_ref().map(|job| job.title.as_str()),
        ));
        Ok(record)
    }

    async fn resolve_job(
        &self,
        draft: &ApplicationDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Job>, ApplicationServiceError> {
        let Some(job_id) = draft.job_id.as_ref() else {
            return Ok(None);
        };

        let job = self
            .jobs
            .fetch(job_id)
            .await?
            .ok_or_else(|| ApplicationServiceError::JobNotFound(job_id.clone()))?;
        if !job.is_open_on(now.date_naive()) {
            return Err(ApplicationServiceError::JobClosed(job_id.clone()));
        }
        Ok(Some(job))
    }

    /// Validate one step without touching any stored state.
    pub fn validate_step(&self, data: StepData) -> StepErrors {
        let step = data.step();
        let mut draft = ApplicationDraft::new(None);
        draft.apply(data);
        draft.validate_step(step)
    }

    pub async fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .applications
            .fetch(application_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        Ok(self.applications.list(filter).await?)
    }

    /// Move an application through the pipeline and tell the candidate.
    pub async fn update_status(
        &self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let notes = notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());
        let record = self
            .applications
            .update_status(application_id, status, notes, now)
            .await?;
        tracing::info!(
            application_id = %record.id,
            status = %record.status,
            "application status changed"
        );

        self.notify(EmailNotification::status_changed(&record));
        Ok(record)
    }

    fn notify(&self, notification: EmailNotification) {
        let template = notification.template.clone();
        let outcome = notification
            .validate()
            .and_then(|()| self.notifications.publish(notification));
        if let Err(error) = outcome {
            tracing::warn!(%error, %template, "notification not delivered");
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("application failed validation")]
    Validation(ValidationReport),
    #[error("{}", TERMS_MESSAGE)]
    TermsNotAccepted,
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("job {0} is no longer accepting applications")]
    JobClosed(JobId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<SubmissionError> for ApplicationServiceError {
    fn from(value: SubmissionError) -> Self {
        match value {
            SubmissionError::TermsNotAccepted => Self::TermsNotAccepted,
            SubmissionError::Persistence(error) => Self::Repository(error),
        }
    }
}
