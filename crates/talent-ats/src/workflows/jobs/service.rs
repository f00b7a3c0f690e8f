use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{Job, JobFilter, JobId, JobInput};
use super::repository::JobRepository;
use crate::storage::RepositoryError;
use crate::workflows::intake::FieldErrors;

/// Admin and public operations over the job catalogue.
pub struct JobCatalog {
    repository: Arc<dyn JobRepository>,
}

impl JobCatalog {
    pub fn new(repository: Arc<dyn JobRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> Arc<dyn JobRepository> {
        self.repository.clone()
    }

    pub async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError> {
        Ok(self.repository.list(filter).await?)
    }

    pub async fn get(&self, id: &JobId) -> Result<Job, JobError> {
        self.repository
            .fetch(id)
            .await?
            .ok_or_else(|| JobError::NotFound(id.clone()))
    }

    pub async fn create(&self, input: JobInput, now: DateTime<Utc>) -> Result<Job, JobError> {
        let input = JobInput {
            posted_date: input.posted_date.or(Some(now.date_naive())),
            ..input
        };
        ensure_valid(&input)?;
        let job = self
            .repository
            .create(Job::from_input(JobId::generate(), input, now))
            .await?;
        tracing::info!(job_id = %job.id, title = %job.title, "job created");
        Ok(job)
    }

    pub async fn update(
        &self,
        id: &JobId,
        input: JobInput,
        now: DateTime<Utc>,
    ) -> Result<Job, JobError> {
        let mut job = self.get(id).await?;
        // Dates are checked against the posted date the job will end up with.
        let input = JobInput {
            posted_date: input.posted_date.or(Some(job.posted_date)),
            ..input
        };
        ensure_valid(&input)?;
        job.apply(input, now);
        let job = self.repository.update(job).await.map_err(|error| match error {
            RepositoryError::NotFound => JobError::NotFound(id.clone()),
            other => JobError::Repository(other),
        })?;
        tracing::info!(job_id = %job.id, "job updated");
        Ok(job)
    }

    pub async fn delete(&self, id: &JobId) -> Result<(), JobError> {
        self.repository
            .delete(id)
            .await
            .map_err(|error| match error {
                RepositoryError::NotFound => JobError::NotFound(id.clone()),
                other => JobError::Repository(other),
            })?;
        tracing::info!(job_id = %id, "job deleted");
        Ok(())
    }
}

fn ensure_valid(input: &JobInput) -> Result<(), JobError> {
    let errors = input.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(JobError::Invalid(errors))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job input is invalid")]
    Invalid(FieldErrors),
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
