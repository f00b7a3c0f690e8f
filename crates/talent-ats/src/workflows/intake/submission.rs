use chrono::{DateTime, Utc};

use super::domain::SubmissionPayload;
use super::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};
use super::validation::TERMS_MESSAGE;
use super::wizard::ApplicationDraft;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{}", TERMS_MESSAGE)]
    TermsNotAccepted,
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Builds the payload once the terms have been accepted. Performs no I/O.
pub fn try_submit(draft: &ApplicationDraft) -> Result<SubmissionPayload, SubmissionError> {
    if !draft.terms_accepted {
        return Err(SubmissionError::TermsNotAccepted);
    }
    Ok(draft.to_payload())
}

/// Hands the assembled payload to the persistence adapter and returns its outcome unchanged.
pub async fn submit<R>(
    draft: &ApplicationDraft,
    repository: &R,
    submitted_at: DateTime<Utc>,
) -> Result<ApplicationRecord, SubmissionError>
where
    R: ApplicationRepository + ?Sized,
{
    let payload = try_submit(draft)?;
    let record = repository
        .insert(ApplicationRecord::new(payload, submitted_at))
        .await?;
    Ok(record)
}
