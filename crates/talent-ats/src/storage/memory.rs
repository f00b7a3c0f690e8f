use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::RepositoryError;
use crate::workflows::intake::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus,
};

/// Process-local application store used by the memory and file backends.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    records: RwLock<HashMap<ApplicationId, ApplicationRecord>>,
}

impl InMemoryApplicationRepository {
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn insert(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(RepositoryError::Conflict(format!(
                "application {} exists",
                record.id
            )));
        }
        if records.values().any(|existing| existing.is_duplicate_of(&record)) {
            return Err(RepositoryError::Conflict(format!(
                "{} already applied",
                record.candidate_email()
            )));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(filter.apply(records.values().cloned()))
    }

    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        notes: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        if notes.is_some() {
            record.notes = notes;
        }
        record.updated_at = updated_at;
        Ok(record.clone())
    }
}
