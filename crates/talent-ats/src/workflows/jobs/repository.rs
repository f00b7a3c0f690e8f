use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::domain::{Job, JobFilter, JobId};
use crate::storage::{RepositoryError, StorageError};

/// Job catalogue storage. The implementation is chosen from configuration at start-up.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError>;
    async fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    async fn create(&self, job: Job) -> Result<Job, RepositoryError>;
    /// Replaces an existing job; `NotFound` when the id is unknown.
    async fn update(&self, job: Job) -> Result<Job, RepositoryError>;
    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<BTreeMap<JobId, Job>>,
}

impl InMemoryJobRepository {
    pub fn with_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        let jobs = jobs.into_iter().map(|job| (job.id.clone(), job)).collect();
        Self {
            jobs: RwLock::new(jobs),
        }
    }

    async fn snapshot(&self) -> Vec<Job> {
        self.jobs.read().await.values().cloned().collect()
    }
}

type JobMap = BTreeMap<JobId, Job>;

fn insert_job(jobs: &mut JobMap, job: Job) -> Result<Job, RepositoryError> {
    if jobs.contains_key(&job.id) {
        return Err(RepositoryError::Conflict(format!("job {} exists", job.id)));
    }
    jobs.insert(job.id.clone(), job.clone());
    Ok(job)
}

fn replace_job(jobs: &mut JobMap, job: Job) -> Result<Job, RepositoryError> {
    let slot = jobs.get_mut(&job.id).ok_or(RepositoryError::NotFound)?;
    *slot = job.clone();
    Ok(job)
}

fn remove_job(jobs: &mut JobMap, id: &JobId) -> Result<(), RepositoryError> {
    jobs.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError> {
        Ok(filter.apply(self.snapshot().await))
    }

    async fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn create(&self, job: Job) -> Result<Job, RepositoryError> {
        insert_job(&mut *self.jobs.write().await, job)
    }

    async fn update(&self, job: Job) -> Result<Job, RepositoryError> {
        replace_job(&mut *self.jobs.write().await, job)
    }

    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        remove_job(&mut *self.jobs.write().await, id)
    }
}

/// Job catalogue kept in a local JSON file, used when no database is configured.
///
/// The file is read once on open and rewritten after every change. Changes are applied to a
/// copy of the catalogue and only become visible once the file write has succeeded; the write
/// lock is held throughout, so writers are serialized.
#[derive(Debug)]
pub struct FileJobRepository {
    path: PathBuf,
    inner: InMemoryJobRepository,
}

impl FileJobRepository {
    /// Loads the cache, creating it from `seed` when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>, seed: Vec<Job>) -> Result<Self, StorageError> {
        let path = path.into();
        let jobs = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<Job>>(&bytes).map_err(|source| {
                StorageError::CacheFormat {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), seeded = seed.len(), "creating job cache");
                seed
            }
            Err(source) => return Err(StorageError::CacheIo { path, source }),
        };

        let repository = Self {
            inner: InMemoryJobRepository::with_jobs(jobs),
            path,
        };
        {
            let jobs = repository.inner.jobs.read().await;
            repository.write_file(&jobs).await?;
        }
        Ok(repository)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the catalogue, writes the copy, then publishes it.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut JobMap) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut jobs = self.inner.jobs.write().await;
        let mut next = jobs.clone();
        let outcome = change(&mut next)?;
        self.write_file(&next).await?;
        *jobs = next;
        Ok(outcome)
    }

    async fn write_file(&self, jobs: &JobMap) -> Result<(), RepositoryError> {
        let jobs: Vec<&Job> = jobs.values().collect();
        let bytes = serde_json::to_vec_pretty(&jobs)
            .map_err(|error| RepositoryError::Unavailable(error.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| RepositoryError::Unavailable(error.to_string()))?;
        }

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|error| RepositoryError::Unavailable(error.to_string()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|error| RepositoryError::Unavailable(error.to_string()))
    }
}

#[async_trait]
impl JobRepository for FileJobRepository {
    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError> {
        self.inner.list(filter).await
    }

    async fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.fetch(id).await
    }

    async fn create(&self, job: Job) -> Result<Job, RepositoryError> {
        self.commit(|jobs| insert_job(jobs, job)).await
    }

    async fn update(&self, job: Job) -> Result<Job, RepositoryError> {
        self.commit(|jobs| replace_job(jobs, job)).await
    }

    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        self.commit(|jobs| remove_job(jobs, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::jobs::domain::{default_catalogue, JobInput};
    use chrono::Utc;
    use std::sync::Arc;

    fn posting(title: &str) -> Job {
        let input = JobInput {
            title: title.to_string(),
            company: "Kenya Ports Authority".to_string(),
            location: "Mombasa".to_string(),
            description: "Port operations".to_string(),
            ..JobInput::default()
        };
        Job::from_input(JobId::generate(), input, Utc::now())
    }

    #[tokio::test]
    async fn memory_repository_round_trips_crud() {
        let repository = InMemoryJobRepository::default();
        let job = repository.create(posting("Crane Operator")).await.expect("created");

        let mut edited = job.clone();
        edited.title = "Senior Crane Operator".to_string();
        repository.update(edited).await.expect("updated");
        let fetched = repository.fetch(&job.id).await.expect("fetch").expect("exists");
        assert_eq!(fetched.title, "Senior Crane Operator");

        repository.delete(&job.id).await.expect("deleted");
        assert!(matches!(
            repository.delete(&job.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn updating_unknown_job_is_not_found() {
        let repository = InMemoryJobRepository::default();
        assert!(matches!(
            repository.update(posting("Ghost")).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn file_repository_seeds_then_reloads_changes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cache").join("jobs.json");

        let repository = FileJobRepository::open(&path, default_catalogue(Utc::now()))
            .await
            .expect("cache created");
        assert_eq!(
            repository.list(&JobFilter::default()).await.expect("list").len(),
            4
        );
        let created = repository.create(posting("Pilot")).await.expect("created");
        drop(repository);

        let reopened = FileJobRepository::open(&path, Vec::new())
            .await
            .expect("cache reloaded");
        assert_eq!(
            reopened.list(&JobFilter::default()).await.expect("list").len(),
            5
        );
        assert!(reopened.fetch(&created.id).await.expect("fetch").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_all_reach_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("jobs.json");
        let repository = Arc::new(
            FileJobRepository::open(&path, Vec::new())
                .await
                .expect("cache created"),
        );

        let mut handles = Vec::new();
        for index in 0..64 {
            let repository = repository.clone();
            handles.push(tokio::spawn(async move {
                repository.create(posting(&format!("Clerk {index}"))).await
            }));
        }
        for handle in handles {
            handle.await.expect("task joined").expect("create succeeded");
        }
        assert_eq!(
            repository.list(&JobFilter::default()).await.expect("list").len(),
            64
        );

        let reopened = FileJobRepository::open(&path, Vec::new())
            .await
            .expect("cache reloaded");
        assert_eq!(
            reopened.list(&JobFilter::default()).await.expect("list").len(),
            64
        );
    }

    #[tokio::test]
    async fn failed_write_leaves_the_catalogue_unchanged() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("jobs.json");
        let repository = FileJobRepository::open(&path, Vec::new())
            .await
            .expect("cache created");

        // A directory where the staging file should go makes the write fail.
        tokio::fs::create_dir(path.with_extension("json.tmp"))
            .await
            .expect("blocker created");
        assert!(matches!(
            repository.create(posting("Harbour Pilot")).await,
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(repository
            .list(&JobFilter::default())
            .await
            .expect("list")
            .is_empty());
    }

    #[tokio::test]
    async fn corrupt_cache_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("jobs.json");
        tokio::fs::write(&path, b"{not json").await.expect("write");

        let error = FileJobRepository::open(&path, Vec::new())
            .await
            .expect_err("invalid cache");
        assert!(matches!(error, StorageError::CacheFormat { .. }));
    }
}
