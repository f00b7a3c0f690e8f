use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use talent_ats::auth::AuthService;
use talent_ats::config::{AuthConfig, StorageBackend, StorageConfig};
use talent_ats::error::AppError;
use talent_ats::storage::{
    postgres, InMemoryApplicationRepository, PostgresApplicationRepository,
    PostgresJobRepository,
};
use talent_ats::workflows::intake::{
    ApplicationRepository, ApplicationService, EmailNotification, NotificationError,
    NotificationPublisher,
};
use talent_ats::workflows::jobs::{
    default_catalogue, FileJobRepository, InMemoryJobRepository, JobCatalog, JobRepository,
};
use talent_ats::workflows::report::DashboardService;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Repositories selected by `STORAGE_BACKEND`.
#[derive(Clone)]
pub(crate) struct Backend {
    pub(crate) label: &'static str,
    pub(crate) jobs: Arc<dyn JobRepository>,
    pub(crate) applications: Arc<dyn ApplicationRepository>,
}

impl Backend {
    pub(crate) fn in_memory(seed_jobs: bool, now: DateTime<Utc>) -> Self {
        let jobs = if seed_jobs {
            InMemoryJobRepository::with_jobs(default_catalogue(now))
        } else {
            InMemoryJobRepository::default()
        };
        Self {
            label: "memory",
            jobs: Arc::new(jobs),
            applications: Arc::new(InMemoryApplicationRepository::default()),
        }
    }

    pub(crate) async fn connect(
        config: &StorageConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        let seed = if config.seed_jobs {
            default_catalogue(now)
        } else {
            Vec::new()
        };

        let backend = match &config.backend {
            StorageBackend::Memory => Self::in_memory(config.seed_jobs, now),
            StorageBackend::File { jobs_path } => {
                let jobs = FileJobRepository::open(jobs_path.clone(), seed).await?;
                info!(path = %jobs_path.display(), "job cache opened");
                Self {
                    label: config.backend.label(),
                    jobs: Arc::new(jobs),
                    applications: Arc::new(InMemoryApplicationRepository::default()),
                }
            }
            StorageBackend::Postgres { database_url } => {
                let pool = postgres::connect(database_url).await?;
                postgres::ensure_schema(&pool).await?;
                let jobs = PostgresJobRepository::new(pool.clone());
                let seeded = jobs.seed_if_empty(seed).await?;
                if seeded > 0 {
                    info!(seeded, "default job catalogue loaded into database");
                }
                Self {
                    label: config.backend.label(),
                    jobs: Arc::new(jobs),
                    applications: Arc::new(PostgresApplicationRepository::new(pool)),
                }
            }
        };
        Ok(backend)
    }
}

/// Everything the routers hold on to.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) jobs: Arc<JobCatalog>,
    pub(crate) applications: Arc<ApplicationService>,
    pub(crate) dashboard: Arc<DashboardService>,
    pub(crate) auth: Arc<AuthService>,
}

impl Services {
    pub(crate) fn new(
        backend: &Backend,
        notifications: Arc<dyn NotificationPublisher>,
        auth: &AuthConfig,
    ) -> Self {
        Self {
            jobs: Arc::new(JobCatalog::new(backend.jobs.clone())),
            applications: Arc::new(ApplicationService::new(
                backend.applications.clone(),
                backend.jobs.clone(),
                notifications,
            )),
            dashboard: Arc::new(DashboardService::new(
                backend.jobs.clone(),
                backend.applications.clone(),
            )),
            auth: Arc::new(AuthService::new(auth)),
        }
    }
}

/// Mail transport stand-in: notifications are written to the log.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogNotificationPublisher;

impl NotificationPublisher for LogNotificationPublisher {
    fn publish(&self, notification: EmailNotification) -> Result<(), NotificationError> {
        info!(
            template = %notification.template,
            recipients = ?notification.recipients,
            subject = %notification.subject,
            "email notification queued"
        );
        Ok(())
    }
}

/// Keeps notifications in memory so the demo can print them.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<EmailNotification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: EmailNotification) -> Result<(), NotificationError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotificationError::Transport("outbox lock poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<EmailNotification> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_seeds_the_catalogue() {
        let backend = Backend::in_memory(true, Utc::now());
        let jobs = backend
            .jobs
            .list(&Default::default())
            .await
            .expect("jobs listed");
        assert_eq!(backend.label, "memory");
        assert!(!jobs.is_empty());

        let empty = Backend::in_memory(false, Utc::now());
        assert!(empty
            .jobs
            .list(&Default::default())
            .await
            .expect("jobs listed")
            .is_empty());
    }

    #[test]
    fn dates_parse_from_iso_format() {
        assert_eq!(
            parse_date(" 2025-03-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"))
        );
        assert!(parse_date("01/03/2025").is_err());
    }
}
