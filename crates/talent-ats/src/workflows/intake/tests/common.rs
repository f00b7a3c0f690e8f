use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;

use crate::auth::{hash_password_with_salt, AuthService};
use crate::config::AuthConfig;
use crate::storage::InMemoryApplicationRepository;
use crate::workflows::intake::domain::{
    ApplicationRequest, EducationEntry, EntryId, ExperienceEntry, PersonalDetails,
    RefereeEntry, ShortCourseEntry, SubmissionPayload,
};
use crate::workflows::intake::repository::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationRepository,
    ApplicationStatus, EmailNotification, NotificationError, NotificationPublisher,
    RepositoryError,
};
use crate::workflows::intake::service::ApplicationService;
use crate::workflows::jobs::{InMemoryJobRepository, Job, JobId, JobInput, JobRepository};

pub(super) const ADMIN_PASSWORD: &str = "pipeline-review";

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn personal() -> PersonalDetails {
    PersonalDetails {
        first_name: "Wanjiru".to_string(),
        middle_name: Some("Njeri".to_string()),
        last_name: "Kamau".to_string(),
        address: "P.O. Box 4521-00100, Nairobi".to_string(),
        gender: "female".to_string(),
        email: "wanjiru.kamau@example.com".to_string(),
        phone: "+254712345678".to_string(),
        date_of_birth: Some(date(1991, 2, 14)),
        ethnicity: "Kikuyu".to_string(),
        home_country: "Kenya".to_string(),
        disability: "no".to_string(),
    }
}

pub(super) fn education() -> EducationEntry {
    EducationEntry {
        id: EntryId("education-1".to_string()),
        level: "Bachelor's Degree".to_string(),
        institution: "University of Nairobi".to_string(),
        field_of_study: Some("Economics".to_string()),
        graduation_date: Some(date(2013, 12, 6)),
        certificate_ref: None,
    }
}

pub(super) fn experience() -> ExperienceEntry {
    ExperienceEntry {
        id: EntryId("experience-1".to_string()),
        organization: "National Treasury".to_string(),
        designation: "Economist II".to_string(),
        job_group: "K".to_string(),
        start_date: Some(date(2014, 3, 1)),
        end_date: Some(date(2019, 9, 1)),
    }
}

pub(super) fn short_course() -> ShortCourseEntry {
    ShortCourseEntry {
        id: EntryId("course-1".to_string()),
        course_name: "Public Financial Management".to_string(),
        completion_date: Some(date(2016, 5, 20)),
        certificate_ref: None,
    }
}

pub(super) fn referee(index: u32) -> RefereeEntry {
    RefereeEntry {
        id: EntryId(format!("referee-{index}")),
        name: format!("Referee {index}"),
        designation: "Director".to_string(),
        organization: "Kenya School of Government".to_string(),
        mobile: "+254700000000".to_string(),
        email: format!("referee{index}@example.org"),
    }
}

pub(super) fn payload(job_id: Option<JobId>) -> SubmissionPayload {
    SubmissionPayload {
        personal: personal(),
        education: vec![education()],
        experience: vec![experience()],
        short_courses: vec![short_course()],
        professional_bodies: Vec::new(),
        publications: Vec::new(),
        referees: vec![referee(1), referee(2)],
        job_id,
    }
}

pub(super) fn request(job_id: Option<JobId>) -> ApplicationRequest {
    ApplicationRequest {
        payload: payload(job_id),
        terms_accepted: true,
    }
}

pub(super) fn job(title: &str, closing_date: Option<NaiveDate>) -> Job {
    let input = JobInput {
        title: title.to_string(),
        company: "Public Service Commission".to_string(),
        location: "Nairobi".to_string(),
        description: "Policy analysis for the county treasury".to_string(),
        posted_date: Some(Utc::now().date_naive() - Duration::days(10)),
        closing_date,
        ..JobInput::default()
    };
    Job::from_input(JobId::generate(), input, Utc::now())
}

pub(super) struct Harness {
    pub(super) service: Arc<ApplicationService>,
    pub(super) applications: Arc<InMemoryApplicationRepository>,
    pub(super) notifications: Arc<MemoryNotifications>,
    pub(super) open_job: Job,
    pub(super) closed_job: Job,
}

pub(super) async fn harness() -> Harness {
    let today = Utc::now().date_naive();
    let open_job = job("Senior Economist", Some(today + Duration::days(20)));
    let closed_job = job("Budget Officer", Some(today - Duration::days(1)));
    let jobs = Arc::new(InMemoryJobRepository::default());
    jobs.create(open_job.clone()).await.expect("job stored");
    jobs.create(closed_job.clone()).await.expect("job stored");

    let applications = Arc::new(InMemoryApplicationRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = Arc::new(ApplicationService::new(
        applications.clone(),
        jobs,
        notifications.clone(),
    ));

    Harness {
        service,
        applications,
        notifications,
        open_job,
        closed_job,
    }
}

pub(super) fn service_with(
    applications: Arc<dyn ApplicationRepository>,
) -> Arc<ApplicationService> {
    Arc::new(ApplicationService::new(
        applications,
        Arc::new(InMemoryJobRepository::default()),
        Arc::new(MemoryNotifications::default()),
    ))
}

pub(super) async fn admin_session() -> (Arc<AuthService>, String) {
    let auth = Arc::new(AuthService::new(&AuthConfig {
        admin_username: "admin".to_string(),
        admin_password_hash: Some(
            hash_password_with_salt(ADMIN_PASSWORD, "intake-tests").expect("hashed"),
        ),
        session_ttl_minutes: 60,
    }));
    let session = auth
        .login("admin", ADMIN_PASSWORD, Utc::now())
        .await
        .expect("admin login");
    (auth, session.token)
}

#[derive(Default)]
pub(super) struct MemoryNotifications {
    events: Mutex<Vec<EmailNotification>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<EmailNotification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notification: EmailNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineMailer;

impl NotificationPublisher for OfflineMailer {
    fn publish(&self, _notification: EmailNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp timeout".to_string()))
    }
}

pub(super) struct ConflictRepository;

#[async_trait]
impl ApplicationRepository for ConflictRepository {
    async fn insert(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Conflict(format!(
            "{} already applied",
            record.candidate_email()
        )))
    }

    async fn fetch(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
        _notes: Option<String>,
        _updated_at: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl ApplicationRepository for UnavailableRepository {
    async fn insert(
        &self,
        _record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn list(
        &self,
        _filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
        _notes: Option<String>,
        _updated_at: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
