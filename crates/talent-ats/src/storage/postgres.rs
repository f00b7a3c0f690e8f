use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::mapping::{encode_status, ApplicationRow, CandidateRow, JobRow};
use super::{RepositoryError, StorageError};
use crate::workflows::intake::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus,
};
use crate::workflows::jobs::{Job, JobFilter, JobId, JobRepository};

const UNIQUE_VIOLATION: &str = "23505";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        company TEXT NOT NULL,
        location TEXT NOT NULL,
        job_type TEXT NOT NULL,
        salary TEXT,
        description TEXT NOT NULL,
        requirements TEXT[] NOT NULL DEFAULT '{}',
        skills TEXT[] NOT NULL DEFAULT '{}',
        posted_date DATE NOT NULL,
        closing_date DATE,
        min_qualification TEXT,
        years_of_experience INTEGER NOT NULL DEFAULT 0,
        featured BOOLEAN NOT NULL DEFAULT FALSE,
        logo TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS candidates (
        id TEXT PRIMARY KEY,
        first_name TEXT NOT NULL,
        middle_name TEXT,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        address TEXT NOT NULL,
        gender TEXT NOT NULL,
        date_of_birth DATE,
        ethnicity TEXT NOT NULL,
        home_country TEXT NOT NULL,
        disability TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id TEXT PRIMARY KEY,
        candidate_id TEXT NOT NULL REFERENCES candidates (id),
        job_id TEXT,
        candidate_email TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'applied',
        notes TEXT,
        experience_months INTEGER NOT NULL DEFAULT 0,
        payload JSONB NOT NULL,
        submitted_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS applications_candidate_job_idx
        ON applications (lower(candidate_email), COALESCE(job_id, ''))
    "#,
    "CREATE INDEX IF NOT EXISTS applications_submitted_idx ON applications (submitted_at DESC)",
];

/// Creates the PostgreSQL connection pool.
pub async fn connect(database_url: &str) -> Result<PgPool, StorageError> {
    tracing::info!("connecting to PostgreSQL");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(StorageError::Connect)?;
    tracing::info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Idempotent schema bootstrap.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StorageError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(StorageError::Schema)?;
    }
    Ok(())
}

fn map_error(error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(database) = &error {
        if database.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return RepositoryError::Conflict(database.message().to_string());
        }
    }
    tracing::error!(%error, "database operation failed");
    RepositoryError::Unavailable(error.to_string())
}

#[derive(Debug, Clone)]
pub struct PostgresJobRepository {
    pool: PgPool,
}

impl PostgresJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts `jobs` only when the table holds no rows yet.
    pub async fn seed_if_empty(&self, jobs: Vec<Job>) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(map_error)?;
        if count > 0 {
            return Ok(0);
        }

        let seeded = jobs.len();
        for job in jobs {
            self.create(job).await?;
        }
        tracing::info!(seeded, "seeded job catalogue");
        Ok(seeded)
    }
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs ORDER BY posted_date DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_error)?;

        let jobs = rows
            .into_iter()
            .map(JobRow::into_job)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(filter.apply(jobs))
    }

    async fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_error)?;
        Ok(row.map(JobRow::into_job).transpose()?)
    }

    async fn create(&self, job: Job) -> Result<Job, RepositoryError> {
        let row = JobRow::from_job(&job)?;
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, title, company, location, job_type, salary, description, requirements,
                 skills, posted_date, closing_date, min_qualification, years_of_experience,
                 featured, logo, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&row.id)
        .bind(&row.title)
        .bind(&row.company)
        .bind(&row.location)
        .bind(&row.job_type)
        .bind(&row.salary)
        .bind(&row.description)
        .bind(&row.requirements)
        .bind(&row.skills)
        .bind(row.posted_date)
        .bind(row.closing_date)
        .bind(&row.min_qualification)
        .bind(row.years_of_experience)
        .bind(row.featured)
        .bind(&row.logo)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_error)?;
        Ok(job)
    }

    async fn update(&self, job: Job) -> Result<Job, RepositoryError> {
        let row = JobRow::from_job(&job)?;
        let result = sqlx::query(
            r#"
            UPDATE jobs SET
                title = $2, company = $3, location = $4, job_type = $5, salary = $6,
                description = $7, requirements = $8, skills = $9, posted_date = $10,
                closing_date = $11, min_qualification = $12, years_of_experience = $13,
                featured = $14, logo = $15, updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(&row.id)
        .bind(&row.title)
        .bind(&row.company)
        .bind(&row.location)
        .bind(&row.job_type)
        .bind(&row.salary)
        .bind(&row.description)
        .bind(&row.requirements)
        .bind(&row.skills)
        .bind(row.posted_date)
        .bind(row.closing_date)
        .bind(&row.min_qualification)
        .bind(row.years_of_experience)
        .bind(row.featured)
        .bind(&row.logo)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(job)
    }

    async fn delete(&self, id: &JobId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(&id.0)
            .execute(&self.pool)
            .await
            .map_err(map_error)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresApplicationRepository {
    pool: PgPool,
}

impl PostgresApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PostgresApplicationRepository {
    /// Writes the candidate and the application in one transaction.
    async fn insert(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let candidate = CandidateRow::from_personal(
            &record.candidate_id,
            &record.payload.personal,
            record.submitted_at,
        );
        let row = ApplicationRow::from_record(&record)?;

        let mut tx = self.pool.begin().await.map_err(map_error)?;
        sqlx::query(
            r#"
            INSERT INTO candidates
                (id, first_name, middle_name, last_name, email, phone, address, gender,
                 date_of_birth, ethnicity, home_country, disability, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&candidate.id)
        .bind(&candidate.first_name)
        .bind(&candidate.middle_name)
        .bind(&candidate.last_name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(&candidate.address)
        .bind(&candidate.gender)
        .bind(candidate.date_of_birth)
        .bind(&candidate.ethnicity)
        .bind(&candidate.home_country)
        .bind(&candidate.disability)
        .bind(candidate.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_error)?;

        sqlx::query(
            r#"
            INSERT INTO applications
                (id, candidate_id, job_id, candidate_email, status, notes, experience_months,
                 payload, submitted_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&row.id)
        .bind(&row.candidate_id)
        .bind(&row.job_id)
        .bind(&row.candidate_email)
        .bind(&row.status)
        .bind(&row.notes)
        .bind(row.experience_months)
        .bind(&row.payload)
        .bind(row.submitted_at)
        .bind(row.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_error)?;

        tx.commit().await.map_err(map_error)?;
        Ok(record)
    }

    async fn fetch(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_error)?;
        Ok(row.map(ApplicationRow::into_record).transpose()?)
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let limit = filter
            .limit
            .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM applications
            WHERE ($1::TEXT IS NULL OR job_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::TEXT IS NULL OR lower(candidate_email) = lower($3))
            ORDER BY submitted_at DESC
            LIMIT $4
            "#,
        )
        .bind(filter.job_id.as_ref().map(|job| job.0.clone()))
        .bind(filter.status.map(encode_status))
        .bind(
            filter
                .email
                .as_deref()
                .map(str::trim)
                .filter(|email| !email.is_empty()),
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_error)?;

        Ok(rows
            .into_iter()
            .map(ApplicationRow::into_record)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        notes: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET status = $2, notes = COALESCE($3, notes), updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(&id.0)
        .bind(encode_status(status))
        .bind(notes)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_error)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into_record()?)
    }
}
