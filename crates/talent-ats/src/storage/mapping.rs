//! Row <-> domain conversions. Column names are snake_case; the domain and the JSON payload
//! column stay camelCase. No other module spells out column names.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use super::RepositoryError;
use crate::workflows::intake::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CandidateId, PersonalDetails,
    SubmissionPayload, TotalExperience,
};
use crate::workflows::jobs::{Job, JobId, JobType};

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("unknown job type '{0}'")]
    UnknownJobType(String),
    #[error("unknown application status '{0}'")]
    UnknownStatus(String),
    #[error("column {0} is out of range")]
    OutOfRange(&'static str),
    #[error("payload column is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<MappingError> for RepositoryError {
    fn from(value: MappingError) -> Self {
        RepositoryError::Unavailable(format!("corrupt row: {value}"))
    }
}

pub fn encode_job_type(job_type: JobType) -> &'static str {
    job_type.label()
}

pub fn decode_job_type(value: &str) -> Result<JobType, MappingError> {
    JobType::from_label(value).ok_or_else(|| MappingError::UnknownJobType(value.to_string()))
}

pub fn encode_status(status: ApplicationStatus) -> &'static str {
    status.code()
}

pub fn decode_status(value: &str) -> Result<ApplicationStatus, MappingError> {
    ApplicationStatus::from_code(value)
        .ok_or_else(|| MappingError::UnknownStatus(value.to_string()))
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct JobRow {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub posted_date: NaiveDate,
    pub closing_date: Option<NaiveDate>,
    pub min_qualification: Option<String>,
    pub years_of_experience: i32,
    pub featured: bool,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRow {
    pub fn from_job(job: &Job) -> Result<Self, MappingError> {
        Ok(Self {
            id: job.id.0.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: encode_job_type(job.job_type).to_string(),
            salary: job.salary.clone(),
            description: job.description.clone(),
            requirements: job.requirements.clone(),
            skills: job.skills.clone(),
            posted_date: job.posted_date,
            closing_date: job.closing_date,
            min_qualification: job.min_qualification.clone(),
            years_of_experience: i32::try_from(job.years_of_experience)
                .map_err(|_| MappingError::OutOfRange("years_of_experience"))?,
            featured: job.featured,
            logo: job.logo.clone(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }

    pub fn into_job(self) -> Result<Job, MappingError> {
        Ok(Job {
            id: JobId(self.id),
            title: self.title,
            company: self.company,
            location: self.location,
            job_type: decode_job_type(&self.job_type)?,
            salary: self.salary,
            description: self.description,
            requirements: self.requirements,
            skills: self.skills,
            posted_date: self.posted_date,
            closing_date: self.closing_date,
            min_qualification: self.min_qualification,
            years_of_experience: u32::try_from(self.years_of_experience)
                .map_err(|_| MappingError::OutOfRange("years_of_experience"))?,
            featured: self.featured,
            logo: self.logo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Candidate columns denormalised out of the personal step.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub ethnicity: String,
    pub home_country: String,
    pub disability: String,
    pub created_at: DateTime<Utc>,
}

impl CandidateRow {
    pub fn from_personal(
        id: &CandidateId,
        personal: &PersonalDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.0.clone(),
            first_name: personal.first_name.trim().to_string(),
            middle_name: personal
                .middle_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            last_name: personal.last_name.trim().to_string(),
            email: personal.email.trim().to_string(),
            phone: personal.phone.trim().to_string(),
            address: personal.address.clone(),
            gender: personal.gender.clone(),
            date_of_birth: personal.date_of_birth,
            ethnicity: personal.ethnicity.clone(),
            home_country: personal.home_country.clone(),
            disability: personal.disability.clone(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ApplicationRow {
    pub id: String,
    pub candidate_id: String,
    pub job_id: Option<String>,
    pub candidate_email: String,
    pub status: String,
    pub notes: Option<String>,
    pub experience_months: i32,
    pub payload: Value,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    pub fn from_record(record: &ApplicationRecord) -> Result<Self, MappingError> {
        Ok(Self {
            id: record.id.0.clone(),
            candidate_id: record.candidate_id.0.clone(),
            job_id: record.job_id.as_ref().map(|job| job.0.clone()),
            candidate_email: record.candidate_email().to_string(),
            status: encode_status(record.status).to_string(),
            notes: record.notes.clone(),
            experience_months: i32::try_from(record.total_experience.total_months())
                .map_err(|_| MappingError::OutOfRange("experience_months"))?,
            payload: serde_json::to_value(&record.payload)?,
            submitted_at: record.submitted_at,
            updated_at: record.updated_at,
        })
    }

    pub fn into_record(self) -> Result<ApplicationRecord, MappingError> {
        let payload: SubmissionPayload = serde_json::from_value(self.payload)?;
        let months = u32::try_from(self.experience_months)
            .map_err(|_| MappingError::OutOfRange("experience_months"))?;
        Ok(ApplicationRecord {
            id: ApplicationId(self.id),
            candidate_id: CandidateId(self.candidate_id),
            job_id: self.job_id.map(JobId),
            status: decode_status(&self.status)?,
            notes: self.notes,
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
            total_experience: TotalExperience::from_months(months),
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::{EntryId, ExperienceEntry};
    use crate::workflows::jobs::JobInput;

    fn record() -> ApplicationRecord {
        let payload = SubmissionPayload {
            personal: PersonalDetails {
                first_name: "Brian".to_string(),
                last_name: "Mwangi".to_string(),
                email: "brian.mwangi@example.com".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1992, 8, 1),
                ..PersonalDetails::default()
            },
            experience: vec![ExperienceEntry {
                id: EntryId("experience-1".to_string()),
                organization: "Safaricom".to_string(),
                designation: "Engineer".to_string(),
                job_group: "M".to_string(),
                start_date: NaiveDate::from_ymd_opt(2018, 1, 1),
                end_date: NaiveDate::from_ymd_opt(2021, 7, 1),
            }],
            job_id: Some(JobId("job-7".to_string())),
            ..SubmissionPayload::default()
        };
        ApplicationRecord::new(payload, Utc::now())
    }

    #[test]
    fn application_row_keeps_payload_camel_case() {
        let record = record();
        let row = ApplicationRow::from_record(&record).expect("encodes");
        assert_eq!(row.status, "applied");
        assert_eq!(row.experience_months, 42);
        assert_eq!(row.payload["personal"]["firstName"], "Brian");
        assert_eq!(row.payload["experience"][0]["jobGroup"], "M");

        let restored = row.into_record().expect("decodes");
        assert_eq!(restored, record);
    }

    #[test]
    fn job_row_encodes_type_label() {
        let input = JobInput {
            title: "Driver".to_string(),
            company: "Kenya Power".to_string(),
            location: "Nakuru".to_string(),
            description: "Fleet operations".to_string(),
            job_type: JobType::PartTime,
            years_of_experience: 2,
            ..JobInput::default()
        };
        let job = Job::from_input(JobId("job-1".to_string()), input, Utc::now());
        let row = JobRow::from_job(&job).expect("encodes");
        assert_eq!(row.job_type, "Part-time");
        assert_eq!(row.into_job().expect("decodes"), job);
    }

    #[test]
    fn unknown_codes_are_reported() {
        assert!(matches!(
            decode_status("archived"),
            Err(MappingError::UnknownStatus(code)) if code == "archived"
        ));
        assert!(matches!(
            decode_job_type("gig"),
            Err(MappingError::UnknownJobType(_))
        ));

        let mut row = ApplicationRow::from_record(&record()).expect("encodes");
        row.experience_months = -1;
        assert!(matches!(
            row.into_record(),
            Err(MappingError::OutOfRange("experience_months"))
        ));
    }
}
