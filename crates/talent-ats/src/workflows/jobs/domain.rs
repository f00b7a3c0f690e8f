use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::intake::FieldErrors;

/// Opaque job identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Internship,
    Remote,
}

impl JobType {
    pub const fn label(self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
            JobType::Remote => "Remote",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full-time" | "full time" | "fulltime" => Some(JobType::FullTime),
            "part-time" | "part time" | "parttime" => Some(JobType::PartTime),
            "contract" => Some(JobType::Contract),
            "internship" => Some(JobType::Internship),
            "remote" => Some(JobType::Remote),
            _ => None,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A published vacancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub posted_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_qualification: Option<String>,
    #[serde(default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn from_input(id: JobId, input: JobInput, now: DateTime<Utc>) -> Self {
        let posted_date = input.posted_date.unwrap_or_else(|| now.date_naive());
        Self {
            id,
            title: input.title.trim().to_string(),
            company: input.company.trim().to_string(),
            location: input.location.trim().to_string(),
            job_type: input.job_type,
            salary: non_blank(input.salary),
            description: input.description.trim().to_string(),
            requirements: input.requirements.into_items(),
            skills: input.skills.into_items(),
            posted_date,
            closing_date: input.closing_date,
            min_qualification: non_blank(input.min_qualification),
            years_of_experience: input.years_of_experience,
            featured: input.featured,
            logo: non_blank(input.logo),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields, keeping identity and creation time.
    pub fn apply(&mut self, input: JobInput, now: DateTime<Utc>) {
        let created_at = self.created_at;
        let posted_date = input.posted_date.unwrap_or(self.posted_date);
        *self = Job::from_input(self.id.clone(), input, now);
        self.created_at = created_at;
        self.posted_date = posted_date;
    }

    /// Applications are accepted up to and including the closing date.
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.closing_date.map_or(true, |closing| date <= closing)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Splits a comma-separated admin input into trimmed, non-empty items.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// List fields accept either a JSON array or the comma-separated text typed into the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<String>),
    Text(String),
}

impl Default for ListInput {
    fn default() -> Self {
        ListInput::Items(Vec::new())
    }
}

impl ListInput {
    pub fn into_items(self) -> Vec<String> {
        match self {
            ListInput::Items(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            ListInput::Text(raw) => parse_list(&raw),
        }
    }
}

/// Create/update body for a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobInput {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub salary: Option<String>,
    pub description: String,
    pub requirements: ListInput,
    pub skills: ListInput,
    pub posted_date: Option<NaiveDate>,
    pub closing_date: Option<NaiveDate>,
    pub min_qualification: Option<String>,
    pub years_of_experience: u32,
    pub featured: bool,
    pub logo: Option<String>,
}

impl JobInput {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for (field, value, message) in [
            ("title", &self.title, "Title is required"),
            ("company", &self.company, "Company is required"),
            ("location", &self.location, "Location is required"),
            ("description", &self.description, "Description is required"),
        ] {
            if value.trim().is_empty() {
                errors.insert(field, message);
            }
        }

        if let (Some(posted), Some(closing)) = (self.posted_date, self.closing_date) {
            if closing < posted {
                errors.insert("closingDate", "Closing date cannot be before posted date");
            }
        }
        errors
    }
}

/// Public listing filter. Every populated criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub skills: Vec<String>,
    pub featured_only: bool,
    pub open_on: Option<NaiveDate>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim) {
            let needle = search.to_lowercase();
            let hit = [&job.title, &job.company, &job.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !needle.is_empty() && !hit {
                return false;
            }
        }

        if let Some(location) = self.location.as_deref().map(str::trim) {
            if !location.is_empty()
                && !job
                    .location
                    .to_lowercase()
                    .contains(&location.to_lowercase())
            {
                return false;
            }
        }

        if self.job_type.is_some_and(|job_type| job_type != job.job_type) {
            return false;
        }

        let has_all_skills = self.skills.iter().all(|wanted| {
            job.skills
                .iter()
                .any(|skill| skill.eq_ignore_ascii_case(wanted.trim()))
        });
        if !has_all_skills {
            return false;
        }

        if self.featured_only && !job.featured {
            return false;
        }

        self.open_on.map_or(true, |date| job.is_open_on(date))
    }

    /// Filters and orders jobs newest first.
    pub fn apply(&self, jobs: impl IntoIterator<Item = Job>) -> Vec<Job> {
        let mut jobs: Vec<Job> = jobs.into_iter().filter(|job| self.matches(job)).collect();
        sort_newest_first(&mut jobs);
        jobs
    }
}

pub fn sort_newest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| {
        b.posted_date
            .cmp(&a.posted_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

struct Seed {
    title: &'static str,
    company: &'static str,
    location: &'static str,
    job_type: JobType,
    salary: &'static str,
    description: &'static str,
    requirements: &'static [&'static str],
    skills: &'static [&'static str],
    posted_days_ago: i64,
    featured: bool,
    years_of_experience: u32,
    min_qualification: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        title: "Senior Software Engineer",
        company: "Tech Innovations Inc.",
        location: "New York, NY",
        job_type: JobType::FullTime,
        salary: "$120,000 - $150,000",
        description: "Looking for a senior software engineer with expertise in React, Node.js, and cloud technologies.",
        requirements: &["5+ years of experience", "React", "Node.js", "AWS", "CI/CD"],
        skills: &["JavaScript", "TypeScript", "React", "Node.js", "AWS"],
        posted_days_ago: 7,
        featured: true,
        years_of_experience: 5,
        min_qualification: "Bachelor's Degree",
    },
    Seed {
        title: "UI/UX Designer",
        company: "Creative Solutions",
        location: "Remote",
        job_type: JobType::Contract,
        salary: "$80,000 - $100,000",
        description: "Seeking a talented UI/UX designer to create beautiful, intuitive interfaces for our products.",
        requirements: &["3+ years of experience", "Figma", "Adobe XD", "User Research"],
        skills: &["UI Design", "UX Research", "Figma", "Adobe XD", "Prototyping"],
        posted_days_ago: 2,
        featured: false,
        years_of_experience: 3,
        min_qualification: "Bachelor's Degree",
    },
    Seed {
        title: "Data Scientist",
        company: "Analytics Pro",
        location: "San Francisco, CA",
        job_type: JobType::FullTime,
        salary: "$130,000 - $160,000",
        description: "Join our data science team to build machine learning models and analyze large datasets.",
        requirements: &["Masters/PhD in relevant field", "Python", "Machine Learning", "SQL"],
        skills: &["Python", "TensorFlow", "SQL", "Data Visualization", "Machine Learning"],
        posted_days_ago: 4,
        featured: false,
        years_of_experience: 4,
        min_qualification: "Master's Degree",
    },
    Seed {
        title: "Product Manager",
        company: "Product Visionaries",
        location: "Chicago, IL",
        job_type: JobType::FullTime,
        salary: "$110,000 - $140,000",
        description: "Lead product development initiatives from conception to launch.",
        requirements: &[
            "4+ years in product management",
            "Agile methodologies",
            "Technical background",
        ],
        skills: &["Product Strategy", "Agile", "User Stories", "Roadmapping"],
        posted_days_ago: 0,
        featured: true,
        years_of_experience: 4,
        min_qualification: "Bachelor's Degree",
    },
];

/// Starter catalogue for empty local stores. Each posting runs for thirty days from its posted
/// date, counted from `now`.
pub fn default_catalogue(now: DateTime<Utc>) -> Vec<Job> {
    let today = now.date_naive();
    SEEDS
        .iter()
        .map(|seed| {
            let posted_date = today - Duration::days(seed.posted_days_ago);
            let input = JobInput {
                title: seed.title.to_string(),
                company: seed.company.to_string(),
                location: seed.location.to_string(),
                job_type: seed.job_type,
                salary: Some(seed.salary.to_string()),
                description: seed.description.to_string(),
                requirements: ListInput::Items(
                    seed.requirements.iter().map(|item| item.to_string()).collect(),
                ),
                skills: ListInput::Items(seed.skills.iter().map(|item| item.to_string()).collect()),
                posted_date: Some(posted_date),
                closing_date: Some(posted_date + Duration::days(30)),
                min_qualification: Some(seed.min_qualification.to_string()),
                years_of_experience: seed.years_of_experience,
                featured: seed.featured,
                logo: None,
            };
            Job::from_input(JobId::generate(), input, now)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn job(title: &str, posted: NaiveDate, skills: &[&str]) -> Job {
        let input = JobInput {
            title: title.to_string(),
            company: "County Government of Kisumu".to_string(),
            location: "Kisumu".to_string(),
            description: "Public service role".to_string(),
            skills: ListInput::Items(skills.iter().map(|s| s.to_string()).collect()),
            posted_date: Some(posted),
            ..JobInput::default()
        };
        Job::from_input(JobId::generate(), input, now())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn comma_lists_are_trimmed_and_compacted() {
        assert_eq!(
            parse_list(" Python, ,SQL ,Machine Learning,"),
            vec!["Python", "SQL", "Machine Learning"]
        );
        let parsed: JobInput =
            serde_json::from_str(r#"{"skills":"Rust, Go","requirements":["  A  ",""]}"#)
                .expect("input parses");
        assert_eq!(parsed.skills.into_items(), vec!["Rust", "Go"]);
        assert_eq!(parsed.requirements.into_items(), vec!["A"]);
    }

    #[test]
    fn job_type_uses_display_labels_on_the_wire() {
        assert_eq!(
            serde_json::to_value(JobType::PartTime).expect("serializes"),
            serde_json::json!("Part-time")
        );
        assert_eq!(JobType::from_label("full time"), Some(JobType::FullTime));
        assert_eq!(JobType::from_label("gig"), None);
    }

    #[test]
    fn input_requires_core_fields_and_date_order() {
        let errors = JobInput {
            posted_date: Some(date(2025, 3, 1)),
            closing_date: Some(date(2025, 2, 1)),
            ..JobInput::default()
        }
        .validate();
        for field in ["title", "company", "location", "description", "closingDate"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
    }

    #[test]
    fn closing_date_is_inclusive() {
        let mut posting = job("Clerk", date(2025, 3, 1), &[]);
        posting.closing_date = Some(date(2025, 3, 31));
        assert!(posting.is_open_on(date(2025, 3, 31)));
        assert!(!posting.is_open_on(date(2025, 4, 1)));
    }

    #[test]
    fn filter_requires_every_skill_and_sorts_newest_first() {
        let jobs = vec![
            job("Analyst", date(2025, 1, 5), &["SQL", "Python"]),
            job("Engineer", date(2025, 2, 5), &["python", "sql", "Rust"]),
            job("Designer", date(2025, 3, 5), &["Figma"]),
        ];
        let filter = JobFilter {
            skills: vec!["Python".to_string(), "SQL".to_string()],
            ..JobFilter::default()
        };
        let titles: Vec<_> = filter.apply(jobs).into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["Engineer", "Analyst"]);
    }

    #[test]
    fn search_covers_title_company_and_description() {
        let posting = job("Records Officer", date(2025, 1, 5), &[]);
        let by = |needle: &str| JobFilter {
            search: Some(needle.to_string()),
            ..JobFilter::default()
        };
        assert!(by("records").matches(&posting));
        assert!(by("kisumu").matches(&posting));
        assert!(by("public service").matches(&posting));
        assert!(!by("nairobi").matches(&posting));
    }

    #[test]
    fn update_keeps_identity_and_creation_time() {
        let mut posting = job("Clerk", date(2025, 1, 5), &[]);
        let id = posting.id.clone();
        let later = now() + Duration::days(2);
        posting.apply(
            JobInput {
                title: "Senior Clerk".to_string(),
                company: "County Government of Kisumu".to_string(),
                location: "Kisumu".to_string(),
                description: "Promoted role".to_string(),
                ..JobInput::default()
            },
            later,
        );
        assert_eq!(posting.id, id);
        assert_eq!(posting.title, "Senior Clerk");
        assert_eq!(posting.created_at, now());
        assert_eq!(posting.updated_at, later);
        assert_eq!(posting.posted_date, date(2025, 1, 5));
    }

    #[test]
    fn default_catalogue_is_open_today() {
        let catalogue = default_catalogue(now());
        assert_eq!(catalogue.len(), 4);
        assert!(catalogue.iter().all(|job| job.is_open_on(now().date_naive())));
    }
}
