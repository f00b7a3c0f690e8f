use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflows::jobs::JobId;

/// Steps of the application form, in the only order they can be walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    Personal,
    Education,
    Experience,
    ShortCourses,
    ProfessionalBodies,
    Publications,
    Referees,
}

impl StepId {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Personal,
            Self::Education,
            Self::Experience,
            Self::ShortCourses,
            Self::ProfessionalBodies,
            Self::Publications,
            Self::Referees,
        ]
    }

    pub const fn first() -> Self {
        Self::Personal
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Education => "education",
            Self::Experience => "experience",
            Self::ShortCourses => "short-courses",
            Self::ProfessionalBodies => "professional-bodies",
            Self::Publications => "publications",
            Self::Referees => "referees",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Education => "Education",
            Self::Experience => "Experience",
            Self::ShortCourses => "Short Courses",
            Self::ProfessionalBodies => "Professional Bodies",
            Self::Publications => "Publications",
            Self::Referees => "Referees",
        }
    }

    /// Singular noun for one entry of the step.
    pub const fn entry_noun(self) -> &'static str {
        match self {
            Self::Personal => "personal detail",
            Self::Education => "education",
            Self::Experience => "experience",
            Self::ShortCourses => "short course",
            Self::ProfessionalBodies => "professional body",
            Self::Publications => "publication",
            Self::Referees => "referee",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|step| step.key() == key.trim())
    }

    fn position(self) -> usize {
        Self::ordered()
            .iter()
            .position(|step| *step == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Option<Self> {
        Self::ordered().get(self.position() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.position()
            .checked_sub(1)
            .and_then(|index| Self::ordered().get(index).copied())
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    /// Sections the candidate may answer "none" to.
    pub const fn allows_none(self) -> bool {
        matches!(self, Self::ProfessionalBodies | Self::Publications)
    }

    /// Steps backed by a repeatable entry collection.
    pub const fn is_collection(self) -> bool {
        !matches!(self, Self::Personal)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Locally unique entry identifier, stable for the lifetime of a form session.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference handed out by the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentRef(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub address: String,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub ethnicity: String,
    pub home_country: String,
    pub disability: String,
}

impl PersonalDetails {
    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.trim()),
            self.middle_name.as_deref().map(str::trim),
            Some(self.last_name.trim()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: EntryId,
    pub level: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_ref: Option<AttachmentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: EntryId,
    pub organization: String,
    pub designation: String,
    pub job_group: String,
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShortCourseEntry {
    pub id: EntryId,
    pub course_name: String,
    pub completion_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_ref: Option<AttachmentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessionalBodyEntry {
    pub id: EntryId,
    pub body_name: String,
    pub membership_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_ref: Option<AttachmentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationEntry {
    pub id: EntryId,
    pub title: String,
    pub publication_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefereeEntry {
    pub id: EntryId,
    pub name: String,
    pub designation: String,
    pub organization: String,
    pub mobile: String,
    pub email: String,
}

/// Data submitted when completing one step of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "kebab-case")]
pub enum StepData {
    Personal(PersonalDetails),
    Education(Vec<EducationEntry>),
    Experience(Vec<ExperienceEntry>),
    ShortCourses(Vec<ShortCourseEntry>),
    ProfessionalBodies(Vec<ProfessionalBodyEntry>),
    Publications(Vec<PublicationEntry>),
    Referees(Vec<RefereeEntry>),
}

impl StepData {
    pub const fn step(&self) -> StepId {
        match self {
            StepData::Personal(_) => StepId::Personal,
            StepData::Education(_) => StepId::Education,
            StepData::Experience(_) => StepId::Experience,
            StepData::ShortCourses(_) => StepId::ShortCourses,
            StepData::ProfessionalBodies(_) => StepId::ProfessionalBodies,
            StepData::Publications(_) => StepId::Publications,
            StepData::Referees(_) => StepId::Referees,
        }
    }
}

/// Normalized payload handed to the persistence adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(default)]
    pub personal: PersonalDetails,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub short_courses: Vec<ShortCourseEntry>,
    #[serde(default)]
    pub professional_bodies: Vec<ProfessionalBodyEntry>,
    #[serde(default)]
    pub publications: Vec<PublicationEntry>,
    #[serde(default)]
    pub referees: Vec<RefereeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

/// Public request body: the full payload plus the terms checkbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    #[serde(flatten)]
    pub payload: SubmissionPayload,
    #[serde(default)]
    pub terms_accepted: bool,
}
