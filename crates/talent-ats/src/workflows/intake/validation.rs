//! Per-step field validators.
//!
//! Every validator is a pure function returning the messages it collected; an empty map means
//! the input may be advanced past.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::domain::{
    EducationEntry, EntryId, ExperienceEntry, PersonalDetails, ProfessionalBodyEntry,
    PublicationEntry, RefereeEntry, ShortCourseEntry, StepId,
};

/// Scope used for single-form steps.
pub const FORM_SCOPE: &str = "form";
/// Scope used for errors that belong to a whole section rather than one entry.
pub const SECTION_SCOPE: &str = "section";

pub const TERMS_MESSAGE: &str = "You must accept the terms and conditions";

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
static URL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

fn url_pattern() -> &'static Regex {
    URL_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(https?://)?([\da-z.-]+)\.([a-z.]{2,6})([/\w .-]*)*/?$")
            .expect("url pattern compiles")
    })
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value.trim())
}

/// Optional field: blank is always valid.
pub fn is_valid_url(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || url_pattern().is_match(value)
}

/// Field name to message for one form or entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.insert(field, message);
        }
    }

    fn require_present<T>(&mut self, field: &'static str, value: &Option<T>, message: &str) {
        if value.is_none() {
            self.insert(field, message);
        }
    }

    fn require_email(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.insert(field, "Email is required");
        } else if !is_valid_email(value) {
            self.insert(field, "Email is invalid");
        }
    }
}

/// Errors of one step, bucketed by entry id (or [`FORM_SCOPE`] / [`SECTION_SCOPE`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StepErrors(BTreeMap<String, FieldErrors>);

impl StepErrors {
    pub fn from_form(errors: FieldErrors) -> Self {
        let mut step = Self::default();
        step.insert(FORM_SCOPE, errors);
        step
    }

    /// Records a bucket; empty buckets are dropped so emptiness always means "valid".
    pub fn insert(&mut self, scope: impl Into<String>, errors: FieldErrors) {
        if !errors.is_empty() {
            self.0.insert(scope.into(), errors);
        }
    }

    pub fn for_scope(&self, scope: &str) -> Option<&FieldErrors> {
        self.0.get(scope)
    }

    pub fn for_entry(&self, id: &EntryId) -> Option<&FieldErrors> {
        self.0.get(id.as_str())
    }

    pub fn remove_entry(&mut self, id: &EntryId) -> Option<FieldErrors> {
        self.0.remove(id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldErrors)> {
        self.0.iter().map(|(scope, errors)| (scope.as_str(), errors))
    }
}

/// Errors across the whole form, keyed by step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub steps: BTreeMap<StepId, StepErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

impl ValidationReport {
    pub fn insert(&mut self, step: StepId, errors: StepErrors) {
        if !errors.is_empty() {
            self.steps.insert(step, errors);
        }
    }

    pub fn step(&self, step: StepId) -> Option<&StepErrors> {
        self.steps.get(&step)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.terms.is_none()
    }

    /// First step carrying errors, in form order.
    pub fn first_invalid_step(&self) -> Option<StepId> {
        StepId::ordered()
            .into_iter()
            .find(|step| self.steps.contains_key(step))
    }
}

pub fn validate_personal(personal: &PersonalDetails) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("firstName", &personal.first_name, "First name is required");
    errors.require("lastName", &personal.last_name, "Last name is required");
    errors.require("address", &personal.address, "Address is required");
    errors.require("gender", &personal.gender, "Gender is required");
    errors.require_email("email", &personal.email);
    errors.require("phone", &personal.phone, "Phone number is required");
    errors.require_present(
        "dateOfBirth",
        &personal.date_of_birth,
        "Date of birth is required",
    );
    errors.require("ethnicity", &personal.ethnicity, "Ethnicity is required");
    errors.require("homeCountry", &personal.home_country, "Home country is required");
    errors.require("disability", &personal.disability, "This field is required");
    errors
}

pub fn validate_education(entry: &EducationEntry) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("level", &entry.level, "Education level is required");
    errors.require("institution", &entry.institution, "Institution is required");
    errors
}

pub fn validate_experience(entry: &ExperienceEntry) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("organization", &entry.organization, "Organization is required");
    errors.require("designation", &entry.designation, "Designation is required");
    errors.require("jobGroup", &entry.job_group, "Job group is required");
    errors.require_present("startDate", &entry.start_date, "Start date is required");

    if let (Some(start), Some(end)) = (entry.start_date, entry.end_date) {
        if end < start {
            errors.insert("endDate", "End date cannot be before start date");
        }
    }

    errors
}

pub fn validate_short_course(entry: &ShortCourseEntry) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("courseName", &entry.course_name, "Course name is required");
    errors.require_present(
        "completionDate",
        &entry.completion_date,
        "Completion date is required",
    );
    errors
}

pub fn validate_professional_body(entry: &ProfessionalBodyEntry) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("bodyName", &entry.body_name, "Professional body is required");
    errors.require_present(
        "membershipDate",
        &entry.membership_date,
        "Membership date is required",
    );
    errors
}

pub fn validate_publication(entry: &PublicationEntry) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("title", &entry.title, "Publication title is required");
    errors.require_present(
        "publicationDate",
        &entry.publication_date,
        "Publication date is required",
    );
    if let Some(url) = entry.url.as_deref() {
        if !is_valid_url(url) {
            errors.insert("url", "Please enter a valid URL");
        }
    }
    errors
}

pub fn validate_referee(entry: &RefereeEntry) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.require("name", &entry.name, "Name of referee is required");
    errors.require("designation", &entry.designation, "Designation is required");
    errors.require("organization", &entry.organization, "Organization is required");
    errors.require("mobile", &entry.mobile, "Mobile contact is required");
    errors.require_email("email", &entry.email);
    errors
}

/// Message reported when a required section has no entries at all.
pub fn empty_section_errors(step: StepId) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.insert(
        "entries",
        format!("At least one {} entry is required", step.entry_noun()),
    );
    errors
}
