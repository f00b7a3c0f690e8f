use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::domain::{
    EducationEntry, EntryId, ExperienceEntry, PersonalDetails, ProfessionalBodyEntry,
    PublicationEntry, RefereeEntry, ShortCourseEntry, StepData, StepId, SubmissionPayload,
};
use super::entries::{EntryCollection, EntryError};
use super::experience::{total_experience, TotalExperience};
use super::validation::{validate_personal, StepErrors, ValidationReport, TERMS_MESSAGE};
use crate::workflows::jobs::JobId;

/// In-progress application, owned by a single form session.
#[derive(Debug, Clone)]
pub struct ApplicationDraft {
    pub personal: PersonalDetails,
    pub education: EntryCollection<EducationEntry>,
    pub experience: EntryCollection<ExperienceEntry>,
    pub short_courses: EntryCollection<ShortCourseEntry>,
    pub professional_bodies: EntryCollection<ProfessionalBodyEntry>,
    pub publications: EntryCollection<PublicationEntry>,
    pub referees: EntryCollection<RefereeEntry>,
    pub terms_accepted: bool,
    pub job_id: Option<JobId>,
}

impl ApplicationDraft {
    pub fn new(job_id: Option<JobId>) -> Self {
        Self {
            personal: PersonalDetails::default(),
            education: EntryCollection::initial(),
            experience: EntryCollection::initial(),
            short_courses: EntryCollection::initial(),
            professional_bodies: EntryCollection::initial(),
            publications: EntryCollection::initial(),
            referees: EntryCollection::initial(),
            terms_accepted: false,
            job_id,
        }
    }

    pub fn from_payload(payload: SubmissionPayload) -> Self {
        Self {
            personal: payload.personal,
            education: EntryCollection::from_entries(payload.education),
            experience: EntryCollection::from_entries(payload.experience),
            short_courses: EntryCollection::from_entries(payload.short_courses),
            professional_bodies: EntryCollection::from_entries(payload.professional_bodies),
            publications: EntryCollection::from_entries(payload.publications),
            referees: EntryCollection::from_entries(payload.referees),
            terms_accepted: false,
            job_id: payload.job_id,
        }
    }

    pub fn to_payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            personal: self.personal.clone(),
            education: self.education.to_vec(),
            experience: self.experience.to_vec(),
            short_courses: self.short_courses.to_vec(),
            professional_bodies: self.professional_bodies.to_vec(),
            publications: self.publications.to_vec(),
            referees: self.referees.to_vec(),
            job_id: self.job_id.clone(),
        }
    }

    /// Merges one step's data into the draft.
    pub fn apply(&mut self, data: StepData) {
        match data {
            StepData::Personal(personal) => self.personal = personal,
            StepData::Education(entries) => self.education.replace(entries),
            StepData::Experience(entries) => self.experience.replace(entries),
            StepData::ShortCourses(entries) => self.short_courses.replace(entries),
            StepData::ProfessionalBodies(entries) => self.professional_bodies.replace(entries),
            StepData::Publications(entries) => self.publications.replace(entries),
            StepData::Referees(entries) => self.referees.replace(entries),
        }
    }

    pub fn validate_step(&self, step: StepId) -> StepErrors {
        match step {
            StepId::Personal => StepErrors::from_form(validate_personal(&self.personal)),
            StepId::Education => self.education.validate(),
            StepId::Experience => self.experience.validate(),
            StepId::ShortCourses => self.short_courses.validate(),
            StepId::ProfessionalBodies => self.professional_bodies.validate(),
            StepId::Publications => self.publications.validate(),
            StepId::Referees => self.referees.validate(),
        }
    }

    /// Validates every step and the terms checkbox.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        for step in StepId::ordered() {
            report.insert(step, self.validate_step(step));
        }
        if !self.terms_accepted {
            report.terms = Some(TERMS_MESSAGE.to_string());
        }
        report
    }

    pub fn total_experience(&self, today: NaiveDate) -> TotalExperience {
        total_experience(self.experience.entries(), today)
    }
}

/// Step controller state: where the user is and what has been completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepState {
    pub active: StepId,
    pub completed: BTreeSet<StepId>,
    pub errors: BTreeMap<StepId, StepErrors>,
}

impl Default for StepState {
    fn default() -> Self {
        Self {
            active: StepId::first(),
            completed: BTreeSet::new(),
            errors: BTreeMap::new(),
        }
    }
}

macro_rules! on_collection {
    ($draft:expr, $step:expr, |$collection:ident| $body:expr) => {
        match $step {
            StepId::Personal => Err(EntryError::NotACollection {
                step: StepId::Personal,
            }),
            StepId::Education => {
                let $collection = &mut $draft.education;
                $body
            }
            StepId::Experience => {
                let $collection = &mut $draft.experience;
                $body
            }
            StepId::ShortCourses => {
                let $collection = &mut $draft.short_courses;
                $body
            }
            StepId::ProfessionalBodies => {
                let $collection = &mut $draft.professional_bodies;
                $body
            }
            StepId::Publications => {
                let $collection = &mut $draft.publications;
                $body
            }
            StepId::Referees => {
                let $collection = &mut $draft.referees;
                $body
            }
        }
    };
}

/// Multi-step application form controller.
///
/// Navigation never validates; completing a step does. A step only counts as completed while
/// its data is valid.
#[derive(Debug, Clone)]
pub struct ApplicationWizard {
    draft: ApplicationDraft,
    state: StepState,
}

impl ApplicationWizard {
    pub fn new(job_id: Option<JobId>) -> Self {
        Self {
            draft: ApplicationDraft::new(job_id),
            state: StepState::default(),
        }
    }

    /// Re-hydrates a finished form, e.g. to resume editing a stored payload.
    pub fn from_payload(payload: SubmissionPayload) -> Self {
        let state = StepState {
            active: StepId::Referees,
            completed: StepId::ordered().into_iter().collect(),
            errors: BTreeMap::new(),
        };
        Self {
            draft: ApplicationDraft::from_payload(payload),
            state,
        }
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn into_draft(self) -> ApplicationDraft {
        self.draft
    }

    pub fn state(&self) -> &StepState {
        &self.state
    }

    pub fn active_step(&self) -> StepId {
        self.state.active
    }

    pub fn is_completed(&self, step: StepId) -> bool {
        self.state.completed.contains(&step)
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.state.completed.iter().copied()
    }

    pub fn errors(&self, step: StepId) -> Option<&StepErrors> {
        self.state.errors.get(&step)
    }

    pub fn go_to(&mut self, step: StepId) {
        self.state.active = step;
    }

    /// Jumps to a step by its key; unknown keys leave the state untouched.
    pub fn go_to_key(&mut self, key: &str) -> bool {
        match StepId::from_key(key) {
            Some(step) => {
                self.go_to(step);
                true
            }
            None => false,
        }
    }

    pub fn go_previous(&mut self) {
        if let Some(previous) = self.state.active.previous() {
            self.state.active = previous;
        }
    }

    /// Merges the step data, validates it and advances to the next step.
    ///
    /// On failure the data stays in the draft, the errors are recorded for the step and the
    /// active step does not move. Completing the last step never advances; submission is a
    /// separate call.
    pub fn complete_step(&mut self, data: StepData) -> Result<StepId, StepErrors> {
        let step = data.step();
        self.draft.apply(data);

        let errors = self.draft.validate_step(step);
        if !errors.is_empty() {
            self.state.completed.remove(&step);
            self.state.errors.insert(step, errors.clone());
            return Err(errors);
        }

        self.state.errors.remove(&step);
        self.state.completed.insert(step);
        if let Some(next) = step.next() {
            self.state.active = next;
        }
        Ok(self.state.active)
    }

    pub fn add_entry(&mut self, step: StepId) -> Result<EntryId, EntryError> {
        on_collection!(self.draft, step, |collection| Ok(collection.add()))
    }

    /// Removes one entry together with its error bucket.
    pub fn remove_entry(&mut self, step: StepId, id: &EntryId) -> Result<(), EntryError> {
        on_collection!(self.draft, step, |collection| collection.remove(id).map(|_| ()))?;

        if let Some(errors) = self.state.errors.get_mut(&step) {
            errors.remove_entry(id);
            if errors.is_empty() {
                self.state.errors.remove(&step);
            }
        }
        Ok(())
    }

    /// Answers an optional section with "none" (`false`) or re-opens it (`true`).
    pub fn set_section_active(&mut self, step: StepId, active: bool) -> Result<(), EntryError> {
        on_collection!(self.draft, step, |collection| collection.set_active(active))?;
        if !active {
            self.state.errors.remove(&step);
        }
        Ok(())
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.draft.terms_accepted = accepted;
    }

    pub fn validate_all(&self) -> ValidationReport {
        self.draft.validate()
    }

    pub fn total_experience(&self, today: NaiveDate) -> TotalExperience {
        self.draft.total_experience(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal() -> PersonalDetails {
        PersonalDetails {
            first_name: "Amina".to_string(),
            middle_name: None,
            last_name: "Otieno".to_string(),
            address: "P.O. Box 100, Kisumu".to_string(),
            gender: "female".to_string(),
            email: "amina.otieno@example.com".to_string(),
            phone: "+254700000001".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
            ethnicity: "Luo".to_string(),
            home_country: "Kenya".to_string(),
            disability: "no".to_string(),
        }
    }

    #[test]
    fn starts_on_personal_with_nothing_completed() {
        let wizard = ApplicationWizard::new(None);
        assert_eq!(wizard.active_step(), StepId::Personal);
        assert_eq!(wizard.completed_steps().count(), 0);
        assert!(wizard.draft().professional_bodies.is_empty());
        assert_eq!(wizard.draft().education.len(), 1);
    }

    #[test]
    fn go_previous_on_first_step_is_noop() {
        let mut wizard = ApplicationWizard::new(None);
        let before = wizard.state().clone();
        wizard.go_previous();
        assert_eq!(wizard.state(), &before);
    }

    #[test]
    fn unknown_step_key_is_ignored() {
        let mut wizard = ApplicationWizard::new(None);
        wizard.go_to(StepId::Publications);
        assert!(!wizard.go_to_key("cover-letter"));
        assert_eq!(wizard.active_step(), StepId::Publications);
        assert!(wizard.go_to_key("short-courses"));
        assert_eq!(wizard.active_step(), StepId::ShortCourses);
    }

    #[test]
    fn valid_step_advances_to_next() {
        let mut wizard = ApplicationWizard::new(None);
        let next = wizard
            .complete_step(StepData::Personal(personal()))
            .expect("personal details valid");
        assert_eq!(next, StepId::Education);
        assert!(wizard.is_completed(StepId::Personal));
        assert!(wizard.errors(StepId::Personal).is_none());
    }

    #[test]
    fn invalid_step_keeps_input_and_records_errors() {
        let mut wizard = ApplicationWizard::new(None);
        let mut details = personal();
        details.email = "amina".to_string();

        let errors = wizard
            .complete_step(StepData::Personal(details.clone()))
            .expect_err("email invalid");
        assert!(errors
            .for_scope("form")
            .expect("form errors")
            .contains("email"));
        assert_eq!(wizard.active_step(), StepId::Personal);
        assert!(!wizard.is_completed(StepId::Personal));
        assert_eq!(wizard.draft().personal, details);
        assert_eq!(wizard.errors(StepId::Personal), Some(&errors));
    }

    #[test]
    fn remove_entry_drops_only_that_bucket() {
        let mut wizard = ApplicationWizard::new(None);
        wizard.go_to(StepId::Education);
        let entries = vec![
            EducationEntry {
                id: EntryId("education-1".to_string()),
                ..EducationEntry::default()
            },
            EducationEntry {
                id: EntryId("education-2".to_string()),
                ..EducationEntry::default()
            },
        ];
        let errors = wizard
            .complete_step(StepData::Education(entries))
            .expect_err("blank entries");
        assert_eq!(errors.scopes().count(), 2);

        wizard
            .remove_entry(StepId::Education, &EntryId("education-1".to_string()))
            .expect("two entries present");
        let remaining = wizard.errors(StepId::Education).expect("one bucket left");
        assert_eq!(remaining.scopes().collect::<Vec<_>>(), vec!["education-2"]);
        assert_eq!(wizard.draft().education.len(), 1);
    }

    #[test]
    fn personal_step_has_no_entries() {
        let mut wizard = ApplicationWizard::new(None);
        assert_eq!(
            wizard.add_entry(StepId::Personal),
            Err(EntryError::NotACollection {
                step: StepId::Personal
            })
        );
    }

    #[test]
    fn answering_none_clears_section_errors() {
        let mut wizard = ApplicationWizard::new(None);
        wizard
            .set_section_active(StepId::Publications, true)
            .expect("optional section");
        let blank = wizard.draft().publications.to_vec();
        assert!(wizard.complete_step(StepData::Publications(blank)).is_err());

        wizard
            .set_section_active(StepId::Publications, false)
            .expect("optional section");
        assert!(wizard.errors(StepId::Publications).is_none());
        let next = wizard
            .complete_step(StepData::Publications(Vec::new()))
            .expect("none is a valid answer");
        assert_eq!(next, StepId::Referees);
    }

    #[test]
    fn terms_are_reported_by_full_validation() {
        let mut wizard = ApplicationWizard::new(None);
        assert_eq!(wizard.validate_all().terms.as_deref(), Some(TERMS_MESSAGE));
        wizard.set_terms_accepted(true);
        assert!(wizard.validate_all().terms.is_none());
    }
}
