use std::collections::HashSet;

use super::domain::{
    EducationEntry, EntryId, ExperienceEntry, ProfessionalBodyEntry, PublicationEntry,
    RefereeEntry, ShortCourseEntry, StepId,
};
use super::validation::{self, empty_section_errors, FieldErrors, StepErrors, SECTION_SCOPE};

/// A repeatable record inside a collection step.
pub trait StepEntry: Clone + Default {
    const STEP: StepId;
    const ID_PREFIX: &'static str;

    fn id(&self) -> &EntryId;
    fn set_id(&mut self, id: EntryId);
    fn validate(&self) -> FieldErrors;
}

macro_rules! step_entry {
    ($entry:ty, $step:expr, $prefix:literal, $validate:path) => {
        impl StepEntry for $entry {
            const STEP: StepId = $step;
            const ID_PREFIX: &'static str = $prefix;

            fn id(&self) -> &EntryId {
                &self.id
            }

            fn set_id(&mut self, id: EntryId) {
                self.id = id;
            }

            fn validate(&self) -> FieldErrors {
                $validate(self)
            }
        }
    };
}

step_entry!(EducationEntry, StepId::Education, "education", validation::validate_education);
step_entry!(ExperienceEntry, StepId::Experience, "experience", validation::validate_experience);
step_entry!(ShortCourseEntry, StepId::ShortCourses, "course", validation::validate_short_course);
step_entry!(
    ProfessionalBodyEntry,
    StepId::ProfessionalBodies,
    "body",
    validation::validate_professional_body
);
step_entry!(PublicationEntry, StepId::Publications, "pub", validation::validate_publication);
step_entry!(RefereeEntry, StepId::Referees, "referee", validation::validate_referee);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("{step} must keep at least one entry")]
    LastEntry { step: StepId },
    #[error("{step} has no entry '{id}'")]
    UnknownEntry { step: StepId, id: EntryId },
    #[error("{step} does not hold repeatable entries")]
    NotACollection { step: StepId },
    #[error("{step} cannot be answered with none")]
    NoneNotAllowed { step: StepId },
}

/// Ordered entries of one collection step.
///
/// Required sections never drop below one entry. Optional sections can be switched off, which
/// clears them; switching one back on seeds a blank entry.
#[derive(Debug, Clone)]
pub struct EntryCollection<T> {
    entries: Vec<T>,
    active: bool,
    sequence: u64,
}

impl<T: StepEntry> Default for EntryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StepEntry> EntryCollection<T> {
    /// Fresh collection holding one blank entry.
    pub fn new() -> Self {
        let mut collection = Self {
            entries: Vec::new(),
            active: true,
            sequence: 0,
        };
        collection.add();
        collection
    }

    /// Starting state of a form section: optional sections start switched off.
    pub fn initial() -> Self {
        if T::STEP.allows_none() {
            Self {
                entries: Vec::new(),
                active: false,
                sequence: 0,
            }
        } else {
            Self::new()
        }
    }

    /// Rebuilds a collection from stored entries, assigning ids to entries that lack one.
    pub fn from_entries(entries: Vec<T>) -> Self {
        let mut collection = Self {
            entries: Vec::new(),
            active: true,
            sequence: 0,
        };
        collection.replace(entries);
        collection
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> Option<&T> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn add(&mut self) -> EntryId {
        let id = self.next_id();
        let mut entry = T::default();
        entry.set_id(id.clone());
        self.entries.push(entry);
        self.active = true;
        id
    }

    pub fn remove(&mut self, id: &EntryId) -> Result<T, EntryError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id() == id)
            .ok_or_else(|| EntryError::UnknownEntry {
                step: T::STEP,
                id: id.clone(),
            })?;

        if self.entries.len() == 1 {
            return Err(EntryError::LastEntry { step: T::STEP });
        }

        Ok(self.entries.remove(index))
    }

    pub fn update<F>(&mut self, id: &EntryId, apply: F) -> Result<(), EntryError>
    where
        F: FnOnce(&mut T),
    {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id() == id)
            .ok_or_else(|| EntryError::UnknownEntry {
                step: T::STEP,
                id: id.clone(),
            })?;
        let original = entry.id().clone();
        apply(entry);
        entry.set_id(original);
        Ok(())
    }

    /// Swaps in a full set of entries, as happens when a step is completed.
    ///
    /// Explicit ids are kept (first occurrence wins); blank and repeated ids get fresh ones that
    /// avoid every kept id. An empty set switches an optional section off; a required section
    /// keeps the empty set so validation can report it.
    pub fn replace(&mut self, entries: Vec<T>) {
        let mut kept = HashSet::new();
        let needs_id: Vec<bool> = entries
            .iter()
            .map(|entry| entry.id().is_blank() || !kept.insert(entry.id().clone()))
            .collect();

        self.entries = entries;
        for (index, needs_id) in needs_id.into_iter().enumerate() {
            if needs_id {
                let id = self.next_id();
                self.entries[index].set_id(id);
            }
        }
        self.active = !(self.entries.is_empty() && T::STEP.allows_none());
    }

    pub fn set_active(&mut self, active: bool) -> Result<(), EntryError> {
        if !active && !T::STEP.allows_none() {
            return Err(EntryError::NoneNotAllowed { step: T::STEP });
        }

        if active {
            self.active = true;
            if self.entries.is_empty() {
                self.add();
            }
        } else {
            self.active = false;
            self.entries.clear();
        }
        Ok(())
    }

    pub fn validate(&self) -> StepErrors {
        let mut errors = StepErrors::default();
        if !self.active {
            return errors;
        }

        if self.entries.is_empty() {
            errors.insert(SECTION_SCOPE, empty_section_errors(T::STEP));
            return errors;
        }

        for entry in &self.entries {
            errors.insert(entry.id().as_str(), entry.validate());
        }
        errors
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.entries.clone()
    }

    fn next_id(&mut self) -> EntryId {
        loop {
            self.sequence += 1;
            let candidate = EntryId(format!("{}-{}", T::ID_PREFIX, self.sequence));
            if !self.entries.iter().any(|entry| *entry.id() == candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_collection_holds_one_blank_entry() {
        let collection = EntryCollection::<EducationEntry>::new();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.entries()[0].id, EntryId("education-1".to_string()));
        assert!(collection.is_active());
    }

    #[test]
    fn removing_last_entry_is_refused() {
        let mut collection = EntryCollection::<RefereeEntry>::new();
        let first = collection.entries()[0].id.clone();
        assert_eq!(
            collection.remove(&first),
            Err(EntryError::LastEntry {
                step: StepId::Referees
            })
        );

        let second = collection.add();
        let removed = collection.remove(&first).expect("two entries present");
        assert_eq!(removed.id, first);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.entries()[0].id, second);
    }

    #[test]
    fn unknown_entry_is_reported() {
        let mut collection = EntryCollection::<ShortCourseEntry>::new();
        let missing = EntryId("course-99".to_string());
        assert!(matches!(
            collection.update(&missing, |course| course.course_name = "Excel".to_string()),
            Err(EntryError::UnknownEntry { .. })
        ));
    }

    #[test]
    fn update_cannot_rewrite_the_id() {
        let mut collection = EntryCollection::<ExperienceEntry>::new();
        let id = collection.entries()[0].id.clone();
        collection
            .update(&id, |entry| {
                entry.organization = "Kenya Power".to_string();
                entry.id = EntryId("hijacked".to_string());
            })
            .expect("entry exists");
        let entry = collection.get(&id).expect("id unchanged");
        assert_eq!(entry.organization, "Kenya Power");
    }

    #[test]
    fn replace_assigns_ids_without_collisions() {
        let entries = vec![
            EducationEntry {
                id: EntryId("education-1".to_string()),
                ..EducationEntry::default()
            },
            EducationEntry::default(),
            EducationEntry {
                id: EntryId("education-1".to_string()),
                ..EducationEntry::default()
            },
        ];
        let collection = EntryCollection::from_entries(entries);
        let ids: Vec<_> = collection.iter().map(|e| e.id.0.clone()).collect();
        assert_eq!(ids, vec!["education-1", "education-2", "education-3"]);
    }

    #[test]
    fn replace_keeps_explicit_ids_that_follow_blank_ones() {
        let entries = vec![
            EducationEntry {
                institution: "Strathmore University".to_string(),
                ..EducationEntry::default()
            },
            EducationEntry {
                id: EntryId("education-1".to_string()),
                level: "Diploma".to_string(),
                institution: "Moi University".to_string(),
                ..EducationEntry::default()
            },
        ];
        let collection = EntryCollection::from_entries(entries);

        let explicit = collection
            .get(&EntryId("education-1".to_string()))
            .expect("explicit id kept");
        assert_eq!(explicit.institution, "Moi University");
        let blank = collection
            .get(&EntryId("education-2".to_string()))
            .expect("fresh id assigned");
        assert_eq!(blank.institution, "Strathmore University");

        let errors = collection.validate();
        assert!(errors.for_scope("education-1").is_none());
        assert!(errors.for_scope("education-2").is_some());
    }

    #[test]
    fn optional_section_toggles_between_none_and_one_entry() {
        let mut collection = EntryCollection::<PublicationEntry>::new();
        collection.set_active(false).expect("publications allow none");
        assert!(collection.is_empty());
        assert!(collection.validate().is_empty());

        collection.set_active(true).expect("can reactivate");
        assert_eq!(collection.len(), 1);
        assert!(!collection.validate().is_empty());
    }

    #[test]
    fn required_section_cannot_be_switched_off() {
        let mut collection = EntryCollection::<EducationEntry>::new();
        assert_eq!(
            collection.set_active(false),
            Err(EntryError::NoneNotAllowed {
                step: StepId::Education
            })
        );
    }

    #[test]
    fn empty_required_section_fails_validation() {
        let collection = EntryCollection::<RefereeEntry>::from_entries(Vec::new());
        let errors = collection.validate();
        let section = errors.for_scope(SECTION_SCOPE).expect("section error");
        assert_eq!(
            section.get("entries"),
            Some("At least one referee entry is required")
        );

        let optional = EntryCollection::<ProfessionalBodyEntry>::from_entries(Vec::new());
        assert!(!optional.is_active());
        assert!(optional.validate().is_empty());
    }

    #[test]
    fn validation_buckets_by_entry_id() {
        let mut collection = EntryCollection::<EducationEntry>::new();
        let first = collection.entries()[0].id.clone();
        collection
            .update(&first, |entry| {
                entry.level = "Diploma".to_string();
                entry.institution = "Kenya Polytechnic".to_string();
            })
            .expect("entry exists");
        let second = collection.add();

        let errors = collection.validate();
        assert!(errors.for_entry(&first).is_none());
        assert!(errors
            .for_entry(&second)
            .expect("second entry invalid")
            .contains("institution"));
    }
}
