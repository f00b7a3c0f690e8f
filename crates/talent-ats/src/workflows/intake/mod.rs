//! Multi-step application intake: typed step data, validators, the step controller and the
//! submission hand-off to storage.

pub mod domain;
pub mod entries;
pub mod experience;
pub mod repository;
pub mod router;
pub mod service;
pub mod submission;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationRequest, AttachmentRef, EducationEntry, EntryId, ExperienceEntry, PersonalDetails,
    ProfessionalBodyEntry, PublicationEntry, RefereeEntry, ShortCourseEntry, StepData, StepId,
    SubmissionPayload,
};
pub use entries::{EntryCollection, EntryError, StepEntry};
pub use experience::{total_experience, TotalExperience};
pub use repository::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationRepository,
    ApplicationStatus, ApplicationStatusView, CandidateId, EmailNotification,
    NotificationError, NotificationPublisher, RepositoryError,
};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
pub use submission::{submit, try_submit, SubmissionError};
pub use validation::{FieldErrors, StepErrors, ValidationReport};
pub use wizard::{ApplicationDraft, ApplicationWizard, StepState};
