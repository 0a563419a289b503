//! Job applications: intake with resume upload, applicant and company
//! listings, and the status workflow.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantApplicationView, Application, ApplicationStatus, ApplySubmission,
    JobApplicationView, ResumeUpload, StatusChangeView, StatusUpdateRequest, UnknownStatus,
};
pub use repository::ApplicationRepository;
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
pub use storage::{LocalResumeStore, ResumeStore, StorageError};
