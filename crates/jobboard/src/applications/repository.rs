use super::domain::{Application, ApplicationStatus};
use crate::ids::{ApplicationId, JobId, UserId};
use crate::pagination::{Page, PageRequest};
use crate::store::RepositoryError;

/// Application storage.
///
/// Implementations own the two invariants that a read-then-write in the
/// service cannot guarantee on its own:
/// - `insert` rejects a second application for the same (applicant, job) pair
///   with [`RepositoryError::Conflict`], atomically with the write.
/// - `update_status` is a compare-and-set: it only writes when the stored
///   status still equals `expected`, and reports `Conflict` otherwise.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// Applications submitted by `applicant`, newest first.
    fn find_by_applicant(
        &self,
        applicant: &UserId,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError>;
    /// Applications received for `job`, newest first.
    fn find_by_job(
        &self,
        job: &JobId,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError>;
    fn find_by_applicant_and_job(
        &self,
        applicant: &UserId,
        job: &JobId,
    ) -> Result<Option<Application>, RepositoryError>;
    /// The application whose stored resume is `link`.
    fn find_by_resume_link(&self, link: &str) -> Result<Option<Application>, RepositoryError>;
    fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;
}
