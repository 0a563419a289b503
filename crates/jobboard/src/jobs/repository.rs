use super::domain::{Job, JobQuery};
use crate::ids::JobId;
use crate::pagination::{Page, PageRequest};
use crate::store::RepositoryError;

/// Job posting storage.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// Matching jobs, newest first.
    fn list(&self, query: &JobQuery, page: PageRequest) -> Result<Page<Job>, RepositoryError>;
    fn update(&self, job: Job) -> Result<(), RepositoryError>;
    fn delete(&self, id: &JobId) -> Result<(), RepositoryError>;
}
