//! Storage error shared by every repository seam, plus the in-memory
//! implementations the service runs on.

pub mod memory;

pub use memory::{InMemoryApplicationRepository, InMemoryJobRepository, InMemoryUserRepository};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
