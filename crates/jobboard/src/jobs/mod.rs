//! Job postings owned by company accounts.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{CreateJobRequest, Job, JobFilter, JobQuery, UpdateJobRequest};
pub use repository::JobRepository;
pub use router::job_router;
pub use service::{JobService, JobServiceError};
