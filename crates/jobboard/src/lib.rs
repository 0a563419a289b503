//! Job board backend: applicant and company accounts, job listings, and the
//! application status workflow.
//!
//! Every mutating operation passes through [`policy`], which owns the ownership
//! rules and the application status transition table. Services fetch records
//! from the repository seams, ask the policy for a decision, and persist or
//! reject; routers translate the outcome into HTTP responses.

pub mod applications;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod ids;
pub mod jobs;
pub mod pagination;
pub mod policy;
pub mod response;
pub mod store;
pub mod telemetry;
