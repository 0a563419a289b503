//! Authorization and status-transition decisions.
//!
//! Everything here is a pure function of the values handed in: no I/O, no
//! shared state. Callers fetch the records first (and raise
//! [`RejectReason::NotFoundUpstream`] themselves when a lookup comes back
//! empty), then act on the returned decision.

use std::fmt;

use serde::Serialize;

use crate::applications::domain::{Application, ApplicationStatus};
use crate::identity::domain::Role;
use crate::ids::UserId;
use crate::jobs::domain::{Job, UpdateJobRequest};


/// Authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Record kinds a caller may fail to find before consulting the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    User,
    Job,
    Application,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::User => "user",
            Resource::Job => "job",
            Resource::Application => "application",
        })
    }
}

/// Why a request was turned down. Each variant carries a stable [`code`](Self::code)
/// so callers never have to parse messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("you don't have permission to modify this resource")]
    Unauthorized,
    #[error("{0} not found")]
    NotFoundUpstream(Resource),
    #[error("you have already applied for this job")]
    DuplicateApplication,
    #[error("cannot change status from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("no fields to update")]
    NoFieldsToUpdate,
    #[error("only {required} accounts may perform this action")]
    WrongRole { required: Role },
}

impl RejectReason {
    pub const fn code(&self) -> &'static str {
        match self {
            RejectReason::Unauthorized => "unauthorized",
            RejectReason::NotFoundUpstream(_) => "not_found",
            RejectReason::DuplicateApplication => "duplicate_application",
            RejectReason::InvalidTransition { .. } => "invalid_transition",
            RejectReason::NoFieldsToUpdate => "no_fields_to_update",
            RejectReason::WrongRole { .. } => "wrong_role",
        }
    }
}

/// Route-level gate: the actor must hold `required`.
pub fn require_role(actor: &Actor, required: Role) -> Result<(), RejectReason> {
    if actor.role == required {
        Ok(())
    } else {
        Err(RejectReason::WrongRole { required })
    }
}

/// Only the job's creator may update or delete it.
pub fn authorize_job_mutation(actor_id: &UserId, job: &Job) -> Result<(), RejectReason> {
    if &job.created_by == actor_id {
        Ok(())
    } else {
        Err(RejectReason::Unauthorized)
    }
}

/// Status changes on an application are authorized by the owner of the job it
/// targets, not by anything stored on the application itself.
pub fn authorize_application_mutation(actor_id: &UserId, job: &Job) -> Result<(), RejectReason> {
    authorize_job_mutation(actor_id, job)
}

/// Listing a job's applicants is restricted the same way as mutating them.
pub fn authorize_applicant_listing(actor_id: &UserId, job: &Job) -> Result<(), RejectReason> {
    authorize_job_mutation(actor_id, job)
}

/// Decide whether `applicant_id` may apply to `job`.
///
/// `existing` is the result of looking up an application for the same
/// (applicant, job) pair. Any such record blocks the application, whatever its
/// status or contents. This is an early rejection only; the application store
/// enforces uniqueness on insert.
pub fn can_apply(
    _applicant_id: &UserId,
    job: Option<&Job>,
    existing: Option<&Application>,
) -> Result<(), RejectReason> {
    if existing.is_some() {
        return Err(RejectReason::DuplicateApplication);
    }
    if job.is_none() {
        return Err(RejectReason::NotFoundUpstream(Resource::Job));
    }
    Ok(())
}

/// Table lookup against [`ApplicationStatus::allowed_targets`]. Same-state
/// requests and anything out of a terminal state are illegal.
pub fn validate_status_transition(current: ApplicationStatus, requested: ApplicationStatus) -> bool {
    current != requested && current.allowed_targets().contains(&requested)
}

pub fn check_status_transition(
    current: ApplicationStatus,
    requested: ApplicationStatus,
) -> Result<(), RejectReason> {
    if validate_status_transition(current, requested) {
        Ok(())
    } else {
        Err(RejectReason::InvalidTransition {
            from: current,
            to: requested,
        })
    }
}

/// Guards against no-op writes.
pub fn require_changes(update: &UpdateJobRequest) -> Result<(), RejectReason> {
    if update.is_empty() {
        Err(RejectReason::NoFieldsToUpdate)
    } else {
        Ok(())
    }
}
