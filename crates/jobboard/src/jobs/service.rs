use std::sync::Arc;

use chrono::Utc;
use validator::{Validate, ValidationErrors};

use super::domain::{CreateJobRequest, Job, JobFilter, JobQuery, UpdateJobRequest};
use super::repository::JobRepository;
use crate::identity::domain::Role;
use crate::identity::repository::UserRepository;
use crate::ids::{JobId, UserId};
use crate::pagination::{PageMeta, PageRequest};
use crate::policy::{self, Actor, RejectReason, Resource};
use crate::store::RepositoryError;

/// Job posting workflows. Every mutation is gated on the company role and on
/// ownership of the stored job.
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    users: Arc<dyn UserRepository>,
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { jobs, users }
    }

    pub fn create(&self, actor: &Actor, request: CreateJobRequest) -> Result<Job, JobServiceError> {
        policy::require_role(actor, Role::Company)?;
        let request = request.trimmed();
        request.validate()?;

        let job = self
            .jobs
            .insert(request.into_job(actor.id.clone(), Utc::now()))?;
        tracing::info!(job_id = %job.id, owner = %job.created_by, "job created");
        Ok(job)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: &JobId,
        request: UpdateJobRequest,
    ) -> Result<Job, JobServiceError> {
        policy::require_role(actor, Role::Company)?;
        policy::require_changes(&request)?;
        let request = request.trimmed();
        request.validate()?;

        let mut job = self.owned_job(actor, id)?;
        request.apply_to(&mut job, Utc::now());
        self.jobs.update(job.clone()).map_err(missing_job)?;

        tracing::info!(job_id = %job.id, "job updated");
        Ok(job)
    }

    pub fn delete(&self, actor: &Actor, id: &JobId) -> Result<(), JobServiceError> {
        policy::require_role(actor, Role::Company)?;
        let job = self.owned_job(actor, id)?;
        self.jobs.delete(&job.id).map_err(missing_job)?;

        tracing::info!(job_id = %job.id, "job deleted");
        Ok(())
    }

    /// Published jobs, newest first. `company` matches creator names
    /// case-insensitively or a creator id exactly.
    pub fn list(
        &self,
        filter: JobFilter,
        page: PageRequest,
    ) -> Result<(Vec<Job>, PageMeta), JobServiceError> {
        let creators = match filter.company.as_deref().map(str::trim) {
            Some(company) if !company.is_empty() => {
                let mut ids: Vec<UserId> = self
                    .users
                    .find_companies_by_name(company)?
                    .into_iter()
                    .map(|user| user.id)
                    .collect();
                ids.push(UserId::from(company));
                Some(ids)
            }
            _ => None,
        };

        let query = JobQuery {
            title: non_blank(filter.title),
            location: non_blank(filter.location),
            creators,
            published_only: true,
        };

        let found = self.jobs.list(&query, page)?;
        let meta = PageMeta::new(page, found.total);
        Ok((found.items, meta))
    }

    /// Unpublished jobs read as missing to everyone but their owner.
    pub fn get(&self, viewer: &Actor, id: &JobId) -> Result<Job, JobServiceError> {
        match self.jobs.fetch(id)? {
            Some(job) if job.visible_to(&viewer.id) => Ok(job),
            _ => Err(RejectReason::NotFoundUpstream(Resource::Job).into()),
        }
    }

    fn owned_job(&self, actor: &Actor, id: &JobId) -> Result<Job, JobServiceError> {
        let job = self
            .jobs
            .fetch(id)?
            .ok_or(RejectReason::NotFoundUpstream(Resource::Job))?;
        if let Err(reason) = policy::authorize_job_mutation(&actor.id, &job) {
            tracing::warn!(job_id = %job.id, actor = %actor.id, "job mutation by non-owner");
            return Err(reason.into());
        }
        Ok(job)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// A job deleted between fetch and write reads as missing, not as a storage fault.
fn missing_job(err: RepositoryError) -> JobServiceError {
    match err {
        RepositoryError::NotFound => RejectReason::NotFoundUpstream(Resource::Job).into(),
        other => JobServiceError::Repository(other),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error(transparent)]
    Rejected(#[from] RejectReason),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
