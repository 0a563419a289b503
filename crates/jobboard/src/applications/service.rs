use std::sync::Arc;

use chrono::Utc;
use validator::{Validate, ValidationErrors};

use super::domain::{
    ApplicantApplicationView, Application, ApplicationStatus, ApplySubmission,
    JobApplicationView, StatusChangeView, StatusUpdateRequest, UnknownStatus,
};
use super::repository::ApplicationRepository;
use super::storage::{ResumeStore, StorageError};
use crate::identity::domain::Role;
use crate::identity::repository::UserRepository;
use crate::ids::{ApplicationId, JobId, UserId};
use crate::jobs::domain::Job;
use crate::jobs::repository::JobRepository;
use crate::pagination::{PageMeta, PageRequest};
use crate::policy::{self, Actor, RejectReason, Resource};
use crate::store::RepositoryError;

/// Application intake and the company-side status workflow.
pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    jobs: Arc<dyn JobRepository>,
    users: Arc<dyn UserRepository>,
    resumes: Arc<dyn ResumeStore>,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobRepository>,
        users: Arc<dyn UserRepository>,
        resumes: Arc<dyn ResumeStore>,
    ) -> Self {
        Self {
            applications,
            jobs,
            users,
            resumes,
        }
    }

    pub fn max_resume_bytes(&self) -> usize {
        self.resumes.max_bytes()
    }

    /// Submit an application for a published job.
    ///
    /// The resume is only written once the policy has cleared the request, and
    /// is removed again if the insert loses a race against a concurrent
    /// application for the same job.
    pub fn apply(
        &self,
        actor: &Actor,
        job_id: &JobId,
        submission: ApplySubmission,
    ) -> Result<Application, ApplicationServiceError> {
        policy::require_role(actor, Role::Applicant)?;
        submission.validate()?;

        let job = self.jobs.fetch(job_id)?.filter(|job| job.is_published);
        let existing = self
            .applications
            .find_by_applicant_and_job(&actor.id, job_id)?;
        if let Err(reason) = policy::can_apply(&actor.id, job.as_ref(), existing.as_ref()) {
            tracing::info!(job_id = %job_id, applicant = %actor.id, reason = reason.code(), "application refused");
            return Err(reason.into());
        }

        let resume_link = self.resumes.store(&submission.resume)?;
        let application = Application {
            id: ApplicationId::generate(),
            applicant_id: actor.id.clone(),
            job_id: job_id.clone(),
            resume_link: resume_link.clone(),
            cover_letter: submission
                .cover_letter
                .map(|letter| letter.trim().to_string())
                .filter(|letter| !letter.is_empty()),
            status: ApplicationStatus::Applied,
            applied_at: Utc::now(),
        };

        match self.applications.insert(application) {
            Ok(stored) => {
                tracing::info!(application_id = %stored.id, job_id = %stored.job_id, "application submitted");
                Ok(stored)
            }
            Err(err) => {
                self.discard_resume(&resume_link);
                match err {
                    RepositoryError::Conflict => Err(RejectReason::DuplicateApplication.into()),
                    other => Err(other.into()),
                }
            }
        }
    }

    /// The applicant's own applications, newest first, with job and company
    /// names where those records still exist.
    pub fn my_applications(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> Result<(Vec<ApplicantApplicationView>, PageMeta), ApplicationServiceError> {
        policy::require_role(actor, Role::Applicant)?;

        let found = self.applications.find_by_applicant(&actor.id, page)?;
        let meta = PageMeta::new(page, found.total);
        let mut views = Vec::with_capacity(found.items.len());
        for application in found.items {
            let job = self.jobs.fetch(&application.job_id)?;
            let company_name = match &job {
                Some(job) => self.user_name(&job.created_by)?,
                None => None,
            };
            views.push(ApplicantApplicationView {
                id: application.id,
                job_id: application.job_id,
                job_title: job.map(|job| job.title),
                company_name,
                status: application.status,
                applied_at: application.applied_at,
            });
        }
        Ok((views, meta))
    }

    /// Applications received for a job, visible to the job's owner only.
    pub fn job_applications(
        &self,
        actor: &Actor,
        job_id: &JobId,
        page: PageRequest,
    ) -> Result<(Vec<JobApplicationView>, PageMeta), ApplicationServiceError> {
        policy::require_role(actor, Role::Company)?;
        let job = self.job(job_id)?;
        policy::authorize_applicant_listing(&actor.id, &job)?;

        let found = self.applications.find_by_job(job_id, page)?;
        let meta = PageMeta::new(page, found.total);
        let mut views = Vec::with_capacity(found.items.len());
        for application in found.items {
            views.push(JobApplicationView {
                applicant_name: self.user_name(&application.applicant_id)?,
                id: application.id,
                applicant_id: application.applicant_id,
                resume_link: application.resume_link,
                cover_letter: application.cover_letter,
                status: application.status,
                applied_at: application.applied_at,
            });
        }
        Ok((views, meta))
    }

    /// Move an application to a new status on behalf of the job's owner.
    pub fn update_status(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        request: StatusUpdateRequest,
    ) -> Result<StatusChangeView, ApplicationServiceError> {
        policy::require_role(actor, Role::Company)?;
        let requested = request.requested()?;

        let application = self
            .applications
            .fetch(application_id)?
            .ok_or(RejectReason::NotFoundUpstream(Resource::Application))?;
        let job = self.job(&application.job_id)?;
        if let Err(reason) = policy::authorize_application_mutation(&actor.id, &job) {
            tracing::warn!(application_id = %application.id, actor = %actor.id, "status change by non-owner");
            return Err(reason.into());
        }
        policy::check_status_transition(application.status, requested)?;

        match self
            .applications
            .update_status(application_id, application.status, requested)
        {
            Ok(updated) => {
                tracing::info!(
                    application_id = %updated.id,
                    from = %application.status,
                    to = %updated.status,
                    "application status changed"
                );
                Ok(StatusChangeView {
                    application_id: updated.id,
                    status: updated.status,
                })
            }
            Err(RepositoryError::Conflict) => {
                // Someone else moved it first; judge the request against what is stored now.
                let current = self
                    .applications
                    .fetch(application_id)?
                    .ok_or(RejectReason::NotFoundUpstream(Resource::Application))?;
                policy::check_status_transition(current.status, requested)?;
                Err(RepositoryError::Conflict.into())
            }
            Err(RepositoryError::NotFound) => {
                Err(RejectReason::NotFoundUpstream(Resource::Application).into())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Resume bytes behind a stored `resume_link`. Readable by the applicant
    /// who submitted it and by the owner of the job it was sent to.
    pub fn resume(&self, actor: &Actor, link: &str) -> Result<Vec<u8>, ApplicationServiceError> {
        let application = self
            .applications
            .find_by_resume_link(link)?
            .ok_or(RejectReason::NotFoundUpstream(Resource::Application))?;
        if application.applicant_id != actor.id {
            let job = self.job(&application.job_id)?;
            policy::authorize_application_mutation(&actor.id, &job)?;
        }

        match self.resumes.load(link)? {
            Some(bytes) => Ok(bytes),
            None => {
                tracing::warn!(application_id = %application.id, link, "resume file missing from storage");
                Err(RejectReason::NotFoundUpstream(Resource::Application).into())
            }
        }
    }

    fn job(&self, job_id: &JobId) -> Result<Job, ApplicationServiceError> {
        Ok(self
            .jobs
            .fetch(job_id)?
            .ok_or(RejectReason::NotFoundUpstream(Resource::Job))?)
    }

    fn user_name(&self, id: &UserId) -> Result<Option<String>, ApplicationServiceError> {
        Ok(self.users.find_by_id(id)?.map(|user| user.name))
    }

    fn discard_resume(&self, link: &str) {
        if let Err(err) = self.resumes.discard(link) {
            tracing::warn!(error = %err, link, "failed to discard orphaned resume");
        }
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Rejected(#[from] RejectReason),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    InvalidStatus(#[from] UnknownStatus),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
