use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::applications::domain::{
    Application, ApplicationStatus, ApplySubmission, ResumeUpload,
};
use crate::applications::repository::ApplicationRepository;
use crate::applications::service::ApplicationService;
use crate::applications::storage::LocalResumeStore;
use crate::http::{api_router, ApiServices};
use crate::identity::credentials::{Argon2Hasher, JwtAuthority, TokenAuthority};
use crate::identity::domain::{Role, User};
use crate::identity::repository::UserRepository;
use crate::identity::service::IdentityService;
use crate::ids::{ApplicationId, JobId, UserId};
use crate::jobs::domain::Job;
use crate::jobs::repository::JobRepository;
use crate::jobs::service::JobService;
use crate::pagination::{Page, PageRequest};
use crate::policy::Actor;
use crate::store::{
    InMemoryApplicationRepository, InMemoryJobRepository, InMemoryUserRepository,
    RepositoryError,
};

pub(super) const MAX_RESUME_BYTES: usize = 4 * 1024;
const BOUNDARY: &str = "jobboard-test-boundary";

/// In-memory wiring around a scratch upload directory that is removed on drop.
pub(super) struct Harness {
    pub(super) users: Arc<InMemoryUserRepository>,
    pub(super) jobs: Arc<InMemoryJobRepository>,
    pub(super) applications: Arc<dyn ApplicationRepository>,
    pub(super) service: Arc<ApplicationService>,
    pub(super) tokens: Arc<JwtAuthority>,
    pub(super) upload_root: PathBuf,
}

impl Harness {
    pub(super) fn new() -> Self {
        Self::with_repository(Arc::new(InMemoryApplicationRepository::default()))
    }

    pub(super) fn with_repository(applications: Arc<dyn ApplicationRepository>) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let jobs = Arc::new(InMemoryJobRepository::default());
        let upload_root =
            std::env::temp_dir().join(format!("jobboard-application-tests-{}", Uuid::now_v7()));
        let resumes = Arc::new(LocalResumeStore::new(upload_root.clone(), MAX_RESUME_BYTES));
        let service = Arc::new(ApplicationService::new(
            applications.clone(),
            jobs.clone(),
            users.clone(),
            resumes,
        ));

        Self {
            users,
            jobs,
            applications,
            service,
            tokens: Arc::new(JwtAuthority::new(b"application-tests", Duration::hours(1))),
            upload_root,
        }
    }

    pub(super) fn account(&self, id: &str, name: &str, role: Role) -> Actor {
        let now = Utc::now();
        self.users
            .insert(User {
                id: UserId::from(id),
                name: name.to_string(),
                email: format!("{id}@example.com"),
                password_hash: "unused".to_string(),
                role,
                created_at: now,
                updated_at: now,
            })
            .expect("account stored");
        Actor::new(UserId::from(id), role)
    }

    pub(super) fn company(&self, id: &str, name: &str) -> Actor {
        self.account(id, name, Role::Company)
    }

    pub(super) fn applicant(&self, id: &str, name: &str) -> Actor {
        self.account(id, name, Role::Applicant)
    }

    pub(super) fn job(&self, owner: &Actor, title: &str, published: bool) -> Job {
        let now = Utc::now();
        self.jobs
            .insert(Job {
                id: JobId::generate(),
                title: title.to_string(),
                description: "Build the application review pipeline.".to_string(),
                location: Some("Remote".to_string()),
                is_published: published,
                created_by: owner.id.clone(),
                created_at: now,
                updated_at: now,
            })
            .expect("job stored")
    }

    pub(super) fn apply(&self, applicant: &Actor, job: &Job) -> Application {
        self.service
            .apply(applicant, &job.id, submission())
            .expect("application accepted")
    }

    pub(super) fn stored_status(&self, id: &ApplicationId) -> ApplicationStatus {
        self.applications
            .fetch(id)
            .expect("fetch succeeds")
            .expect("application present")
            .status
    }

    pub(super) fn stored_resumes(&self) -> usize {
        std::fs::read_dir(&self.upload_root)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub(super) fn token_for(&self, actor: &Actor) -> String {
        self.tokens
            .issue(&actor.id, actor.role, Utc::now())
            .expect("token issues")
    }

    /// Full API router sharing this harness's stores.
    pub(super) fn router(&self) -> axum::Router {
        let tokens: Arc<dyn TokenAuthority> = self.tokens.clone();
        let services = ApiServices {
            identity: Arc::new(IdentityService::new(
                self.users.clone(),
                Arc::new(Argon2Hasher),
                tokens.clone(),
            )),
            jobs: Arc::new(JobService::new(self.jobs.clone(), self.users.clone())),
            applications: self.service.clone(),
            tokens,
        };
        api_router(&services)
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_root);
    }
}

pub(super) fn pdf_resume() -> ResumeUpload {
    ResumeUpload {
        file_name: "resume.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.7\n% test resume\n".to_vec(),
    }
}

pub(super) fn submission() -> ApplySubmission {
    ApplySubmission {
        cover_letter: Some("I would love to work on this team.".to_string()),
        resume: pdf_resume(),
    }
}

/// Multipart form with an optional `resume` file and `cover_letter` field.
pub(super) fn multipart_request(
    uri: &str,
    token: &str,
    resume: Option<(&str, &str, &[u8])>,
    cover_letter: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    if let Some((file_name, content_type, bytes)) = resume {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(letter) = cover_letter {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"cover_letter\"\r\n\r\n{letter}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

pub(super) fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json")
}

/// Hides existing applications from the pre-insert lookup, so the store's own
/// uniqueness check is the one that fires.
pub(super) struct BlindLookupRepository(pub(super) InMemoryApplicationRepository);

impl ApplicationRepository for BlindLookupRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        self.0.insert(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.0.fetch(id)
    }

    fn find_by_applicant(
        &self,
        applicant: &UserId,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        self.0.find_by_applicant(applicant, page)
    }

    fn find_by_job(
        &self,
        job: &JobId,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        self.0.find_by_job(job, page)
    }

    fn find_by_applicant_and_job(
        &self,
        _applicant: &UserId,
        _job: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }

    fn find_by_resume_link(&self, link: &str) -> Result<Option<Application>, RepositoryError> {
        self.0.find_by_resume_link(link)
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        self.0.update_status(id, expected, next)
    }
}

/// Lets another writer move the application to `interloper` just before each
/// status write lands.
pub(super) struct InterleavedStatusRepository {
    pub(super) inner: InMemoryApplicationRepository,
    pub(super) interloper: ApplicationStatus,
}

impl ApplicationRepository for InterleavedStatusRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        self.inner.insert(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_applicant(
        &self,
        applicant: &UserId,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        self.inner.find_by_applicant(applicant, page)
    }

    fn find_by_job(
        &self,
        job: &JobId,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        self.inner.find_by_job(job, page)
    }

    fn find_by_applicant_and_job(
        &self,
        applicant: &UserId,
        job: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.find_by_applicant_and_job(applicant, job)
    }

    fn find_by_resume_link(&self, link: &str) -> Result<Option<Application>, RepositoryError> {
        self.inner.find_by_resume_link(link)
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        self.inner.update_status(id, expected, self.interloper)?;
        self.inner.update_status(id, expected, next)
    }
}

/// Every call fails as if the backing store were down.
pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn find_by_applicant(
        &self,
        _applicant: &UserId,
        _page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn find_by_job(
        &self,
        _job: &JobId,
        _page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn find_by_applicant_and_job(
        &self,
        _applicant: &UserId,
        _job: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }

    fn find_by_resume_link(&self, _link: &str) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _expected: ApplicationStatus,
        _next: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}
