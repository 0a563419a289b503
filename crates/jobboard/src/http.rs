//! Composition of the public and bearer-protected API routers.

use std::sync::Arc;

use axum::{middleware, Router};

use crate::applications::{application_router, ApplicationService, ResumeStore};
use crate::identity::{
    auth_router, require_bearer, user_router, AuthState, IdentityService, PasswordHashing,
    TokenAuthority,
};
use crate::jobs::{job_router, JobService};
use crate::store::{InMemoryApplicationRepository, InMemoryJobRepository, InMemoryUserRepository};

/// Services behind the API plus the token authority the auth layer verifies with.
#[derive(Clone)]
pub struct ApiServices {
    pub identity: Arc<IdentityService>,
    pub jobs: Arc<JobService>,
    pub applications: Arc<ApplicationService>,
    pub tokens: Arc<dyn TokenAuthority>,
}

impl ApiServices {
    /// Wire every service against fresh in-memory stores.
    pub fn in_memory(
        hasher: Arc<dyn PasswordHashing>,
        tokens: Arc<dyn TokenAuthority>,
        resumes: Arc<dyn ResumeStore>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let jobs = Arc::new(InMemoryJobRepository::default());
        let applications = Arc::new(InMemoryApplicationRepository::default());

        Self {
            identity: Arc::new(IdentityService::new(
                users.clone(),
                hasher,
                tokens.clone(),
            )),
            jobs: Arc::new(JobService::new(jobs.clone(), users.clone())),
            applications: Arc::new(ApplicationService::new(
                applications,
                jobs,
                users,
                resumes,
            )),
            tokens,
        }
    }
}

/// Sign-up and login stay public; everything else sits behind [`require_bearer`].
pub fn api_router(services: &ApiServices) -> Router {
    let protected = Router::new()
        .merge(user_router(services.identity.clone()))
        .merge(job_router(services.jobs.clone()))
        .merge(application_router(services.applications.clone()))
        .route_layer(middleware::from_fn_with_state(
            AuthState::new(services.tokens.clone()),
            require_bearer,
        ));

    Router::new()
        .merge(auth_router(services.identity.clone()))
        .merge(protected)
}
