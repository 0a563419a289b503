use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};

use super::domain::{LoginRequest, SignUpRequest};
use super::service::{IdentityError, IdentityService};
use crate::policy::Actor;
use crate::response;

/// Public sign-up and login endpoints.
pub fn auth_router(service: Arc<IdentityService>) -> Router {
    Router::new()
        .route("/api/v1/auth/signup", post(sign_up_handler))
        .route("/api/v1/auth/login", post(login_handler))
        .with_state(service)
}

/// Profile endpoint; expects the bearer middleware to have run.
pub fn user_router(service: Arc<IdentityService>) -> Router {
    Router::new()
        .route("/api/v1/users/me", get(profile_handler))
        .with_state(service)
}

pub(crate) async fn sign_up_handler(
    State(service): State<Arc<IdentityService>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return response::json_rejection(rejection),
    };
    let outcome = match response::blocking(move || service.sign_up(request)).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };
    match outcome {
        Ok(session) => {
            response::success(StatusCode::CREATED, "User registered successfully", session)
        }
        Err(err) => identity_error(err),
    }
}

pub(crate) async fn login_handler(
    State(service): State<Arc<IdentityService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return response::json_rejection(rejection),
    };
    let outcome = match response::blocking(move || service.login(request)).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };
    match outcome {
        Ok(session) => response::success(StatusCode::OK, "Login successful", session),
        Err(err) => identity_error(err),
    }
}

pub(crate) async fn profile_handler(
    State(service): State<Arc<IdentityService>>,
    Extension(actor): Extension<Actor>,
) -> Response {
    match service.profile(&actor) {
        Ok(user) => response::success(StatusCode::OK, "Profile retrieved", user),
        Err(err) => identity_error(err),
    }
}

fn identity_error(err: IdentityError) -> Response {
    match &err {
        IdentityError::Validation(errors) => response::validation_failure(errors),
        IdentityError::EmailTaken => response::failure(
            StatusCode::CONFLICT,
            "Registration failed",
            vec![err.to_string()],
        ),
        IdentityError::InvalidCredentials => response::failure(
            StatusCode::UNAUTHORIZED,
            "Login failed",
            vec![err.to_string()],
        ),
        IdentityError::NotFound => {
            response::failure(StatusCode::NOT_FOUND, "Not Found", vec![err.to_string()])
        }
        IdentityError::Credentials(source) => response::internal_error(source),
        IdentityError::Repository(source) => response::internal_error(source),
    }
}
