use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Extension, Json, Router,
};

use super::domain::{CreateJobRequest, JobFilter, UpdateJobRequest};
use super::service::{JobService, JobServiceError};
use crate::ids::JobId;
use crate::pagination::PageQuery;
use crate::policy::Actor;
use crate::response;
use crate::store::RepositoryError;

/// Job listing and management endpoints. Every route expects an [`Actor`]
/// extension from the bearer middleware.
pub fn job_router(service: Arc<JobService>) -> Router {
    Router::new()
        .route("/api/v1/jobs", get(list_handler).post(create_handler))
        .route(
            "/api/v1/jobs/:job_id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .with_state(service)
}

pub(crate) async fn list_handler(
    State(service): State<Arc<JobService>>,
    Query(filter): Query<JobFilter>,
    Query(page): Query<PageQuery>,
) -> Response {
    match service.list(filter, page.request()) {
        Ok((jobs, meta)) => response::success_page("Jobs retrieved successfully", jobs, meta),
        Err(err) => job_error(err),
    }
}

pub(crate) async fn get_handler(
    State(service): State<Arc<JobService>>,
    Extension(actor): Extension<Actor>,
    Path(job_id): Path<String>,
) -> Response {
    match service.get(&actor, &JobId(job_id)) {
        Ok(job) => response::success(StatusCode::OK, "Job retrieved successfully", job),
        Err(err) => job_error(err),
    }
}

pub(crate) async fn create_handler(
    State(service): State<Arc<JobService>>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return response::json_rejection(rejection),
    };
    match service.create(&actor, request) {
        Ok(job) => response::success(StatusCode::CREATED, "Job created successfully", job),
        Err(err) => job_error(err),
    }
}

pub(crate) async fn update_handler(
    State(service): State<Arc<JobService>>,
    Extension(actor): Extension<Actor>,
    Path(job_id): Path<String>,
    payload: Result<Json<UpdateJobRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return response::json_rejection(rejection),
    };
    match service.update(&actor, &JobId(job_id), request) {
        Ok(job) => response::success(StatusCode::OK, "Job updated successfully", job),
        Err(err) => job_error(err),
    }
}

pub(crate) async fn delete_handler(
    State(service): State<Arc<JobService>>,
    Extension(actor): Extension<Actor>,
    Path(job_id): Path<String>,
) -> Response {
    match service.delete(&actor, &JobId(job_id)) {
        Ok(()) => response::success(
            StatusCode::OK,
            "Job deleted successfully",
            serde_json::Value::Null,
        ),
        Err(err) => job_error(err),
    }
}

fn job_error(err: JobServiceError) -> Response {
    match &err {
        JobServiceError::Rejected(reason) => response::rejection(reason),
        JobServiceError::Validation(errors) => response::validation_failure(errors),
        JobServiceError::Repository(RepositoryError::Conflict) => {
            response::failure(StatusCode::CONFLICT, "Conflict", vec![err.to_string()])
        }
        JobServiceError::Repository(source) => response::internal_error(source),
    }
}
