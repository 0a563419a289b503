use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Extension, Json, Router,
};

use super::domain::{ApplySubmission, ResumeUpload, StatusUpdateRequest};
use super::service::{ApplicationService, ApplicationServiceError};
use super::storage::RESUME_LINK_PREFIX;
use crate::identity::domain::Role;
use crate::ids::{ApplicationId, JobId};
use crate::pagination::PageQuery;
use crate::policy::{self, Actor};
use crate::response;
use crate::store::RepositoryError;

/// Headroom for the cover letter and multipart framing on top of the resume cap.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Router builder exposing application intake, listings, status changes and
/// stored resumes.
/// Every route expects an [`Actor`] extension from the bearer middleware.
pub fn application_router(service: Arc<ApplicationService>) -> Router {
    let body_limit = service.max_resume_bytes().saturating_add(FORM_OVERHEAD_BYTES);
    Router::new()
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(job_applications_handler)
                .post(apply_handler)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/v1/applications/me", get(my_applications_handler))
        .route(
            "/api/v1/applications/:application_id/status",
            put(status_handler),
        )
        .route("/uploads/:file_name", get(resume_handler))
        .with_state(service)
}

pub(crate) async fn apply_handler(
    State(service): State<Arc<ApplicationService>>,
    Extension(actor): Extension<Actor>,
    Path(job_id): Path<String>,
    form: Result<Multipart, MultipartRejection>,
) -> Response {
    if let Err(reason) = policy::require_role(&actor, Role::Applicant) {
        return response::rejection(&reason);
    }
    let form = match form {
        Ok(form) => form,
        Err(rejection) => {
            return response::failure(
                StatusCode::BAD_REQUEST,
                "Failed to parse form data",
                vec![rejection.body_text()],
            )
        }
    };
    let submission = match read_submission(form).await {
        Ok(submission) => submission,
        Err(response) => return response,
    };

    let job_id = JobId(job_id);
    let outcome =
        match response::blocking(move || service.apply(&actor, &job_id, submission)).await {
            Ok(outcome) => outcome,
            Err(response) => return response,
        };
    match outcome {
        Ok(application) => response::success(
            StatusCode::CREATED,
            "Application submitted successfully",
            application,
        ),
        Err(err) => application_error(err),
    }
}

/// Collects the `resume` file and optional `cover_letter` text; other fields
/// are ignored.
async fn read_submission(mut form: Multipart) -> Result<ApplySubmission, Response> {
    let mut resume = None;
    let mut cover_letter = None;

    loop {
        let field = match form.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return Err(multipart_failure(err.status(), err.body_text())),
        };
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| multipart_failure(err.status(), err.body_text()))?;
                resume = Some(ResumeUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("cover_letter") => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| multipart_failure(err.status(), err.body_text()))?;
                cover_letter = Some(text);
            }
            _ => {}
        }
    }

    let Some(resume) = resume else {
        return Err(response::failure(
            StatusCode::BAD_REQUEST,
            "Resume file is required",
            vec!["missing multipart field 'resume'".to_string()],
        ));
    };
    Ok(ApplySubmission {
        cover_letter,
        resume,
    })
}

fn multipart_failure(status: StatusCode, detail: String) -> Response {
    let status = if status.is_client_error() {
        status
    } else {
        StatusCode::BAD_REQUEST
    };
    response::failure(status, "Failed to parse form data", vec![detail])
}

pub(crate) async fn my_applications_handler(
    State(service): State<Arc<ApplicationService>>,
    Extension(actor): Extension<Actor>,
    Query(page): Query<PageQuery>,
) -> Response {
    match service.my_applications(&actor, page.request()) {
        Ok((views, meta)) => {
            response::success_page("Applications retrieved successfully", views, meta)
        }
        Err(err) => application_error(err),
    }
}

pub(crate) async fn job_applications_handler(
    State(service): State<Arc<ApplicationService>>,
    Extension(actor): Extension<Actor>,
    Path(job_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Response {
    match service.job_applications(&actor, &JobId(job_id), page.request()) {
        Ok((views, meta)) => {
            response::success_page("Applications retrieved successfully", views, meta)
        }
        Err(err) => application_error(err),
    }
}

pub(crate) async fn status_handler(
    State(service): State<Arc<ApplicationService>>,
    Extension(actor): Extension<Actor>,
    Path(application_id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return response::json_rejection(rejection),
    };
    match service.update_status(&actor, &ApplicationId(application_id), request) {
        Ok(change) => response::success(
            StatusCode::OK,
            "Application status updated successfully",
            change,
        ),
        Err(err) => application_error(err),
    }
}

/// Streams a stored resume back as `application/pdf`. The path is the one
/// stored in `resume_link`.
pub(crate) async fn resume_handler(
    State(service): State<Arc<ApplicationService>>,
    Extension(actor): Extension<Actor>,
    Path(file_name): Path<String>,
) -> Response {
    let link = format!("{RESUME_LINK_PREFIX}{file_name}");
    let outcome = match response::blocking(move || service.resume(&actor, &link)).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };
    match outcome {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::APPLICATION_PDF.as_ref())],
            bytes,
        )
            .into_response(),
        Err(err) => application_error(err),
    }
}

fn application_error(err: ApplicationServiceError) -> Response {
    match &err {
        ApplicationServiceError::Rejected(reason) => response::rejection(reason),
        ApplicationServiceError::Validation(errors) => response::validation_failure(errors),
        ApplicationServiceError::InvalidStatus(_) => response::failure(
            StatusCode::BAD_REQUEST,
            "Invalid status",
            vec![err.to_string()],
        ),
        ApplicationServiceError::Storage(source) if source.is_client_error() => {
            response::failure(
                StatusCode::BAD_REQUEST,
                "Invalid resume",
                vec![err.to_string()],
            )
        }
        ApplicationServiceError::Storage(source) => response::internal_error(source),
        ApplicationServiceError::Repository(RepositoryError::Conflict) => response::failure(
            StatusCode::CONFLICT,
            "Conflict",
            vec!["the application was modified concurrently; retry the request".to_string()],
        ),
        ApplicationServiceError::Repository(source) => response::internal_error(source),
    }
}
