//! JSON envelope shared by every API response.
//!
//! Successes: `{"success": true, "message", "data", "meta"?}`.
//! Failures: `{"success": false, "message", "errors", "code"?}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use validator::ValidationErrors;

use crate::pagination::PageMeta;
use crate::policy::RejectReason;

pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    let body = json!({
        "success": true,
        "message": message,
        "data": data,
    });
    (status, Json(body)).into_response()
}

pub fn success_page<T: Serialize>(message: &str, items: Vec<T>, meta: PageMeta) -> Response {
    let body = json!({
        "success": true,
        "message": message,
        "data": items,
        "meta": meta,
    });
    (StatusCode::OK, Json(body)).into_response()
}

pub fn failure(status: StatusCode, message: &str, errors: Vec<String>) -> Response {
    let body = json!({
        "success": false,
        "message": message,
        "errors": errors,
    });
    (status, Json(body)).into_response()
}

pub fn rejection_status(reason: &RejectReason) -> StatusCode {
    match reason {
        RejectReason::Unauthorized | RejectReason::WrongRole { .. } => StatusCode::FORBIDDEN,
        RejectReason::NotFoundUpstream(_) => StatusCode::NOT_FOUND,
        RejectReason::DuplicateApplication => StatusCode::CONFLICT,
        RejectReason::InvalidTransition { .. } | RejectReason::NoFieldsToUpdate => {
            StatusCode::BAD_REQUEST
        }
    }
}

/// Policy rejection, carrying the reason's stable code next to its message.
pub fn rejection(reason: &RejectReason) -> Response {
    let status = rejection_status(reason);
    let body = json!({
        "success": false,
        "message": status.canonical_reason().unwrap_or("Request rejected"),
        "errors": [reason.to_string()],
        "code": reason.code(),
    });
    (status, Json(body)).into_response()
}

/// Flatten field errors into sorted, human-readable messages.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    messages
}

pub fn validation_failure(errors: &ValidationErrors) -> Response {
    failure(
        StatusCode::BAD_REQUEST,
        "Validation failed",
        validation_messages(errors),
    )
}

/// Malformed JSON bodies become 400s in the same envelope instead of axum's
/// plain-text rejection.
pub fn json_rejection(rejection: JsonRejection) -> Response {
    failure(
        StatusCode::BAD_REQUEST,
        "Invalid request body",
        vec![rejection.body_text()],
    )
}

/// Run password hashing or disk I/O on tokio's blocking pool. A panicked
/// task becomes a 500.
pub async fn blocking<T, F>(work: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| internal_error(&err))
}

/// Logs the underlying error and returns a generic 500.
pub fn internal_error(error: &dyn std::error::Error) -> Response {
    tracing::error!(error = %error, "request failed");
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
        vec!["an unexpected error occurred".to_string()],
    )
}
