use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use super::credentials::TokenAuthority;
use crate::response;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenAuthority>,
}

impl AuthState {
    pub fn new(tokens: Arc<dyn TokenAuthority>) -> Self {
        Self { tokens }
    }
}

/// Resolves the bearer token into an [`Actor`](crate::policy::Actor) request
/// extension, or answers 401.
pub async fn require_bearer(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return unauthorized("missing bearer token");
    };

    let actor = match state.tokens.verify(token) {
        Ok(actor) => actor,
        Err(err) => {
            tracing::debug!(error = %err, "rejected bearer token");
            return unauthorized("invalid or expired token");
        }
    };

    req.extensions_mut().insert(actor);
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn unauthorized(detail: &str) -> Response {
    response::failure(
        StatusCode::UNAUTHORIZED,
        "Unauthorized",
        vec![detail.to_string()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_trimmed_bearer_tokens_only() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def "));
        assert_eq!(extract_bearer(&headers), Some("abc.def"));
    }
}
