//! Authentication middleware for axum.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::JwtManager;

/// Error response for authentication failures.
#[derive(Debug, Serialize)]
pub struct AuthError {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// The scheme name is matched case-insensitively (RFC 6750).
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

/// Extract and validate JWT token from request.
///
/// Expects `Authorization: Bearer <token>` header. On success the decoded
/// [`Claims`](crate::auth::Claims) are inserted into the request extensions.
pub async fn require_jwt(
    State(jwt_manager): State<JwtManager>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&request).ok_or_else(|| AuthError {
        error: "Missing authorization token".to_string(),
        code: "MISSING_TOKEN".to_string(),
    })?;

    let claims = jwt_manager.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AuthError {
            error: "Invalid or expired token".to_string(),
            code: "INVALID_TOKEN".to_string(),
        }
    })?;

    // Add claims to request extensions for handlers to access
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
