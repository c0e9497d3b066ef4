//! HTTP request handlers.

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use crate::api::types::*;
use crate::auth::Claims;
use crate::error::{extract_json, ApiError, ApiResult};
use crate::AppState;

// ==================== Authentication Endpoints ====================

/// Login to obtain a JWT token.
///
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let request = extract_json(body)?;

    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let principal = state
        .credentials
        .verify(&request.username, &request.password)
        .ok_or_else(|| {
            tracing::warn!(username = %request.username, "Failed login attempt");
            ApiError::Unauthorized("Invalid username or password".to_string())
        })?;

    let issued = state.jwt_manager.generate_token(&principal.username)?;

    tracing::info!(
        username = %principal.username,
        expires_at = %issued.expires_at,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}

// ==================== Fruit Endpoints ====================

/// List every fruit in insertion order.
///
/// GET /api/frutas
#[utoipa::path(
    get,
    path = "/api/frutas",
    responses(
        (status = 200, description = "Current fruit list", body = Vec<String>),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "frutas"
)]
pub async fn list_frutas(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.store.list().await)
}

/// Append a fruit and return the updated list.
///
/// POST /api/frutas
#[utoipa::path(
    post,
    path = "/api/frutas",
    request_body(content = String, description = "Fruit name as a JSON string"),
    responses(
        (status = 200, description = "Updated fruit list", body = Vec<String>),
        (status = 400, description = "Body is not a JSON string"),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "frutas"
)]
pub async fn add_fruta(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<String>, JsonRejection>,
) -> ApiResult<Json<Vec<String>>> {
    let fruta = extract_json(body)?;

    tracing::info!(fruta = %fruta, by = %claims.sub, "Appending fruit");

    Ok(Json(state.store.append(fruta).await))
}

// ==================== Health ====================

/// Health check endpoint.
///
/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        items: state.store.count().await,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
