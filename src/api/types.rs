//! API request and response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ==================== Authentication ====================

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name.
    #[serde(alias = "userName")]
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Signed bearer token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

// ==================== Health ====================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Items currently held by the store.
    pub items: usize,
    /// Timestamp.
    pub timestamp: String,
}
