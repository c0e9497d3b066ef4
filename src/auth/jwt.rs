//! JWT issuance and validation for API clients.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// JWT claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Seconds between issuance and expiry.
    pub expires_in: i64,
}

/// JWT token manager.
///
/// Tokens are HS256-signed and stateless: nothing about an issued token is
/// kept server-side, so validity is decided purely by signature, issuer,
/// audience and expiry.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    /// Token validity duration in minutes.
    token_duration_minutes: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret.
    pub fn new(secret: &str, issuer: String, audience: String, token_duration_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            token_duration_minutes,
        }
    }

    /// Generate a token for an authenticated subject, valid from now.
    pub fn generate_token(&self, subject: &str) -> ApiResult<IssuedToken> {
        self.generate_token_at(subject, Utc::now())
    }

    /// Generate a token as if issued at `issued_at`.
    pub(crate) fn generate_token_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> ApiResult<IssuedToken> {
        let lifetime = Duration::try_minutes(self.token_duration_minutes).ok_or_else(|| {
            ApiError::Internal(format!(
                "Token duration of {} minutes is out of range",
                self.token_duration_minutes
            ))
        })?;
        let expires_at = issued_at.checked_add_signed(lifetime).ok_or_else(|| {
            ApiError::Internal("Token expiry overflows the supported time range".to_string())
        })?;

        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: lifetime.num_seconds(),
        })
    }

    /// Validate and decode a JWT token.
    ///
    /// Rejects bad signatures, foreign issuers or audiences, and any token
    /// that is not strictly before its expiry (no leeway).
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = 0;

        let token_data: TokenData<Claims> =
            decode(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                ApiError::Unauthorized(format!("Invalid token: {}", e))
            })?;

        // jsonwebtoken still accepts `exp == now`.
        if token_data.claims.exp <= Utc::now().timestamp() {
            tracing::debug!(exp = token_data.claims.exp, "JWT reached its expiry");
            return Err(ApiError::Unauthorized("Invalid token: expired".to_string()));
        }

        Ok(token_data.claims)
    }
}
