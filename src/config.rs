//! Configuration module for the Frutas API.
//!
//! Loads configuration from YAML files and environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::ConfiguredUser;

/// Minimum accepted length of the HMAC signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted from configuration (30 days).
pub const MAX_TOKEN_DURATION_MINUTES: i64 = 30 * 24 * 60;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Token issuance and credential configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Symmetric HMAC key. Must come from the environment or a local file.
    #[serde(default)]
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_duration_minutes: i64,
    /// Users allowed to log in.
    #[serde(default)]
    pub users: Vec<ConfiguredUser>,
}

// Keeps the secret out of `Configuration loaded` style debug output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("token_duration_minutes", &self.token_duration_minutes)
            .field("users", &self.users.len())
            .finish()
    }
}

/// Resource store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Items the store holds at startup, in order.
    pub seed: Vec<String>,
}

/// Log output configuration. `RUST_LOG` still wins over `filter`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    pub format: LogFormat,
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, for log shippers.
    Json,
    /// Human-readable lines, for local development.
    Pretty,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (FRUTAS__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            // Start with default config
            .add_source(File::with_name("config/default").required(false))
            // Layer on local overrides
            .add_source(File::with_name("config/local").required(false))
            // Layer on environment variables with FRUTAS prefix
            .add_source(
                Environment::with_prefix("FRUTAS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }
}

impl AuthConfig {
    /// Reject settings that would make issued tokens unsafe or unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "auth.jwt_secret must be set and at least {MIN_SECRET_LEN} bytes long"
            )));
        }
        if !(1..=MAX_TOKEN_DURATION_MINUTES).contains(&self.token_duration_minutes) {
            return Err(ConfigError::Message(format!(
                "auth.token_duration_minutes must be between 1 and {MAX_TOKEN_DURATION_MINUTES}"
            )));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed: vec![
                "Maçã".to_string(),
                "Banana".to_string(),
                "Laranja".to_string(),
            ],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "frutas_api=info,tower_http=info".to_string(),
            format: LogFormat::Json,
        }
    }
}
