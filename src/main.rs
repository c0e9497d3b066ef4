//! Frutas API
//!
//! A login endpoint issuing signed, time-bounded JWTs and a token-gated,
//! in-memory fruit list supporting list and append.

use std::sync::Arc;

use tokio::net::TcpListener;

mod api;
mod auth;
mod config;
mod error;
mod logging;
mod store;

use crate::api::build_router;
use crate::auth::{CredentialVerifier, JwtManager, UserStore};
use crate::config::Config;
use crate::store::{FruitStore, InMemoryFruitStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The protected fruit list.
    pub store: Arc<dyn FruitStore>,
    /// JWT manager for token operations.
    pub jwt_manager: JwtManager,
    /// Login credential check.
    pub credentials: Arc<dyn CredentialVerifier>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    // This is optional and won't fail if .env doesn't exist
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    // Load configuration first: it decides how logging is set up
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    // Initialize logging
    logging::init(&config.logging);

    tracing::info!("Starting Frutas API v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        auth = ?config.auth,
        seed_items = config.store.seed.len(),
        log_format = ?config.logging.format,
        "Configuration loaded"
    );

    // Build authentication components
    let jwt_manager = JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.clone(),
        config.auth.jwt_audience.clone(),
        config.auth.token_duration_minutes,
    );
    let user_store = UserStore::new(config.auth.users.clone());

    if user_store.user_count() == 0 {
        tracing::warn!("No users configured - every login will be rejected");
    }

    // Build application state
    let state = AppState {
        store: Arc::new(InMemoryFruitStore::new(config.store.seed.clone())),
        jwt_manager,
        credentials: Arc::new(user_store),
    };

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
