//! HTTP API layer for the Frutas API.
//!
//! Provides the login endpoint and the token-gated fruit list endpoints.

pub mod handlers;
mod routes;
mod types;

pub use routes::build_router;
