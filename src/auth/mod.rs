//! Authentication module for the Frutas API.
//!
//! - Credentials: verifies login username/password pairs
//! - JWT: issues and validates the bearer tokens that gate the store

mod credentials;
mod jwt;
mod middleware;

pub use credentials::*;
pub use jwt::*;
pub use middleware::*;
