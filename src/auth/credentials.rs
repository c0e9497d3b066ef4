//! Credential verification for the login endpoint.

use std::collections::HashMap;

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// An authenticated identity, as produced by a [`CredentialVerifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// Checks a username/password pair.
///
/// Handlers hold this as a trait object so tests can swap in fakes.
pub trait CredentialVerifier: Send + Sync {
    /// Return the principal when the pair is valid, `None` otherwise.
    fn verify(&self, username: &str, password: &str) -> Option<Principal>;
}

/// Configured user from config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfiguredUser {
    /// Login name.
    pub username: String,
    /// Password hash (SHA256 hex).
    pub password_hash: String,
}

impl ConfiguredUser {
    /// Verify a password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(password).eq_ignore_ascii_case(&self.password_hash)
    }
}

/// SHA256 hex digest of a password, the format `password_hash` is stored in.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-memory user store built from configuration.
#[derive(Clone, Default)]
pub struct UserStore {
    users: HashMap<String, ConfiguredUser>,
}

impl UserStore {
    /// Create a new user store from configured users.
    pub fn new(users: Vec<ConfiguredUser>) -> Self {
        let users = users
            .into_iter()
            .map(|u| (u.username.clone(), u))
            .collect();
        Self { users }
    }

    /// Number of users that can log in.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl CredentialVerifier for UserStore {
    fn verify(&self, username: &str, password: &str) -> Option<Principal> {
        self.users
            .get(username)
            .filter(|user| user.verify_password(password))
            .map(|user| Principal {
                username: user.username.clone(),
            })
    }
}
