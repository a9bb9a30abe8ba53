//! Login gate: credential store, password checks and bearer-token sessions.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::http::{HeaderMap, header::AUTHORIZATION};
use common::{AuthStatus, Identity};
use moka::future::Cache;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while loading credentials or hashing passwords
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to read credential file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse credential file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Username '{0}' is listed more than once")]
    DuplicateUser(String),

    #[error("Password hash of '{username}' is invalid: {reason}")]
    InvalidHash { username: String, reason: String },

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// One user of the credential file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Display name
    pub name: String,
    /// Login identifier
    pub username: String,
    /// Argon2 hash in PHC string format
    pub password_hash: String,
}

/// On-disk layout of the credential file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialFile {
    pub users: Vec<CredentialRecord>,
}

/// Known users keyed by username.
pub struct CredentialStore {
    users: HashMap<String, CredentialRecord>,
}

impl CredentialStore {
    /// Usernames must be unique and every hash must be a valid PHC string.
    pub fn from_records(records: Vec<CredentialRecord>) -> Result<Self, AuthError> {
        let mut users = HashMap::with_capacity(records.len());
        for record in records {
            PasswordHash::new(&record.password_hash).map_err(|e| AuthError::InvalidHash {
                username: record.username.clone(),
                reason: e.to_string(),
            })?;
            if users.contains_key(&record.username) {
                return Err(AuthError::DuplicateUser(record.username));
            }
            users.insert(record.username.clone(), record);
        }
        Ok(Self { users })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let file: CredentialFile = serde_json::from_str(&content)?;
        debug!("Read {} credential records", file.users.len());
        Self::from_records(file.users)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    fn get(&self, username: &str) -> Option<&CredentialRecord> {
        self.users.get(username)
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("users", &self.users.len())
            .finish()
    }
}

/// Checks submitted credentials against a [`CredentialStore`].
#[derive(Debug)]
pub struct Authenticator {
    store: CredentialStore,
    /// Hash of a random password, verified for unknown users so that every
    /// non-blank attempt costs one Argon2 verification
    decoy_hash: Option<String>,
}

impl Authenticator {
    pub fn new(store: CredentialStore) -> Self {
        let decoy_hash = hash_password(&uuid::Uuid::new_v4().to_string())
            .map_err(|e| warn!("Failed to prepare decoy hash: {}", e))
            .ok();
        Self { store, decoy_hash }
    }

    /// `Pending` when nothing was submitted, `Rejected` for an unknown user or
    /// a wrong password.
    ///
    /// Password verification is CPU bound; call from a blocking context.
    pub fn check(&self, username: &str, password: &str) -> AuthStatus {
        let username = username.trim();
        if username.is_empty() && password.is_empty() {
            return AuthStatus::Pending;
        }

        let Some(record) = self.store.get(username) else {
            if let Some(decoy) = &self.decoy_hash {
                verify_password(decoy, password);
            }
            warn!("Login attempt for unknown user '{}'", username);
            return AuthStatus::Rejected;
        };

        if verify_password(&record.password_hash, password) {
            info!("User '{}' authenticated", username);
            AuthStatus::Authenticated {
                identity: Identity {
                    name: record.name.clone(),
                    username: record.username.clone(),
                },
            }
        } else {
            warn!("Wrong password for user '{}'", username);
            AuthStatus::Rejected
        }
    }
}

fn verify_password(password_hash: &str, password: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Hashes a password with Argon2id and a random salt, in PHC string format.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Token in an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// In-memory login sessions that expire after a fixed time to live.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Cache<String, Identity>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        Self { sessions, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a session and returns its bearer token.
    pub async fn open(&self, identity: Identity) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        debug!("Opening session for '{}'", identity.username);
        self.sessions.insert(token.clone(), identity).await;
        token
    }

    /// `Pending` without a token, `Rejected` for an unknown or expired one.
    pub async fn status(&self, token: Option<&str>) -> AuthStatus {
        let Some(token) = token else {
            return AuthStatus::Pending;
        };
        match self.sessions.get(token).await {
            Some(identity) => AuthStatus::Authenticated { identity },
            None => AuthStatus::Rejected,
        }
    }

    /// Ends a session; returns whether it existed.
    pub async fn close(&self, token: &str) -> bool {
        self.sessions.remove(token).await.is_some()
    }
}
