//! # Session Module
//!
//! Per-role bearer tokens and the store that keeps them between runs.
//!
//! A [`Session`] is an explicit value handed to the API client. Nothing
//! reads tokens from ambient global state: the app loads a session from a
//! [`TokenStore`] and passes it along.
//!
//! Stores:
//! - [`RedbTokenStore`]: embedded redb database, survives restarts
//! - [`MemoryTokenStore`]: in-process map for tests and one-shot runs

mod redb_store;

pub use redb_store::RedbTokenStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

// =============================================================================
// ROLE
// =============================================================================

/// Who a token belongs to. Admin and influencer tokens are kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Influencer,
}

impl Role {
    /// Key the token is stored under.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Role::Admin => "adminToken",
            Role::Influencer => "influencerToken",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Influencer => "influencer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "influencer" => Ok(Role::Influencer),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// An authenticated identity: a role plus its bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub token: String,
}

impl Session {
    #[must_use]
    pub fn new(role: Role, token: impl Into<String>) -> Self {
        Self {
            role,
            token: token.into(),
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// What the persistent store writes per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    /// Unix seconds at save time.
    pub saved_at_unix: i64,
}

// =============================================================================
// STORE
// =============================================================================

/// Errors from token storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Token database error: {0}")]
    Database(String),

    #[error("Token encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    #[error("Token store lock poisoned")]
    Poisoned,
}

/// Persistence for per-role tokens.
pub trait TokenStore {
    /// Load the session for a role, if one was saved.
    fn load(&self, role: Role) -> Result<Option<Session>, StoreError>;

    /// Save (or replace) the session for its role.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Forget the session for a role. Returns whether one existed.
    fn clear(&self, role: Role) -> Result<bool, StoreError>;
}

/// Token store backed by an in-memory map.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<BTreeMap<Role, String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, role: Role) -> Result<Option<Session>, StoreError> {
        let tokens = self.tokens.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(tokens.get(&role).map(|token| Session::new(role, token.clone())))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().map_err(|_| StoreError::Poisoned)?;
        tokens.insert(session.role, session.token.clone());
        Ok(())
    }

    fn clear(&self, role: Role) -> Result<bool, StoreError> {
        let mut tokens = self.tokens.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(tokens.remove(&role).is_some())
    }
}

// =============================================================================
// TESTS
// =============================================================================
