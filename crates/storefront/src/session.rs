//! Session context and its persistence.
//!
//! The session (bearer token, username, wallet balance) is an explicit value
//! handed to whichever component needs it. It is read from disk once at
//! startup and written back only at the points that change it: login,
//! logout and a confirmed checkout.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StoreError;

/// Errors reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The signed-in user, if any, and their wallet balance.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Default)]
pub struct SessionContext {
    token: Option<SecretString>,
    username: Option<String>,
    balance: i64,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

impl SessionContext {
    /// A session with no signed-in user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session for a user who just logged in.
    #[must_use]
    pub fn signed_in(token: SecretString, username: impl Into<String>, balance: i64) -> Self {
        Self {
            token: Some(token),
            username: Some(username.into()),
            balance,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// The bearer token, or `AuthRequired` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AuthRequired`] for an anonymous session.
    pub fn require_token(&self) -> Result<&SecretString, StoreError> {
        self.token.as_ref().ok_or(StoreError::AuthRequired)
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub const fn balance(&self) -> i64 {
        self.balance
    }

    /// Record the wallet balance after a confirmed checkout.
    pub const fn set_balance(&mut self, balance: i64) {
        self.balance = balance;
    }

    /// Forget the signed-in user.
    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }
}

/// On-disk form of [`SessionContext`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default)]
    balance: i64,
}

impl From<&SessionContext> for PersistedSession {
    fn from(session: &SessionContext) -> Self {
        Self {
            token: session.token.as_ref().map(|t| t.expose_secret().to_owned()),
            username: session.username.clone(),
            balance: session.balance,
        }
    }
}

impl From<PersistedSession> for SessionContext {
    fn from(persisted: PersistedSession) -> Self {
        Self {
            token: persisted
                .token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            username: persisted.username,
            balance: persisted.balance,
        }
    }
}

/// JSON file holding the persisted session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session; a missing file is an anonymous session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<SessionContext, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No session file, starting anonymous");
                return Ok(SessionContext::anonymous());
            }
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedSession = serde_json::from_str(&raw)?;
        Ok(persisted.into())
    }

    /// Write the session to disk, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, session: &SessionContext) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(&PersistedSession::from(session))?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }
}
