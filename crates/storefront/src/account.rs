//! Login, registration and logout.
//!
//! Form input is checked locally first, so an obviously bad form never
//! reaches the backend. The server's own refusals ("Password is incorrect",
//! "Username is already taken") come back as [`StoreError::ServerRejected`]
//! and are shown verbatim.

use qkart_core::Username;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use crate::api::StoreApi;
use crate::error::{StoreError, clear_sentry_user, set_sentry_user};
use crate::session::{SessionContext, SessionStore};

/// Minimum length of a new password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn invalid(message: &str) -> StoreError {
    StoreError::InvalidInput(message.to_string())
}

/// Check the login form.
///
/// # Errors
///
/// Returns [`StoreError::InvalidInput`] for the first empty field.
pub fn validate_login(username: &str, password: &SecretString) -> Result<(), StoreError> {
    if username.trim().is_empty() {
        return Err(invalid("Username is a required field"));
    }
    if password.expose_secret().is_empty() {
        return Err(invalid("Password is a required field"));
    }
    Ok(())
}

/// Check the registration form, returning the parsed username.
///
/// # Errors
///
/// Returns [`StoreError::InvalidInput`] for the first rule that fails:
/// username present and long enough, password present and long enough,
/// confirmation matching.
pub fn validate_registration(
    username: &str,
    password: &SecretString,
    confirm: &SecretString,
) -> Result<Username, StoreError> {
    let username = Username::parse(username).map_err(|e| StoreError::InvalidInput(e.to_string()))?;

    let password = password.expose_secret();
    if password.is_empty() {
        return Err(invalid("Password is a required field"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(invalid("Password must be at least 6 characters"));
    }
    if password != confirm.expose_secret() {
        return Err(invalid("Passwords do not match"));
    }
    Ok(username)
}

/// Account operations that change who is signed in.
pub struct AccountService<A> {
    api: A,
    sessions: SessionStore,
}

impl<A: StoreApi> AccountService<A> {
    #[must_use]
    pub const fn new(api: A, sessions: SessionStore) -> Self {
        Self { api, sessions }
    }

    /// Sign in and persist the new session.
    ///
    /// # Errors
    ///
    /// Form errors without a request, the server's refusal, or a failure to
    /// save the session.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SessionContext, StoreError> {
        validate_login(username, password)?;

        let response = self.api.login(username.trim(), password).await?;
        let session = SessionContext::signed_in(
            SecretString::from(response.token),
            response.username,
            response.balance,
        );
        self.sessions.save(&session)?;

        if let Some(name) = session.username() {
            set_sentry_user(name);
        }
        info!(balance = session.balance(), "Logged in");
        Ok(session)
    }

    /// Create an account. The user still has to log in afterwards.
    ///
    /// # Errors
    ///
    /// Form errors without a request, or the server's refusal.
    #[instrument(skip(self, password, confirm))]
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
        confirm: &SecretString,
    ) -> Result<Username, StoreError> {
        let username = validate_registration(username, password, confirm)?;
        self.api.register(username.as_str(), password).await?;
        info!(username = %username, "Registered");
        Ok(username)
    }

    /// Forget the signed-in user, on disk too.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleared session cannot be saved; the
    /// in-memory session is cleared regardless.
    pub fn logout(&self, session: &mut SessionContext) -> Result<(), StoreError> {
        session.clear();
        clear_sentry_user();
        self.sessions.save(session)?;
        info!("Logged out");
        Ok(())
    }
}
