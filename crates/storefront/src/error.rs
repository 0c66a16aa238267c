//! Unified error handling with Sentry integration.
//!
//! Every storefront operation returns `Result<T, StoreError>`. None of these
//! errors end the session: each one becomes a [`Notice`], the non-blocking
//! notification the front-end shows to the user.

use std::fmt;

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutRejection;
use crate::session::SessionError;

/// Shown when the server gave no usable message.
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No session credential; nothing was sent to the server.
    #[error("authentication required")]
    AuthRequired,

    /// The product is already in the cart and the action only adds new items.
    #[error("product {product_id} is already in the cart")]
    DuplicateItem { product_id: String },

    /// Local checkout pre-check failed.
    #[error("checkout validation failed: {0}")]
    Validation(CheckoutRejection),

    /// Search yielded nothing.
    #[error("no products found")]
    NotFound,

    /// Network unreachable or malformed response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server rejected request ({status}): {}", message.as_deref().unwrap_or("(no message)"))]
    ServerRejected {
        status: u16,
        message: Option<String>,
    },

    /// Form input rejected before any request was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The session file could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl From<ApiError> for StoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => Self::Transport(e.to_string()),
            ApiError::Parse(e) => Self::Transport(format!("malformed response: {e}")),
            ApiError::Url(e) => Self::Transport(format!("invalid request URL: {e}")),
            ApiError::RateLimited(secs) => Self::ServerRejected {
                status: 429,
                message: Some(format!("Too many requests, retry after {secs} seconds")),
            },
            ApiError::Status { status, message } => Self::ServerRejected { status, message },
        }
    }
}

impl From<CheckoutRejection> for StoreError {
    fn from(rejection: CheckoutRejection) -> Self {
        Self::Validation(rejection)
    }
}

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A user-visible, non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

impl StoreError {
    /// The notification to show for this error.
    ///
    /// Server messages are shown verbatim; transport details are not.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::AuthRequired => Notice::new(Severity::Warning, "Login to continue"),
            Self::DuplicateItem { .. } => Notice::new(
                Severity::Warning,
                "Item already in cart. Use the cart to update quantity or remove item.",
            ),
            Self::Validation(rejection) => Notice::new(
                match rejection {
                    CheckoutRejection::InsufficientBalance { .. } => Severity::Error,
                    _ => Severity::Info,
                },
                rejection.to_string(),
            ),
            Self::NotFound => Notice::new(Severity::Info, "No products found"),
            Self::Transport(_) => Notice::new(
                Severity::Error,
                "Could not reach the server. Check that the backend is running, reachable and returns valid JSON.",
            ),
            Self::ServerRejected { message, .. } => Notice::new(
                Severity::Error,
                message.as_deref().unwrap_or(GENERIC_FAILURE),
            ),
            Self::InvalidInput(message) => Notice::new(Severity::Warning, message.clone()),
            Self::Session(_) => {
                Notice::new(Severity::Error, "Could not save your session on this device.")
            }
        }
    }

    /// Log the error, capture unexpected failures to Sentry, and return
    /// the notice to show.
    pub fn report(&self) -> Notice {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront operation failed"
            );
        } else {
            tracing::warn!(error = %self, "Storefront operation rejected");
        }
        self.notice()
    }

    /// Failures that point at the backend or the device rather than the
    /// user's input.
    const fn is_unexpected(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Session(_) => true,
            Self::ServerRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Set the Sentry user context after login.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Submitted cart entry", Some(&[("product_id", "BW0jAAeDJmlZCF8i")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
