//! Backend API access.
//!
//! # Architecture
//!
//! - [`StoreApi`] is the seam every engine talks to; [`StoreClient`] is the
//!   `reqwest` implementation
//! - The server is source of truth - no local sync, every mutation returns
//!   or is followed by an authoritative snapshot
//! - The full catalog is cached in-memory via `moka`; search results never are
//!
//! # Routes
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | GET | `/products` | no |
//! | GET | `/products/search?value=` | no |
//! | GET/POST | `/cart` | bearer |
//! | POST | `/cart/checkout` | bearer |
//! | GET/POST | `/user/addresses` | bearer |
//! | DELETE | `/user/addresses/:id` | bearer |
//! | POST | `/auth/login`, `/auth/register` | no |

mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use qkart_core::{Address, AddressId, CartEntry, CartEntryInput, Product};
use secrecy::SecretString;
use thiserror::Error;

pub use client::StoreClient;
pub use types::{CheckoutResponse, LoginResponse};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success status, with the server's `message` when it sent one.
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("(no message)"))]
    Status {
        status: u16,
        message: Option<String>,
    },
}

impl ApiError {
    /// Whether the server answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Whether the failure happened below HTTP (no usable response).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Parse(_) | Self::Url(_))
    }
}

/// Operations the storefront needs from the backend.
///
/// Every mutating call returns the server's new authoritative snapshot.
pub trait StoreApi: Send + Sync {
    /// `GET /products`
    fn products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// `GET /products/search?value=<text>`; a 404 means "no results".
    fn search_products(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// `GET /cart`
    fn cart(&self, token: &SecretString)
    -> impl Future<Output = Result<Vec<CartEntry>, ApiError>> + Send;

    /// `POST /cart`; `quantity <= 0` removes the entry.
    fn submit_cart_entry(
        &self,
        token: &SecretString,
        entry: &CartEntryInput,
    ) -> impl Future<Output = Result<Vec<CartEntry>, ApiError>> + Send;

    /// `GET /user/addresses`
    fn addresses(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send;

    /// `POST /user/addresses`
    fn add_address(
        &self,
        token: &SecretString,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send;

    /// `DELETE /user/addresses/:id`
    fn delete_address(
        &self,
        token: &SecretString,
        id: &AddressId,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send;

    /// `POST /cart/checkout`
    fn checkout(
        &self,
        token: &SecretString,
        address_id: &AddressId,
    ) -> impl Future<Output = Result<CheckoutResponse, ApiError>> + Send;

    /// `POST /auth/login`
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `POST /auth/register`
    fn register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Share one backend handle between the engines.
impl<T: StoreApi> StoreApi for Arc<T> {
    fn products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
        (**self).products()
    }

    fn search_products(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send {
        (**self).search_products(text)
    }

    fn cart(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<CartEntry>, ApiError>> + Send {
        (**self).cart(token)
    }

    fn submit_cart_entry(
        &self,
        token: &SecretString,
        entry: &CartEntryInput,
    ) -> impl Future<Output = Result<Vec<CartEntry>, ApiError>> + Send {
        (**self).submit_cart_entry(token, entry)
    }

    fn addresses(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send {
        (**self).addresses(token)
    }

    fn add_address(
        &self,
        token: &SecretString,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send {
        (**self).add_address(token, text)
    }

    fn delete_address(
        &self,
        token: &SecretString,
        id: &AddressId,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send {
        (**self).delete_address(token, id)
    }

    fn checkout(
        &self,
        token: &SecretString,
        address_id: &AddressId,
    ) -> impl Future<Output = Result<CheckoutResponse, ApiError>> + Send {
        (**self).checkout(token, address_id)
    }

    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send {
        (**self).login(username, password)
    }

    fn register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).register(username, password)
    }
}
