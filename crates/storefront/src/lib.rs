//! QKart storefront client library.
//!
//! Everything a front-end needs to drive the store: catalog loading and
//! debounced search, a cart kept in step with the server, address
//! management, and a validated checkout that debits the wallet.
//!
//! # Architecture
//!
//! - [`api`] - the backend seam ([`api::StoreApi`]) and its HTTP client
//! - [`cart`] - reconciliation of server entries against the catalog, and
//!   the mutation engine
//! - [`search`] - keystroke debouncing with stale-response protection
//! - [`checkout`] - the ordered pre-check and the order submission
//! - [`addresses`] - shipping addresses and the checkout selection
//! - [`account`] - login, registration and logout
//! - [`session`] - the signed-in user, passed explicitly and saved to disk
//!
//! Errors from every operation become a [`error::Notice`] for the user;
//! none of them end the session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod addresses;
pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod search;
pub mod sequence;
pub mod session;

pub use config::StoreConfig;
pub use error::{Notice, Severity, StoreError};
pub use session::{SessionContext, SessionStore};
