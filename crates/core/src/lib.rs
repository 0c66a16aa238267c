//! QKart Core - Shared domain types.
//!
//! This crate provides the types used across all QKart components:
//! - `storefront` - Client library (API client, cart, search, checkout)
//! - `cli` - Terminal front-end driving the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no clocks.
//! This keeps it lightweight and lets the fake backend in the integration
//! tests speak exactly the same wire format as the client.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, catalog products, cart entries, addresses, usernames

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
