//! Core domain types for QKart.
//!
//! This module provides type-safe wrappers for the catalog, the cart, and
//! the account.

pub mod address;
pub mod cart;
pub mod id;
pub mod product;
pub mod username;

pub use address::Address;
pub use cart::{CartEntry, CartEntryInput, CartLineItem};
pub use id::*;
pub use product::{MAX_RATING, Product};
pub use username::{Username, UsernameError};
