//! Cart reconciliation and mutation.
//!
//! - [`reconcile`] turns server entries plus the catalog into line items
//! - [`mutation`] submits changes and re-syncs from the server

pub mod mutation;
pub mod reconcile;

use qkart_core::{CartEntry, CartLineItem, Product};

pub use mutation::{CartAction, CartEngine, MutationMode, Step, plan_mutation};
pub use reconcile::{reconcile, total_count, total_value};

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub total_value: i64,
    pub total_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reconcile `entries` against `catalog` and total the result.
    #[must_use]
    pub fn build(entries: &[CartEntry], catalog: &[Product]) -> Self {
        let items = reconcile(entries, catalog);
        Self {
            total_value: total_value(&items),
            total_count: total_count(&items),
            items,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
