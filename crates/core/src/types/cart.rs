//! Cart types.
//!
//! The server holds the cart as a sparse list of [`CartEntry`] values. The
//! client joins them against the catalog into [`CartLineItem`]s for display.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// A server-held `(productId, quantity)` pair.
///
/// Absence of a product id means quantity 0, so a well-formed cart never
/// carries a zero quantity. The legacy `qty` field name is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product_id: ProductId,
    #[serde(alias = "qty")]
    pub quantity: u32,
}

impl CartEntry {
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Body of `POST /cart`.
///
/// Unlike [`CartEntry`], the quantity may be zero or negative: the server
/// treats `quantity <= 0` as "remove this entry".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntryInput {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CartEntryInput {
    /// Whether the server will read this submission as a removal.
    #[must_use]
    pub const fn is_removal(&self) -> bool {
        self.quantity <= 0
    }
}

/// A cart entry joined with its catalog product.
///
/// Ephemeral: recomputed whenever the catalog or the cart changes and never
/// sent back to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub cost: i64,
    pub name: String,
    pub category: String,
    pub rating: u8,
    pub image_url: String,
}

impl CartLineItem {
    /// Build a line item from an entry and the product it refers to.
    ///
    /// Copies out of the product; the catalog is never modified.
    #[must_use]
    pub fn join(entry: &CartEntry, product: &Product) -> Self {
        Self {
            product_id: entry.product_id.clone(),
            quantity: entry.quantity,
            cost: product.cost,
            name: product.name.clone(),
            category: product.category.clone(),
            rating: product.rating,
            image_url: product.image_url.clone(),
        }
    }

    /// `cost * quantity` for this line, saturating at the `i64` bounds.
    #[must_use]
    pub fn subtotal(&self) -> i64 {
        self.cost.saturating_mul(i64::from(self.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_entry_accepts_qty_alias() {
        let entry: CartEntry = serde_json::from_str(r#"{"productId":"A","qty":3}"#).unwrap();
        assert_eq!(entry, CartEntry::new("A", 3));
    }

    #[test]
    fn test_entry_input_removal() {
        let input = CartEntryInput {
            product_id: ProductId::new("A"),
            quantity: 0,
        };
        assert!(input.is_removal());

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"productId": "A", "quantity": 0}));
    }

    #[test]
    fn test_line_item_subtotal() {
        let product = Product {
            id: ProductId::new("A"),
            name: "Lamp".to_string(),
            category: "Home".to_string(),
            cost: 10,
            rating: 4,
            image_url: String::new(),
        };
        let item = CartLineItem::join(&CartEntry::new("A", 2), &product);
        assert_eq!(item.subtotal(), 20);
        assert_eq!(item.name, "Lamp");
    }

    #[test]
    fn test_line_item_subtotal_saturates() {
        let product = Product {
            id: ProductId::new("A"),
            name: "Yacht".to_string(),
            category: "Sports".to_string(),
            cost: i64::MAX / 2,
            rating: 5,
            image_url: String::new(),
        };
        let item = CartLineItem::join(&CartEntry::new("A", 3), &product);
        assert_eq!(item.subtotal(), i64::MAX);
    }
}
