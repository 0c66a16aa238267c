//! Joining the sparse server cart with the catalog.
//!
//! Pure functions: no I/O, no shared state, the catalog is only read.

use std::collections::HashMap;

use qkart_core::{CartEntry, CartLineItem, Product, ProductId};
use tracing::debug;

/// Build display line items from cart entries, in cart order.
///
/// Entries whose product is missing from the catalog are dropped: the two
/// can briefly disagree after a product is withdrawn. Zero-quantity entries
/// are dropped too, since absence already means quantity 0.
#[must_use]
pub fn reconcile(entries: &[CartEntry], catalog: &[Product]) -> Vec<CartLineItem> {
    // First product wins if the catalog ever repeats an id.
    let mut by_id: HashMap<&ProductId, &Product> = HashMap::with_capacity(catalog.len());
    for product in catalog {
        by_id.entry(&product.id).or_insert(product);
    }

    entries
        .iter()
        .filter(|entry| entry.quantity > 0)
        .filter_map(|entry| match by_id.get(&entry.product_id) {
            Some(product) => Some(CartLineItem::join(entry, product)),
            None => {
                debug!(product_id = %entry.product_id, "Cart entry not in catalog, skipping");
                None
            }
        })
        .collect()
}

/// Sum of `cost * quantity`; 0 for an empty cart.
///
/// Saturates instead of overflowing on absurd server-supplied costs.
#[must_use]
pub fn total_value(items: &[CartLineItem]) -> i64 {
    items
        .iter()
        .map(CartLineItem::subtotal)
        .fold(0, i64::saturating_add)
}

/// Sum of quantities; 0 for an empty cart.
#[must_use]
pub fn total_count(items: &[CartLineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "General".to_string(),
            cost,
            rating: 3,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_single_item_end_to_end() {
        let catalog = vec![product("A", 10)];
        let entries = vec![CartEntry::new("A", 2)];

        let items = reconcile(&entries, &catalog);
        assert_eq!(items.len(), 1);
        let item = items.first().map(|i| (i.product_id.as_str(), i.cost, i.quantity));
        assert_eq!(item, Some(("A", 10, 2)));
        assert_eq!(total_value(&items), 20);
        assert_eq!(total_count(&items), 2);
    }

    #[test]
    fn test_unknown_products_are_omitted() {
        let catalog = vec![product("A", 10), product("B", 5)];
        let entries = vec![
            CartEntry::new("ghost", 4),
            CartEntry::new("B", 1),
            CartEntry::new("withdrawn", 1),
        ];

        let items = reconcile(&entries, &catalog);
        let ids: Vec<&str> = items.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[test]
    fn test_empty_catalog_yields_nothing() {
        let entries = vec![CartEntry::new("A", 1)];
        assert!(reconcile(&entries, &[]).is_empty());
    }

    #[test]
    fn test_zero_quantity_entries_are_omitted() {
        let catalog = vec![product("A", 10)];
        let entries = vec![CartEntry::new("A", 0)];
        assert!(reconcile(&entries, &catalog).is_empty());
    }

    #[test]
    fn test_preserves_cart_order() {
        let catalog = vec![product("A", 1), product("B", 2), product("C", 3)];
        let entries = vec![
            CartEntry::new("C", 1),
            CartEntry::new("A", 1),
            CartEntry::new("B", 1),
        ];

        let ids: Vec<String> = reconcile(&entries, &catalog)
            .into_iter()
            .map(|i| i.product_id.into_inner())
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_catalog_is_not_modified() {
        let catalog = vec![product("A", 10)];
        let before = catalog.clone();
        let _ = reconcile(&[CartEntry::new("A", 7)], &catalog);
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_deterministic() {
        let catalog = vec![product("A", 10), product("B", 3)];
        let entries = vec![CartEntry::new("B", 2), CartEntry::new("A", 1)];
        assert_eq!(reconcile(&entries, &catalog), reconcile(&entries, &catalog));
    }

    #[test]
    fn test_totals_of_empty_cart() {
        assert_eq!(total_value(&[]), 0);
        assert_eq!(total_count(&[]), 0);
    }

    #[test]
    fn test_total_value_saturates() {
        let catalog = vec![product("A", i64::MAX), product("B", 1)];
        let items = reconcile(&[CartEntry::new("A", 1), CartEntry::new("B", 2)], &catalog);
        assert_eq!(total_value(&items), i64::MAX);
    }

    #[test]
    fn test_total_value_is_additive() {
        let catalog = vec![product("A", 10), product("B", 7), product("C", 120)];
        let left = reconcile(&[CartEntry::new("A", 3)], &catalog);
        let right = reconcile(&[CartEntry::new("B", 2), CartEntry::new("C", 1)], &catalog);

        let mut both = left.clone();
        both.extend(right.iter().cloned());

        assert_eq!(total_value(&both), total_value(&left) + total_value(&right));
        assert_eq!(total_value(&both), 30 + 14 + 120);
        assert_eq!(total_count(&both), 6);
    }
}
