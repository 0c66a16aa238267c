//! Catalog product type.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Highest rating a product can carry.
pub const MAX_RATING: u8 = 5;

/// An immutable catalog entry.
///
/// Owned by the remote catalog service and cached read-only by the client
/// for the session. The backend historically used `_id` and `image` as
/// field names; both spellings are accepted when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Price in whole currency units.
    pub cost: i64,
    /// Aggregate rating out of five.
    #[serde(default)]
    pub rating: u8,
    #[serde(alias = "image", default)]
    pub image_url: String,
}

impl Product {
    /// Rating clamped to `0..=5`, for display.
    #[must_use]
    pub fn stars(&self) -> u8 {
        self.rating.min(MAX_RATING)
    }
}
