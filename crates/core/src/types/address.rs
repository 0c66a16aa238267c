//! Shipping address type.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// A shipping address owned by the server.
///
/// The backend historically sent `{ "_id", "address" }`; both spellings are
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(alias = "_id")]
    pub id: AddressId,
    #[serde(alias = "address")]
    pub text: String,
}
