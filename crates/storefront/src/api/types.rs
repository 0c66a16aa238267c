//! Request and response bodies that only exist on the wire.
//!
//! Domain types (products, cart entries, addresses) live in `qkart-core`.

use qkart_core::AddressId;
use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsBody {
    pub username: String,
    pub password: String,
}

/// Successful `POST /auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub balance: i64,
}

/// Body of `POST /user/addresses`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddAddressBody {
    pub address: String,
}

/// Body of `POST /cart/checkout`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub address_id: AddressId,
}

/// `POST /cart/checkout` response.
///
/// Current backends only send `success`. A backend that also reports the
/// wallet balance after the debit lets the client skip its own arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
}

/// Shape of every error body the backend sends.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extract a non-empty message from a raw response body, if any.
    #[must_use]
    pub fn message_from(raw: &str) -> Option<String> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty())
    }
}
