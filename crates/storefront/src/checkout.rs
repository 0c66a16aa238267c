//! Checkout: the local pre-check and the irreversible submission.
//!
//! [`validate`] runs its rules in a fixed order and the first failure wins,
//! which decides the message the user sees. Passing it does not guarantee
//! the server will accept the order; the wallet balance only changes once
//! the server confirms.

use qkart_core::{AddressId, CartLineItem, Product};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::addresses::AddressSelection;
use crate::api::StoreApi;
use crate::cart::{CartEngine, total_value};
use crate::error::{StoreError, add_breadcrumb};
use crate::session::{SessionContext, SessionStore};

/// Why the local pre-check refused a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutRejection {
    #[error("Please add a new address before proceeding.")]
    NoAddresses,

    #[error("Please select one shipping address to proceed.")]
    NoAddressSelected,

    #[error("You do not have enough balance in your wallet for this purchase")]
    InsufficientBalance { balance: i64, total: i64 },
}

/// A checkout that passed the pre-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutAuthorization {
    pub address_id: AddressId,
    pub total: i64,
    pub new_balance: i64,
}

/// A checkout the server confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub address_id: AddressId,
    pub total: i64,
    pub new_balance: i64,
}

/// Check a checkout against the address and balance rules.
///
/// Rules, first failure wins:
/// 1. there is at least one address
/// 2. one of them is selected
/// 3. the balance covers the cart total
///
/// # Errors
///
/// Returns the first [`CheckoutRejection`] that applies.
pub fn validate(
    items: &[CartLineItem],
    selection: &AddressSelection,
    balance: i64,
) -> Result<CheckoutAuthorization, CheckoutRejection> {
    if selection.is_empty() {
        return Err(CheckoutRejection::NoAddresses);
    }
    let address_id = selection
        .selected()
        .ok_or(CheckoutRejection::NoAddressSelected)?
        .clone();

    let total = total_value(items);
    let new_balance = balance.saturating_sub(total);
    if new_balance < 0 {
        return Err(CheckoutRejection::InsufficientBalance { balance, total });
    }

    Ok(CheckoutAuthorization {
        address_id,
        total,
        new_balance,
    })
}

/// Submits orders and records the resulting balance.
pub struct CheckoutService<A> {
    api: A,
    sessions: SessionStore,
}

impl<A: StoreApi> CheckoutService<A> {
    #[must_use]
    pub const fn new(api: A, sessions: SessionStore) -> Self {
        Self { api, sessions }
    }

    /// Validate, submit, and on confirmation update the wallet balance.
    ///
    /// The balance comes from the server response when it carries one, and
    /// from the local pre-check otherwise. After a confirmed order the
    /// session is saved and the cart re-fetched; failures in those two
    /// follow-ups are reported but do not undo the order.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AuthRequired`] without a session
    /// - [`StoreError::Validation`] when the pre-check fails
    /// - the request error when the server refuses; the balance is untouched
    #[instrument(skip_all)]
    pub async fn checkout<B: StoreApi>(
        &self,
        session: &mut SessionContext,
        cart: &CartEngine<B>,
        catalog: &[Product],
        selection: &AddressSelection,
    ) -> Result<CheckoutReceipt, StoreError> {
        let token = session.require_token()?;
        let items = cart.view(catalog).items;
        let authorization = validate(&items, selection, session.balance())?;

        add_breadcrumb(
            "checkout",
            "Submitted checkout",
            Some(&[("address_id", authorization.address_id.as_str())]),
        );
        let response = self.api.checkout(token, &authorization.address_id).await?;
        if !response.success {
            warn!("Checkout answered without success flag");
            return Err(StoreError::ServerRejected {
                status: 200,
                message: None,
            });
        }

        let new_balance = response.balance.unwrap_or(authorization.new_balance);
        session.set_balance(new_balance);
        if let Err(e) = self.sessions.save(session) {
            StoreError::from(e).report();
        }
        if let Err(e) = cart.load(session).await {
            e.report();
        }

        info!(
            address_id = %authorization.address_id,
            total = authorization.total,
            new_balance,
            "Order placed"
        );
        Ok(CheckoutReceipt {
            address_id: authorization.address_id,
            total: authorization.total,
            new_balance,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::fake::{Call, FakeStore, product, token};
    use qkart_core::{Address, CartEntry};

    fn line(id: &str, cost: i64, quantity: u32) -> CartLineItem {
        CartLineItem::join(&CartEntry::new(id, quantity), &product(id, cost))
    }

    fn address(id: &str) -> Address {
        Address {
            id: AddressId::new(id),
            text: format!("{id} street"),
        }
    }

    fn selected(id: &str) -> AddressSelection {
        let mut selection = AddressSelection::new(vec![address(id)]);
        selection.select(&AddressId::new(id));
        selection
    }

    #[test]
    fn test_no_addresses_wins_regardless_of_balance() {
        let items = vec![line("A", 10, 1)];
        let empty = AddressSelection::default();

        assert_eq!(validate(&items, &empty, 0), Err(CheckoutRejection::NoAddresses));
        assert_eq!(
            validate(&items, &empty, 1_000_000),
            Err(CheckoutRejection::NoAddresses)
        );
    }

    #[test]
    fn test_unselected_address() {
        let items = vec![line("A", 10, 1)];
        let selection = AddressSelection::new(vec![address("a1")]);

        assert_eq!(
            validate(&items, &selection, 5000),
            Err(CheckoutRejection::NoAddressSelected)
        );
    }

    #[test]
    fn test_insufficient_balance() {
        let items = vec![line("A", 50, 3)];

        assert_eq!(
            validate(&items, &selected("a1"), 100),
            Err(CheckoutRejection::InsufficientBalance {
                balance: 100,
                total: 150
            })
        );
    }

    #[test]
    fn test_overpriced_cart_is_insufficient_balance() {
        let items = vec![line("A", i64::MAX, 2), line("B", 10, 1)];

        assert_eq!(
            validate(&items, &selected("a1"), -5),
            Err(CheckoutRejection::InsufficientBalance {
                balance: -5,
                total: i64::MAX
            })
        );
    }

    #[test]
    fn test_exact_balance_succeeds_with_zero() {
        let items = vec![line("A", 50, 3)];

        let authorization = validate(&items, &selected("a1"), 150).unwrap();
        assert_eq!(authorization.total, 150);
        assert_eq!(authorization.new_balance, 0);
        assert_eq!(authorization.address_id, AddressId::new("a1"));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            CheckoutRejection::NoAddresses.to_string(),
            "Please add a new address before proceeding."
        );
        assert_eq!(
            CheckoutRejection::NoAddressSelected.to_string(),
            "Please select one shipping address to proceed."
        );
    }

    struct Fixture {
        store: Arc<FakeStore>,
        cart: CartEngine<Arc<FakeStore>>,
        service: CheckoutService<Arc<FakeStore>>,
        catalog: Vec<Product>,
        _dir: tempfile::TempDir,
        sessions: SessionStore,
    }

    async fn fixture(server_balance: i64, cart: Vec<CartEntry>) -> (Fixture, SessionContext) {
        let catalog = vec![product("A", 50), product("B", 20)];
        let store = Arc::new(FakeStore::with_catalog(catalog.clone()));
        store.set_balance(server_balance);
        store.set_cart(cart);

        let dir = tempfile::tempdir().unwrap();
        let sessions = SessionStore::new(dir.path().join("session.json"));
        let session = SessionContext::signed_in(token(), "criodo", server_balance);

        let engine = CartEngine::new(Arc::clone(&store));
        engine.load(&session).await.unwrap();

        (
            Fixture {
                service: CheckoutService::new(Arc::clone(&store), sessions.clone()),
                store,
                cart: engine,
                catalog,
                _dir: dir,
                sessions,
            },
            session,
        )
    }

    #[tokio::test]
    async fn test_checkout_debits_and_persists() {
        let (fx, mut session) =
            fixture(200, vec![CartEntry::new("A", 2), CartEntry::new("B", 1)]).await;

        let receipt = fx
            .service
            .checkout(&mut session, &fx.cart, &fx.catalog, &selected("a1"))
            .await
            .unwrap();

        assert_eq!(receipt.total, 120);
        assert_eq!(receipt.new_balance, 80);
        assert_eq!(session.balance(), 80);
        assert_eq!(fx.sessions.load().unwrap().balance(), 80);
        assert!(fx.cart.entries().is_empty());
        assert!(fx.store.calls().contains(&Call::Checkout(AddressId::new("a1"))));
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let (fx, mut session) = fixture(100, vec![CartEntry::new("A", 3)]).await;
        let before = fx.store.calls().len();

        let err = fx
            .service
            .checkout(&mut session, &fx.cart, &fx.catalog, &selected("a1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Validation(CheckoutRejection::InsufficientBalance { .. })
        ));
        assert_eq!(fx.store.calls().len(), before);
        assert_eq!(session.balance(), 100);
    }

    #[tokio::test]
    async fn test_server_rejection_keeps_balance() {
        let (fx, mut session) = fixture(500, vec![CartEntry::new("A", 2)]).await;
        // Balance spent elsewhere after the session was loaded.
        fx.store.set_balance(10);

        let err = fx
            .service
            .checkout(&mut session, &fx.cart, &fx.catalog, &selected("a1"))
            .await
            .unwrap_err();

        assert_eq!(
            err.notice().message,
            "Wallet balance not sufficient to place order"
        );
        assert_eq!(session.balance(), 500);
        assert!(!fx.sessions.path().exists());
        assert_eq!(fx.cart.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_checkout_requires_login() {
        let (fx, _) = fixture(500, vec![CartEntry::new("A", 1)]).await;
        let mut anonymous = SessionContext::anonymous();

        let err = fx
            .service
            .checkout(&mut anonymous, &fx.cart, &fx.catalog, &selected("a1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AuthRequired));
    }
}
