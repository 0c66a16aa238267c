//! Accounts, carts and addresses held by the fake backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use qkart_core::{Address, CartEntry, Product};

/// One registered user.
#[derive(Debug, Clone, Default)]
pub(crate) struct Account {
    pub(crate) password: String,
    pub(crate) balance: i64,
    pub(crate) cart: Vec<CartEntry>,
    pub(crate) addresses: Vec<Address>,
}

#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub(crate) catalog: Vec<Product>,
    pub(crate) accounts: HashMap<String, Account>,
    /// token -> username
    pub(crate) tokens: HashMap<String, String>,
    /// `"METHOD /path"` of every request served
    pub(crate) requests: Vec<String>,
    pub(crate) report_balance: bool,
}

/// Shared backend state, also used by tests to seed and inspect it.
#[derive(Debug, Clone, Default)]
pub struct BackendState {
    inner: Arc<Mutex<Inner>>,
}

/// Balance given to accounts created through `/auth/register`.
pub const NEW_ACCOUNT_BALANCE: i64 = 5000;

impl BackendState {
    pub(crate) fn new(catalog: Vec<Product>) -> Self {
        let state = Self::default();
        state.lock().catalog = catalog;
        state
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an account directly, bypassing `/auth/register`.
    pub fn seed_user(&self, username: &str, password: &str, balance: i64) {
        self.lock().accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                balance,
                ..Account::default()
            },
        );
    }

    /// Change a user's balance behind the client's back.
    pub fn set_balance(&self, username: &str, balance: i64) {
        if let Some(account) = self.lock().accounts.get_mut(username) {
            account.balance = balance;
        }
    }

    pub fn set_cart(&self, username: &str, cart: Vec<CartEntry>) {
        if let Some(account) = self.lock().accounts.get_mut(username) {
            account.cart = cart;
        }
    }

    #[must_use]
    pub fn balance_of(&self, username: &str) -> Option<i64> {
        self.lock().accounts.get(username).map(|a| a.balance)
    }

    #[must_use]
    pub fn cart_of(&self, username: &str) -> Vec<CartEntry> {
        self.lock()
            .accounts
            .get(username)
            .map(|a| a.cart.clone())
            .unwrap_or_default()
    }

    /// Make `/cart/checkout` include the post-debit balance in its response.
    pub fn report_balance(&self, enabled: bool) {
        self.lock().report_balance = enabled;
    }

    /// How many requests matched `"METHOD /path"` exactly.
    #[must_use]
    pub fn request_count(&self, request: &str) -> usize {
        self.lock().requests.iter().filter(|r| *r == request).count()
    }

    pub(crate) fn record(&self, request: String) {
        self.lock().requests.push(request);
    }
}
