//! In-memory [`StoreApi`] used by the engine unit tests.
//!
//! Behaves like the real backend for the happy paths, records every call,
//! and can be told to fail the next request.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use qkart_core::{Address, AddressId, CartEntry, CartEntryInput, Product, ProductId};
use secrecy::SecretString;

use super::types::{CheckoutResponse, LoginResponse};
use super::{ApiError, StoreApi};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Products,
    Search(String),
    Cart,
    SubmitCart(CartEntryInput),
    Addresses,
    AddAddress(String),
    DeleteAddress(AddressId),
    Checkout(AddressId),
    Login(String),
    Register(String),
}

enum Failure {
    Status(u16, Option<String>),
    Transport,
}

#[derive(Default)]
struct FakeState {
    catalog: Vec<Product>,
    cart: Vec<CartEntry>,
    addresses: Vec<Address>,
    next_address: u32,
    users: HashMap<String, String>,
    balance: i64,
    calls: Vec<Call>,
    fail_next: Option<Failure>,
    search_delays: HashMap<String, Duration>,
    submit_delays: HashMap<ProductId, Duration>,
}

#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

pub fn product(id: &str, cost: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        category: "General".to_string(),
        cost,
        rating: 4,
        image_url: format!("https://img.example/{id}.png"),
    }
}

pub fn token() -> SecretString {
    SecretString::from("test-token")
}

impl FakeStore {
    pub fn with_catalog(catalog: Vec<Product>) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().catalog = catalog;
        store
    }

    pub fn set_cart(&self, cart: Vec<CartEntry>) {
        self.state.lock().unwrap().cart = cart;
    }

    pub fn set_balance(&self, balance: i64) {
        self.state.lock().unwrap().balance = balance;
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(username.to_string(), password.to_string());
    }

    pub fn delay_search(&self, text: &str, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .search_delays
            .insert(text.to_string(), delay);
    }

    /// Hold `POST /cart` for `product_id` for `delay` before it takes effect.
    pub fn delay_submit(&self, product_id: &str, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .submit_delays
            .insert(ProductId::new(product_id), delay);
    }

    pub fn fail_next_with_status(&self, status: u16, message: Option<&str>) {
        self.state.lock().unwrap().fail_next =
            Some(Failure::Status(status, message.map(str::to_string)));
    }

    pub fn fail_next_with_transport_error(&self) {
        self.state.lock().unwrap().fail_next = Some(Failure::Transport);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn server_cart(&self) -> Vec<CartEntry> {
        self.state.lock().unwrap().cart.clone()
    }

    /// Record the call and consume a pending failure.
    fn enter(&self, call: Call) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.fail_next.take() {
            None => Ok(state),
            Some(Failure::Status(status, message)) => Err(ApiError::Status { status, message }),
            Some(Failure::Transport) => Err(ApiError::Parse(
                serde_json::from_str::<()>("<html>").unwrap_err(),
            )),
        }
    }
}

impl StoreApi for FakeStore {
    async fn products(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self.enter(Call::Products)?.catalog.clone())
    }

    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let (found, delay) = {
            let state = self.enter(Call::Search(text.to_string()))?;
            let needle = text.to_lowercase();
            let found: Vec<Product> = state
                .catalog
                .iter()
                .filter(|p| {
                    p.name.to_lowercase().contains(&needle)
                        || p.category.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect();
            (found, state.search_delays.get(text).copied())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if found.is_empty() {
            return Err(ApiError::Status {
                status: 404,
                message: None,
            });
        }
        Ok(found)
    }

    async fn cart(&self, _token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        Ok(self.enter(Call::Cart)?.cart.clone())
    }

    async fn submit_cart_entry(
        &self,
        _token: &SecretString,
        entry: &CartEntryInput,
    ) -> Result<Vec<CartEntry>, ApiError> {
        let delay = self
            .state
            .lock()
            .unwrap()
            .submit_delays
            .get(&entry.product_id)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.enter(Call::SubmitCart(entry.clone()))?;
        let position = state
            .cart
            .iter()
            .position(|e| e.product_id == entry.product_id);

        match (u32::try_from(entry.quantity), position) {
            (Ok(quantity), Some(i)) if quantity > 0 => {
                state.cart.get_mut(i).unwrap().quantity = quantity;
            }
            (Ok(quantity), None) if quantity > 0 => {
                state
                    .cart
                    .push(CartEntry::new(entry.product_id.clone(), quantity));
            }
            (_, Some(i)) => {
                state.cart.remove(i);
            }
            (_, None) => {}
        }
        Ok(state.cart.clone())
    }

    async fn addresses(&self, _token: &SecretString) -> Result<Vec<Address>, ApiError> {
        Ok(self.enter(Call::Addresses)?.addresses.clone())
    }

    async fn add_address(&self, _token: &SecretString, text: &str) -> Result<Vec<Address>, ApiError> {
        let mut state = self.enter(Call::AddAddress(text.to_string()))?;
        state.next_address += 1;
        let id = AddressId::new(format!("addr-{}", state.next_address));
        state.addresses.push(Address {
            id,
            text: text.to_string(),
        });
        Ok(state.addresses.clone())
    }

    async fn delete_address(
        &self,
        _token: &SecretString,
        id: &AddressId,
    ) -> Result<Vec<Address>, ApiError> {
        let mut state = self.enter(Call::DeleteAddress(id.clone()))?;
        state.addresses.retain(|a| &a.id != id);
        Ok(state.addresses.clone())
    }

    async fn checkout(
        &self,
        _token: &SecretString,
        address_id: &AddressId,
    ) -> Result<CheckoutResponse, ApiError> {
        let mut state = self.enter(Call::Checkout(address_id.clone()))?;
        let total: i64 = state
            .cart
            .iter()
            .filter_map(|e| {
                state
                    .catalog
                    .iter()
                    .find(|p| p.id == e.product_id)
                    .map(|p| p.cost * i64::from(e.quantity))
            })
            .sum();
        if total > state.balance {
            return Err(ApiError::Status {
                status: 400,
                message: Some("Wallet balance not sufficient to place order".to_string()),
            });
        }
        state.balance -= total;
        state.cart.clear();
        Ok(CheckoutResponse {
            success: true,
            balance: None,
        })
    }

    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        use secrecy::ExposeSecret;

        let state = self.enter(Call::Login(username.to_string()))?;
        match state.users.get(username) {
            Some(stored) if stored == password.expose_secret() => Ok(LoginResponse {
                token: format!("token-{username}"),
                username: username.to_string(),
                balance: state.balance,
            }),
            Some(_) => Err(ApiError::Status {
                status: 400,
                message: Some("Password is incorrect".to_string()),
            }),
            None => Err(ApiError::Status {
                status: 400,
                message: Some("Username does not exist".to_string()),
            }),
        }
    }

    async fn register(&self, username: &str, password: &SecretString) -> Result<(), ApiError> {
        use secrecy::ExposeSecret;

        let mut state = self.enter(Call::Register(username.to_string()))?;
        if state.users.contains_key(username) {
            return Err(ApiError::Status {
                status: 400,
                message: Some("Username is already taken".to_string()),
            });
        }
        state
            .users
            .insert(username.to_string(), password.expose_secret().to_string());
        Ok(())
    }
}
