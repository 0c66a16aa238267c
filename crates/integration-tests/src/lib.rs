//! End-to-end tests for the QKart storefront client.
//!
//! [`FakeBackend`] serves the QKart REST contract from memory on an
//! ephemeral port, so the tests in `tests/` drive the real `reqwest` client
//! without any external service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `account` - login, registration, logout and session persistence
//! - `catalog` - catalog caching and debounced search
//! - `cart` - cart mutations and reconciliation
//! - `checkout` - addresses and the checkout flow

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;

use qkart_core::{CartEntry, Product, ProductId};
use qkart_storefront::StoreConfig;
use qkart_storefront::config::ConfigError;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub use state::{BackendState, NEW_ACCOUNT_BALANCE};

/// An in-memory QKart backend listening on `127.0.0.1`.
///
/// The server task is aborted when this value is dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    state: BackendState,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend serving [`default_catalog`].
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with_catalog(default_catalog()).await
    }

    /// Start a backend serving `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn_with_catalog(catalog: Vec<Product>) -> std::io::Result<Self> {
        let state = BackendState::new(catalog);
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = routes::router(state.clone());
        let server = tokio::spawn(async move {
            // The listener only fails when the test runtime shuts down.
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the API, e.g. `http://127.0.0.1:41234/api/v1`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Client configuration for this backend, persisting the session in
    /// `session_file`.
    ///
    /// # Errors
    ///
    /// Only fails if the generated URL is invalid.
    pub fn config(&self, session_file: &Path) -> Result<StoreConfig, ConfigError> {
        let mut config = StoreConfig::for_api_url(&self.api_url())?;
        config.session_file = session_file.to_path_buf();
        Ok(config)
    }

    #[must_use]
    pub const fn state(&self) -> &BackendState {
        &self.state
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A small catalog using the backend's id format.
#[must_use]
pub fn default_catalog() -> Vec<Product> {
    [
        ("BW0jAAeDJmlZCF8i", "Tan Leatherette Weekender Duffle", "Fashion", 150, 4),
        ("KCRwjF7lN97HnEaY", "Bonsai Spirit Tree", "Home & Kitchen", 100, 3),
        ("PmInA797xJhMIPti", "YONEX Smash Badminton Racquet", "Sports", 100, 5),
        ("TwMM4OAhmK0VQ93S", "Stylecon 9 Seater RHS Sofa Set", "Home & Kitchen", 650, 3),
        ("upLK9JbQ4rMhTwt4", "Atomberg 1200mm BLDC Fan", "Electronics", 40, 5),
    ]
    .into_iter()
    .map(|(id, name, category, cost, rating)| Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        cost,
        rating,
        image_url: format!("https://crio-directus-assets.s3.ap-south-1.amazonaws.com/{id}.png"),
    })
    .collect()
}

/// Shorthand for building a cart in tests.
#[must_use]
pub fn entries(pairs: &[(&str, u32)]) -> Vec<CartEntry> {
    pairs
        .iter()
        .map(|(id, quantity)| CartEntry::new(*id, *quantity))
        .collect()
}
