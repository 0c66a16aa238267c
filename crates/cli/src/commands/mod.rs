//! Subcommand implementations.
//!
//! Each command builds the engines it needs from [`App`], runs one user
//! action and prints the result. Errors are returned, not printed.

pub mod account;
pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;

use qkart_core::{Address, Product};
use qkart_storefront::api::StoreClient;
use qkart_storefront::cart::CartView;
use qkart_storefront::error::{Notice, StoreError};
use qkart_storefront::{SessionContext, SessionStore, StoreConfig};

/// Shared state for one invocation.
pub struct App {
    pub config: StoreConfig,
    pub client: StoreClient,
    pub sessions: SessionStore,
    pub session: SessionContext,
}

impl App {
    /// Build the HTTP client and load the saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the session file
    /// is unreadable.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let client = StoreClient::new(&config)?;
        let sessions = SessionStore::new(config.session_file.clone());
        let session = sessions.load()?;
        Ok(Self {
            config,
            client,
            sessions,
            session,
        })
    }
}

#[allow(clippy::print_stdout)]
pub fn print_notice(notice: &Notice) {
    println!("{notice}");
}

#[allow(clippy::print_stdout)]
pub fn print_products(products: &[Product]) {
    for product in products {
        println!(
            "{:<18} {:<32} {:<12} {:>7} {}",
            product.id,
            product.name,
            product.category,
            product.cost,
            stars(product.stars())
        );
    }
}

#[allow(clippy::print_stdout)]
pub fn print_cart(view: &CartView) {
    if view.is_empty() {
        println!("Cart is empty. Add more items to the cart to checkout.");
        return;
    }
    for item in &view.items {
        println!(
            "{:<18} {:<32} {:>3} x {:>6} = {:>7}",
            item.product_id,
            item.name,
            item.quantity,
            item.cost,
            item.subtotal()
        );
    }
    println!("Items: {}", view.total_count);
    println!("Total: {}", view.total_value);
}

#[allow(clippy::print_stdout)]
pub fn print_addresses(addresses: &[Address]) {
    if addresses.is_empty() {
        println!("No addresses found for this account. Please add one to proceed.");
        return;
    }
    for address in addresses {
        println!("{:<18} {}", address.id, address.text);
    }
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(qkart_core::MAX_RATING));
    let empty = usize::from(qkart_core::MAX_RATING) - filled;
    format!("{}{}", "*".repeat(filled), ".".repeat(empty))
}
