//! `qkart checkout --address <id>`

use qkart_core::AddressId;
use qkart_storefront::addresses::AddressBook;
use qkart_storefront::api::StoreApi;
use qkart_storefront::cart::CartEngine;
use qkart_storefront::checkout::CheckoutService;
use qkart_storefront::error::{Notice, StoreError};

use super::{App, print_notice};

/// Place the order for the current cart, shipped to `address_id`.
///
/// An `address_id` that is not among the saved addresses leaves nothing
/// selected, and the checkout is refused the same way an unselected form
/// would be.
///
/// # Errors
///
/// Returns an error if the pre-check fails or the server refuses the order.
#[allow(clippy::print_stdout)]
pub async fn checkout(app: &mut App, address_id: &AddressId) -> Result<(), StoreError> {
    let cart = CartEngine::new(app.client.clone());
    cart.load(&app.session).await?;

    let mut book = AddressBook::new(app.client.clone());
    book.load(&app.session).await?;
    book.select(address_id);

    let catalog = app.client.products().await?;
    let service = CheckoutService::new(app.client.clone(), app.sessions.clone());
    let receipt = service
        .checkout(&mut app.session, &cart, &catalog, book.selection())
        .await?;

    print_notice(&Notice::success("Order placed successfully"));
    println!("Shipping to: {}", receipt.address_id);
    println!("Total: {}", receipt.total);
    println!("Wallet: {}", receipt.new_balance);
    Ok(())
}
