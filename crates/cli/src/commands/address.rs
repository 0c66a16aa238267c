//! `qkart address list|add|remove`

use qkart_core::AddressId;
use qkart_storefront::addresses::AddressBook;
use qkart_storefront::error::{Notice, StoreError};

use super::{App, print_addresses, print_notice};

/// Print the saved addresses.
///
/// # Errors
///
/// Returns an error without a session or if the request fails.
pub async fn list(app: &App) -> Result<(), StoreError> {
    let mut book = AddressBook::new(app.client.clone());
    print_addresses(book.load(&app.session).await?);
    Ok(())
}

/// Save a new address.
///
/// # Errors
///
/// Returns an error for blank text, without a session, or if the request
/// fails.
pub async fn add(app: &App, text: &str) -> Result<(), StoreError> {
    let mut book = AddressBook::new(app.client.clone());
    book.edit_draft(text);
    let addresses = book.submit_draft(&app.session).await?;
    print_notice(&Notice::success("Address added"));
    print_addresses(addresses);
    Ok(())
}

/// Delete a saved address.
///
/// # Errors
///
/// Returns an error without a session or if the request fails.
pub async fn remove(app: &App, id: &AddressId) -> Result<(), StoreError> {
    let mut book = AddressBook::new(app.client.clone());
    let addresses = book.remove(&app.session, id).await?;
    print_notice(&Notice::success("Address deleted"));
    print_addresses(addresses);
    Ok(())
}
