//! `qkart cart show|add|inc|dec`

use qkart_core::ProductId;
use qkart_storefront::api::{StoreApi, StoreClient};
use qkart_storefront::cart::{CartEngine, CartView};
use qkart_storefront::error::StoreError;

use super::{App, print_cart};

/// Print the cart reconciled against the catalog.
///
/// # Errors
///
/// Returns an error if the cart or the catalog cannot be fetched.
pub async fn show(app: &App) -> Result<(), StoreError> {
    let engine = loaded(app).await?;
    print_cart(&view(app, &engine).await?);
    Ok(())
}

/// Add a product from the catalog.
///
/// # Errors
///
/// Returns an error if the product is already in the cart or the server
/// refuses.
pub async fn add(app: &App, product_id: &ProductId) -> Result<(), StoreError> {
    let engine = loaded(app).await?;
    engine.add_new(&app.session, product_id).await?;
    print_cart(&view(app, &engine).await?);
    Ok(())
}

/// Raise a product's quantity by one.
///
/// # Errors
///
/// Returns an error if the server refuses.
pub async fn increment(app: &App, product_id: &ProductId) -> Result<(), StoreError> {
    let engine = loaded(app).await?;
    engine.increment(&app.session, product_id).await?;
    print_cart(&view(app, &engine).await?);
    Ok(())
}

/// Lower a product's quantity by one.
///
/// # Errors
///
/// Returns an error if the server refuses.
pub async fn decrement(app: &App, product_id: &ProductId) -> Result<(), StoreError> {
    let engine = loaded(app).await?;
    engine.decrement(&app.session, product_id).await?;
    print_cart(&view(app, &engine).await?);
    Ok(())
}

/// An engine holding the server cart, for a signed-in session.
async fn loaded(app: &App) -> Result<CartEngine<StoreClient>, StoreError> {
    app.session.require_token()?;
    let engine = CartEngine::new(app.client.clone());
    engine.load(&app.session).await?;
    Ok(engine)
}

async fn view(app: &App, engine: &CartEngine<StoreClient>) -> Result<CartView, StoreError> {
    let catalog = app.client.products().await?;
    Ok(engine.view(&catalog))
}
