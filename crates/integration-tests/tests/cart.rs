//! Cart mutations and reconciliation over HTTP.

mod common;

use common::{Harness, USERNAME};
use qkart_core::ProductId;
use qkart_integration_tests::entries;
use qkart_storefront::SessionContext;
use qkart_storefront::api::{StoreApi, StoreClient};
use qkart_storefront::cart::{CartEngine, CartView};
use qkart_storefront::error::StoreError;

const DUFFLE: &str = "BW0jAAeDJmlZCF8i";
const BONSAI: &str = "KCRwjF7lN97HnEaY";

fn id(s: &str) -> ProductId {
    ProductId::new(s)
}

async fn engine(harness: &Harness, session: &SessionContext) -> CartEngine<StoreClient> {
    let engine = CartEngine::new(harness.client.clone());
    engine.load(session).await.expect("Failed to load cart");
    engine
}

async fn view(harness: &Harness, engine: &CartEngine<StoreClient>) -> CartView {
    let catalog = harness.client.products().await.expect("Failed to load catalog");
    engine.view(&catalog)
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_add_increment_decrement() {
    let harness = Harness::start(5000).await;
    let session = harness.login().await;
    let cart = engine(&harness, &session).await;

    cart.add_new(&session, &id(DUFFLE)).await.expect("Failed to add");
    cart.increment(&session, &id(DUFFLE)).await.expect("Failed to increment");
    cart.add_new(&session, &id(BONSAI)).await.expect("Failed to add");

    let view = view(&harness, &cart).await;
    assert_eq!(view.total_count, 3);
    assert_eq!(view.total_value, 150 * 2 + 100);
    assert_eq!(
        harness.backend.state().cart_of(USERNAME),
        entries(&[(DUFFLE, 2), (BONSAI, 1)])
    );

    cart.decrement(&session, &id(BONSAI)).await.expect("Failed to decrement");
    assert_eq!(cart.entries(), entries(&[(DUFFLE, 2)]));
    assert_eq!(harness.backend.state().cart_of(USERNAME), cart.entries());
}

#[tokio::test]
async fn test_duplicate_add_is_refused_locally() {
    let harness = Harness::start(5000).await;
    let session = harness.login().await;
    harness
        .backend
        .state()
        .set_cart(USERNAME, entries(&[(DUFFLE, 1)]));
    let cart = engine(&harness, &session).await;

    let err = cart
        .add_new(&session, &id(DUFFLE))
        .await
        .expect_err("Duplicate add should fail");

    assert!(matches!(err, StoreError::DuplicateItem { .. }));
    assert_eq!(
        err.notice().message,
        "Item already in cart. Use the cart to update quantity or remove item."
    );
    assert_eq!(harness.backend.state().request_count("POST /cart"), 0);
}

#[tokio::test]
async fn test_anonymous_mutation_needs_login() {
    let harness = Harness::start(5000).await;
    let anonymous = SessionContext::anonymous();
    let cart = engine(&harness, &anonymous).await;

    let err = cart
        .add_new(&anonymous, &id(DUFFLE))
        .await
        .expect_err("Anonymous add should fail");

    assert!(matches!(err, StoreError::AuthRequired));
    assert_eq!(err.notice().message, "Login to continue");
    assert_eq!(harness.backend.state().request_count("GET /cart"), 0);
    assert_eq!(harness.backend.state().request_count("POST /cart"), 0);
}

#[tokio::test]
async fn test_server_refusal_leaves_cart_unchanged() {
    let harness = Harness::start(5000).await;
    let session = harness.login().await;
    let cart = engine(&harness, &session).await;
    cart.add_new(&session, &id(DUFFLE)).await.expect("Failed to add");

    let err = cart
        .add_new(&session, &id("no-such-product"))
        .await
        .expect_err("Unknown product should fail");

    assert_eq!(err.notice().message, "Product doesn't exist");
    assert_eq!(cart.entries(), entries(&[(DUFFLE, 1)]));
}

#[tokio::test]
async fn test_expired_token_is_server_rejection() {
    let harness = Harness::start(5000).await;
    let stale = SessionContext::signed_in(common::secret("expired-token"), USERNAME, 5000);
    let cart = CartEngine::new(harness.client.clone());

    let err = cart.load(&stale).await.expect_err("Load should fail");
    assert!(matches!(err, StoreError::ServerRejected { status: 401, .. }));
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_withdrawn_product_is_hidden() {
    let harness = Harness::start(5000).await;
    let session = harness.login().await;
    harness
        .backend
        .state()
        .set_cart(USERNAME, entries(&[("withdrawn-item", 4), (BONSAI, 2)]));
    let cart = engine(&harness, &session).await;

    let view = view(&harness, &cart).await;
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.total_value, 200);
    assert_eq!(view.total_count, 2);
}

#[tokio::test]
async fn test_empty_cart_view() {
    let harness = Harness::start(5000).await;
    let session = harness.login().await;
    let cart = engine(&harness, &session).await;

    let view = view(&harness, &cart).await;
    assert!(view.is_empty());
    assert_eq!(view, CartView::empty());
}
