//! Route handlers of the fake backend.
//!
//! Status codes and error messages follow the real QKart backend closely
//! enough for the client's error handling to be exercised end to end.

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use qkart_core::{Address, AddressId, CartEntry, CartEntryInput, Product};
use qkart_storefront::api::types::{
    AddAddressBody, CheckoutBody, CheckoutResponse, CredentialsBody, ErrorBody,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::state::{Account, BackendState, NEW_ACCOUNT_BALANCE};

const API_PREFIX: &str = "/api/v1";

/// A non-success response with the backend's error body.
struct Failure {
    status: StatusCode,
    message: &'static str,
}

impl Failure {
    const fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    const fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Protected route, Oauth2 Bearer token not found",
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: Some(self.message.to_string()),
        };
        (self.status, Json(body)).into_response()
    }
}

type Reply<T> = Result<Json<T>, Failure>;

/// Every route, mounted under `/api/v1`.
pub fn router(state: BackendState) -> Router {
    Router::new()
        .nest(API_PREFIX, api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

fn api_routes() -> Router<BackendState> {
    Router::new()
        .route("/products", get(products))
        .route("/products/search", get(search))
        .route("/cart", get(cart).post(update_cart))
        .route("/cart/checkout", post(checkout))
        .route("/user/addresses", get(addresses).post(add_address))
        .route("/user/addresses/{id}", delete(delete_address))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

async fn record(State(state): State<BackendState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let path = path.strip_prefix(API_PREFIX).unwrap_or(path);
    state.record(format!("{} {path}", request.method()));
    next.run(request).await
}

/// Resolve the bearer token to a username.
fn authenticate(state: &BackendState, headers: &HeaderMap) -> Result<String, Failure> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(Failure::unauthorized)?;

    state
        .lock()
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(Failure::unauthorized)
}

/// Run `f` on the signed-in user's account.
fn with_account<T>(
    state: &BackendState,
    headers: &HeaderMap,
    f: impl FnOnce(&mut Account, &[Product]) -> Result<T, Failure>,
) -> Result<T, Failure> {
    let username = authenticate(state, headers)?;
    let mut inner = state.lock();
    let inner = &mut *inner;
    let account = inner
        .accounts
        .get_mut(&username)
        .ok_or_else(Failure::unauthorized)?;
    f(account, &inner.catalog)
}

// =============================================================================
// Catalog
// =============================================================================

async fn products(State(state): State<BackendState>) -> Json<Vec<Product>> {
    Json(state.lock().catalog.clone())
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    value: String,
}

async fn search(State(state): State<BackendState>, Query(query): Query<SearchQuery>) -> Response {
    let needle = query.value.to_lowercase();
    let found: Vec<Product> = state
        .lock()
        .catalog
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    if found.is_empty() {
        (StatusCode::NOT_FOUND, Json(found)).into_response()
    } else {
        Json(found).into_response()
    }
}

// =============================================================================
// Cart
// =============================================================================

async fn cart(State(state): State<BackendState>, headers: HeaderMap) -> Reply<Vec<CartEntry>> {
    with_account(&state, &headers, |account, _| Ok(Json(account.cart.clone())))
}

async fn update_cart(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(input): Json<CartEntryInput>,
) -> Reply<Vec<CartEntry>> {
    with_account(&state, &headers, |account, catalog| {
        if !catalog.iter().any(|p| p.id == input.product_id) {
            return Err(Failure::bad_request("Product doesn't exist"));
        }

        let position = account
            .cart
            .iter()
            .position(|e| e.product_id == input.product_id);
        match (u32::try_from(input.quantity).ok().filter(|q| *q > 0), position) {
            (Some(quantity), Some(i)) => {
                if let Some(entry) = account.cart.get_mut(i) {
                    entry.quantity = quantity;
                }
            }
            (Some(quantity), None) => {
                account
                    .cart
                    .push(CartEntry::new(input.product_id.clone(), quantity));
            }
            (None, Some(i)) => {
                account.cart.remove(i);
            }
            (None, None) => {}
        }
        Ok(Json(account.cart.clone()))
    })
}

async fn checkout(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> Reply<CheckoutResponse> {
    let report_balance = state.lock().report_balance;

    with_account(&state, &headers, |account, catalog| {
        if account.cart.is_empty() {
            return Err(Failure::bad_request("Cart is empty"));
        }
        if !account.addresses.iter().any(|a| a.id == body.address_id) {
            return Err(Failure::bad_request("Address not set"));
        }

        let total: i64 = account
            .cart
            .iter()
            .filter_map(|entry| {
                catalog
                    .iter()
                    .find(|p| p.id == entry.product_id)
                    .map(|p| p.cost * i64::from(entry.quantity))
            })
            .sum();
        if total > account.balance {
            return Err(Failure::bad_request(
                "Wallet balance not sufficient to place order",
            ));
        }

        account.balance -= total;
        account.cart.clear();
        Ok(Json(CheckoutResponse {
            success: true,
            balance: report_balance.then_some(account.balance),
        }))
    })
}

// =============================================================================
// Addresses
// =============================================================================

async fn addresses(State(state): State<BackendState>, headers: HeaderMap) -> Reply<Vec<Address>> {
    with_account(&state, &headers, |account, _| {
        Ok(Json(account.addresses.clone()))
    })
}

async fn add_address(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<AddAddressBody>,
) -> Reply<Vec<Address>> {
    with_account(&state, &headers, |account, _| {
        if body.address.trim().is_empty() {
            return Err(Failure::bad_request("Address is required"));
        }
        account.addresses.push(Address {
            id: AddressId::new(Uuid::new_v4().simple().to_string()),
            text: body.address.clone(),
        });
        Ok(Json(account.addresses.clone()))
    })
}

async fn delete_address(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Vec<Address>> {
    with_account(&state, &headers, |account, _| {
        let before = account.addresses.len();
        account.addresses.retain(|a| a.id.as_str() != id);
        if account.addresses.len() == before {
            return Err(Failure {
                status: StatusCode::NOT_FOUND,
                message: "Address to delete was not found",
            });
        }
        Ok(Json(account.addresses.clone()))
    })
}

// =============================================================================
// Auth
// =============================================================================

async fn login(State(state): State<BackendState>, Json(body): Json<CredentialsBody>) -> Reply<Value> {
    let mut inner = state.lock();
    let balance = match inner.accounts.get(&body.username) {
        None => return Err(Failure::bad_request("Username does not exist")),
        Some(account) if account.password != body.password => {
            return Err(Failure::bad_request("Password is incorrect"));
        }
        Some(account) => account.balance,
    };

    let token = Uuid::new_v4().to_string();
    inner.tokens.insert(token.clone(), body.username.clone());
    Ok(Json(json!({
        "success": true,
        "token": token,
        "username": body.username,
        "balance": balance,
    })))
}

async fn register(
    State(state): State<BackendState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let mut inner = state.lock();
    if inner.accounts.contains_key(&body.username) {
        return Err(Failure::bad_request("Username is already taken"));
    }
    inner.accounts.insert(
        body.username,
        Account {
            password: body.password,
            balance: NEW_ACCOUNT_BALANCE,
            ..Account::default()
        },
    );
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}
