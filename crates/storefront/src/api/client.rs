//! `reqwest` implementation of [`StoreApi`].
//!
//! Caches the full catalog using `moka` (TTL from configuration).

use std::sync::Arc;

use moka::future::Cache;
use qkart_core::{Address, AddressId, CartEntry, CartEntryInput, Product};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::types::{
    AddAddressBody, CheckoutBody, CheckoutResponse, CredentialsBody, ErrorBody, LoginResponse,
};
use super::{ApiError, StoreApi};
use crate::config::StoreConfig;

const CATALOG_CACHE_KEY: &str = "catalog";

/// Longest slice of a response body written to the logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// StoreClient
// =============================================================================

/// Client for the QKart backend.
///
/// Cheaply cloneable; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog_cache: Option<Cache<&'static str, Vec<Product>>>,
}

impl StoreClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(config: &StoreConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let catalog_cache = config.catalog_cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(1)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(StoreClientInner {
                client,
                base_url: config.api_url.clone(),
                catalog_cache,
            }),
        })
    }

    /// The API base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop the cached catalog so the next [`StoreApi::products`] call
    /// goes to the server.
    pub async fn invalidate_catalog(&self) {
        if let Some(cache) = &self.inner.catalog_cache {
            cache.invalidate(CATALOG_CACHE_KEY).await;
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url, token: Option<&SecretString>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = ErrorBody::message_from(&response_text);
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %truncate(&response_text),
                    "Backend returned server error"
                );
            } else {
                debug!(status = %status, message = ?message, "Backend rejected request");
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn fetch_catalog(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, self.url("products")?, None);
        self.execute(request).await
    }
}

impl StoreApi for StoreClient {
    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let Some(cache) = &self.inner.catalog_cache else {
            return self.fetch_catalog().await;
        };

        if let Some(products) = cache.get(CATALOG_CACHE_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products = self.fetch_catalog().await?;
        cache.insert(CATALOG_CACHE_KEY, products.clone()).await;
        debug!(count = products.len(), "Catalog cached");

        Ok(products)
    }

    #[instrument(skip(self), fields(text = %text))]
    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.url("products/search")?;
        url.query_pairs_mut().append_pair("value", text);

        self.execute(self.request(Method::GET, url, None)).await
    }

    #[instrument(skip_all)]
    async fn cart(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        let request = self.request(Method::GET, self.url("cart")?, Some(token));
        self.execute(request).await
    }

    #[instrument(skip(self, token), fields(product_id = %entry.product_id, quantity = entry.quantity))]
    async fn submit_cart_entry(
        &self,
        token: &SecretString,
        entry: &CartEntryInput,
    ) -> Result<Vec<CartEntry>, ApiError> {
        let request = self
            .request(Method::POST, self.url("cart")?, Some(token))
            .json(entry);
        self.execute(request).await
    }

    #[instrument(skip_all)]
    async fn addresses(&self, token: &SecretString) -> Result<Vec<Address>, ApiError> {
        let request = self.request(Method::GET, self.url("user/addresses")?, Some(token));
        self.execute(request).await
    }

    #[instrument(skip_all)]
    async fn add_address(&self, token: &SecretString, text: &str) -> Result<Vec<Address>, ApiError> {
        let body = AddAddressBody {
            address: text.to_owned(),
        };
        let request = self
            .request(Method::POST, self.url("user/addresses")?, Some(token))
            .json(&body);
        self.execute(request).await
    }

    #[instrument(skip(self, token), fields(address_id = %id))]
    async fn delete_address(
        &self,
        token: &SecretString,
        id: &AddressId,
    ) -> Result<Vec<Address>, ApiError> {
        let mut url = self.url("user/addresses/")?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(id.as_str());

        self.execute(self.request(Method::DELETE, url, Some(token)))
            .await
    }

    #[instrument(skip(self, token), fields(address_id = %address_id))]
    async fn checkout(
        &self,
        token: &SecretString,
        address_id: &AddressId,
    ) -> Result<CheckoutResponse, ApiError> {
        let body = CheckoutBody {
            address_id: address_id.clone(),
        };
        let request = self
            .request(Method::POST, self.url("cart/checkout")?, Some(token))
            .json(&body);
        self.execute(request).await
    }

    #[instrument(skip(self, password), fields(username = %username))]
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = CredentialsBody {
            username: username.to_owned(),
            password: password.expose_secret().to_owned(),
        };
        let request = self
            .request(Method::POST, self.url("auth/login")?, None)
            .json(&body);
        self.execute(request).await
    }

    #[instrument(skip(self, password), fields(username = %username))]
    async fn register(&self, username: &str, password: &SecretString) -> Result<(), ApiError> {
        let body = CredentialsBody {
            username: username.to_owned(),
            password: password.expose_secret().to_owned(),
        };
        let request = self
            .request(Method::POST, self.url("auth/register")?, None)
            .json(&body);

        // Only the status matters; the success marker's shape varies.
        let _: serde_json::Value = self.execute(request).await?;
        Ok(())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
