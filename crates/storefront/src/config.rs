//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `QKART_API_URL` - Base URL of the backend API (default: `http://localhost:8082/api/v1`)
//! - `QKART_REQUEST_TIMEOUT_MS` - Per-request timeout (default: 4000)
//! - `QKART_SEARCH_DEBOUNCE_MS` - Quiet period before a search fires (default: 500)
//! - `QKART_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime, 0 disables (default: 300)
//! - `QKART_SESSION_FILE` - Where the session is persisted (default: `.qkart-session.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8082/api/v1";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 4000;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
const MAX_SEARCH_DEBOUNCE_MS: u64 = 5000;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_SESSION_FILE: &str = ".qkart-session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend API base URL, always ending in `/`
    pub api_url: Url,
    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
    /// Quiet period of the debounced search controller
    pub search_debounce: Duration,
    /// Catalog cache lifetime; `None` disables caching
    pub catalog_cache_ttl: Option<Duration>,
    /// Session persistence file
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed, or
    /// the API URL is not an absolute http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("QKART_API_URL", DEFAULT_API_URL))?;
        let request_timeout = Duration::from_millis(get_u64_or_default(
            "QKART_REQUEST_TIMEOUT_MS",
            DEFAULT_REQUEST_TIMEOUT_MS,
        )?);

        let debounce_ms =
            get_u64_or_default("QKART_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?;
        validate_debounce(debounce_ms)?;

        let ttl_secs = get_u64_or_default(
            "QKART_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            api_url,
            request_timeout,
            search_debounce: Duration::from_millis(debounce_ms),
            catalog_cache_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            session_file: PathBuf::from(get_env_or_default(
                "QKART_SESSION_FILE",
                DEFAULT_SESSION_FILE,
            )),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_url` with every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            catalog_cache_ttl: Some(Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS)),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a numeric environment variable with a default value.
fn get_u64_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse the API base URL.
///
/// A trailing slash is appended so that `Url::join` keeps the path prefix
/// (`/api/v1` + `cart` must give `/api/v1/cart`, not `/api/cart`).
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("QKART_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "QKART_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Validate the debounce window is usable for interactive search.
fn validate_debounce(ms: u64) -> Result<(), ConfigError> {
    if ms == 0 || ms > MAX_SEARCH_DEBOUNCE_MS {
        return Err(ConfigError::InvalidEnvVar(
            "QKART_SEARCH_DEBOUNCE_MS".to_string(),
            format!("must be between 1 and {MAX_SEARCH_DEBOUNCE_MS} (got {ms})"),
        ));
    }
    Ok(())
}
