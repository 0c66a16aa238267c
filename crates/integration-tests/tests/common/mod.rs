//! Shared setup for the end-to-end tests.

#![allow(dead_code)]

use qkart_integration_tests::FakeBackend;
use qkart_storefront::account::AccountService;
use qkart_storefront::api::StoreClient;
use qkart_storefront::{SessionContext, SessionStore, StoreConfig};
use secrecy::SecretString;
use tempfile::TempDir;

pub const USERNAME: &str = "criodo";
pub const PASSWORD: &str = "learnbydoing";

/// A running backend plus a client configured for it.
pub struct Harness {
    pub backend: FakeBackend,
    pub config: StoreConfig,
    pub client: StoreClient,
    pub sessions: SessionStore,
    _dir: TempDir,
}

impl Harness {
    /// Start a backend with one seeded user holding `balance`.
    pub async fn start(balance: i64) -> Self {
        let backend = FakeBackend::spawn().await.expect("Failed to start backend");
        backend.state().seed_user(USERNAME, PASSWORD, balance);

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = backend
            .config(&dir.path().join("session.json"))
            .expect("Failed to build config");
        let client = StoreClient::new(&config).expect("Failed to build client");

        Self {
            sessions: SessionStore::new(config.session_file.clone()),
            backend,
            config,
            client,
            _dir: dir,
        }
    }

    pub fn accounts(&self) -> AccountService<StoreClient> {
        AccountService::new(self.client.clone(), self.sessions.clone())
    }

    /// Log the seeded user in.
    pub async fn login(&self) -> SessionContext {
        self.accounts()
            .login(USERNAME, &secret(PASSWORD))
            .await
            .expect("Failed to log in")
    }
}

pub fn secret(s: &str) -> SecretString {
    SecretString::from(s)
}
