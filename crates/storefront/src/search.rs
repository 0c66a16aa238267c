//! Debounced catalog search.
//!
//! Each keystroke schedules a search after a quiet period; a newer keystroke
//! supersedes every pending one, so a burst of typing costs one request.
//! Only keystrokes supersede each other: a catalog load never cancels a
//! pending search.
//!
//! Requests already sent are never aborted. Each takes a ticket as it goes
//! out and its response goes through a version check, so a slow response
//! for old text cannot overwrite results for newer text.

use std::sync::Arc;
use std::time::Duration;

use qkart_core::Product;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::api::StoreApi;
use crate::error::StoreError;
use crate::notify::Notifier;
use crate::sequence::{Sequenced, Snapshot, Ticket};

/// What the product grid shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogState {
    pub products: Vec<Product>,
    /// The last search matched nothing.
    pub not_found: bool,
}

/// Turns search input into rate-limited catalog queries.
///
/// Cheaply cloneable; clones share the pending search and the displayed state.
pub struct SearchController<A> {
    inner: Arc<SearchInner<A>>,
}

impl<A> Clone for SearchController<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SearchInner<A> {
    api: A,
    quiet_period: Duration,
    /// Last typed text; its ticket decides which pending search fires.
    input: Sequenced<String>,
    state: Sequenced<CatalogState>,
    notifier: Notifier,
}

impl<A: StoreApi + 'static> SearchController<A> {
    #[must_use]
    pub fn new(api: A, quiet_period: Duration, notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(SearchInner {
                api,
                quiet_period,
                input: Sequenced::new(String::new()),
                state: Sequenced::new(CatalogState::default()),
                notifier,
            }),
        }
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// What is currently displayed.
    #[must_use]
    pub fn state(&self) -> CatalogState {
        self.inner.state.current()
    }

    /// Receive every displayed-state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<CatalogState>> {
        self.inner.state.subscribe()
    }

    /// Fetch and display the full catalog right away.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the displayed catalog is kept.
    pub async fn load_catalog(&self) -> Result<Vec<Product>, StoreError> {
        let ticket = self.inner.state.ticket();
        let products = self.inner.api.products().await?;
        self.inner.state.apply(
            ticket,
            CatalogState {
                products: products.clone(),
                not_found: false,
            },
        );
        Ok(products)
    }

    /// Schedule a search for `text` after the quiet period.
    ///
    /// Any search scheduled earlier that has not fired yet will not fire.
    /// The returned handle completes once this input has either been
    /// superseded or its search has resolved.
    pub fn on_input(&self, text: impl Into<String>) -> JoinHandle<()> {
        let text = text.into();
        let keystroke = self.inner.input.ticket();
        self.inner.input.apply(keystroke, text.clone());
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tokio::time::sleep(inner.quiet_period).await;
            if !inner.input.is_latest(keystroke) {
                debug!(keystroke = keystroke.get(), "Search superseded before firing");
                return;
            }
            let ticket = inner.state.ticket();
            inner.run(ticket, &text).await;
        })
    }
}

impl<A: StoreApi> SearchInner<A> {
    #[instrument(skip(self), fields(ticket = ticket.get()))]
    async fn run(&self, ticket: Ticket, text: &str) {
        let text = text.trim();

        // Clearing the box brings the whole catalog back.
        let result = if text.is_empty() {
            self.api.products().await
        } else {
            self.api.search_products(text).await
        };

        match result {
            Ok(products) => {
                debug!(count = products.len(), "Search resolved");
                self.state.apply(
                    ticket,
                    CatalogState {
                        products,
                        not_found: false,
                    },
                );
            }
            Err(e) if e.is_not_found() && !text.is_empty() => {
                debug!("Search matched nothing");
                self.state.apply(
                    ticket,
                    CatalogState {
                        products: Vec::new(),
                        not_found: true,
                    },
                );
            }
            Err(e) => self.notifier.report(&StoreError::from(e)),
        }
    }
}
