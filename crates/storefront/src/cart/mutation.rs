//! Cart mutations.
//!
//! A mutation is planned locally against the current entries, submitted to
//! the server, and followed by a full re-fetch whose result replaces the
//! local cart. Nothing is applied optimistically.

use qkart_core::{CartEntry, CartEntryInput, Product, ProductId};
use tokio::sync::watch;
use tracing::{info, instrument};

use super::CartView;
use crate::api::StoreApi;
use crate::error::{StoreError, add_breadcrumb};
use crate::sequence::{Sequenced, Snapshot};
use crate::session::SessionContext;

/// Direction of a quantity adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increment,
    Decrement,
}

/// Where a mutation comes from, which decides the duplicate policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMode {
    /// Catalog "add to cart": only products not yet in the cart.
    AddNewOnly,
    /// Cart view +/- buttons.
    AdjustExisting(Step),
}

/// What will be sent to `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    Upsert(CartEntryInput),
    /// Carries the non-positive quantity the server reads as "delete".
    Remove(CartEntryInput),
}

impl CartAction {
    #[must_use]
    pub const fn input(&self) -> &CartEntryInput {
        match self {
            Self::Upsert(input) | Self::Remove(input) => input,
        }
    }
}

/// Decide the submission for a mutation without touching the network.
///
/// A product without an entry counts as quantity 0, so incrementing it
/// inserts and decrementing it submits a harmless removal.
///
/// # Errors
///
/// Returns [`StoreError::DuplicateItem`] for [`MutationMode::AddNewOnly`]
/// when the product already has an entry.
pub fn plan_mutation(
    product_id: &ProductId,
    entries: &[CartEntry],
    mode: MutationMode,
) -> Result<CartAction, StoreError> {
    let current = entries
        .iter()
        .find(|entry| &entry.product_id == product_id)
        .map(|entry| i64::from(entry.quantity));

    let quantity = match (mode, current) {
        (MutationMode::AddNewOnly, Some(_)) => {
            return Err(StoreError::DuplicateItem {
                product_id: product_id.to_string(),
            });
        }
        (MutationMode::AddNewOnly, None) => 1,
        (MutationMode::AdjustExisting(Step::Increment), current) => current.unwrap_or(0) + 1,
        (MutationMode::AdjustExisting(Step::Decrement), current) => current.unwrap_or(0) - 1,
    };

    let input = CartEntryInput {
        product_id: product_id.clone(),
        quantity,
    };
    Ok(if input.is_removal() {
        CartAction::Remove(input)
    } else {
        CartAction::Upsert(input)
    })
}

/// Owns the local copy of the server cart and applies mutations to it.
pub struct CartEngine<A> {
    api: A,
    entries: Sequenced<Vec<CartEntry>>,
}

impl<A: StoreApi> CartEngine<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            entries: Sequenced::new(Vec::new()),
        }
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Current server-confirmed entries.
    #[must_use]
    pub fn entries(&self) -> Vec<CartEntry> {
        self.entries.current()
    }

    /// Receive every cart snapshot accepted from the server.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Vec<CartEntry>>> {
        self.entries.subscribe()
    }

    /// Reconciled view of the current entries against `catalog`.
    #[must_use]
    pub fn view(&self, catalog: &[Product]) -> CartView {
        CartView::build(&self.entries(), catalog)
    }

    /// Fetch the cart from the server.
    ///
    /// An anonymous session has no cart; this returns without a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. Local state is left as is.
    #[instrument(skip_all)]
    pub async fn load(&self, session: &SessionContext) -> Result<Vec<CartEntry>, StoreError> {
        let Some(token) = session.token() else {
            return Ok(Vec::new());
        };

        let ticket = self.entries.ticket();
        let entries = self.api.cart(token).await?;
        self.entries.apply(ticket, entries);
        Ok(self.entries())
    }

    /// Add a product from the catalog with quantity 1.
    ///
    /// # Errors
    ///
    /// See [`Self::mutate`].
    pub async fn add_new(
        &self,
        session: &SessionContext,
        product_id: &ProductId,
    ) -> Result<Vec<CartEntry>, StoreError> {
        self.mutate(session, product_id, MutationMode::AddNewOnly)
            .await
    }

    /// Raise a product's quantity by one.
    ///
    /// # Errors
    ///
    /// See [`Self::mutate`].
    pub async fn increment(
        &self,
        session: &SessionContext,
        product_id: &ProductId,
    ) -> Result<Vec<CartEntry>, StoreError> {
        self.mutate(session, product_id, MutationMode::AdjustExisting(Step::Increment))
            .await
    }

    /// Lower a product's quantity by one, removing it at zero.
    ///
    /// # Errors
    ///
    /// See [`Self::mutate`].
    pub async fn decrement(
        &self,
        session: &SessionContext,
        product_id: &ProductId,
    ) -> Result<Vec<CartEntry>, StoreError> {
        self.mutate(session, product_id, MutationMode::AdjustExisting(Step::Decrement))
            .await
    }

    /// Plan, submit, then replace local state with a fresh `GET /cart`.
    ///
    /// Mutations are not serialized against each other. The ticket is taken
    /// when the re-fetch is sent, after the submit has resolved, so the
    /// snapshot of the most recently issued `GET /cart` wins no matter in
    /// which order the submits complete.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AuthRequired`] without a session (no request made)
    /// - [`StoreError::DuplicateItem`] per [`plan_mutation`] (no request made)
    /// - transport or server errors from either round trip; local state is
    ///   unchanged in that case
    #[instrument(skip(self, session), fields(product_id = %product_id, mode = ?mode))]
    pub async fn mutate(
        &self,
        session: &SessionContext,
        product_id: &ProductId,
        mode: MutationMode,
    ) -> Result<Vec<CartEntry>, StoreError> {
        let token = session.require_token()?;
        let action = plan_mutation(product_id, &self.entries(), mode)?;

        let quantity = action.input().quantity.to_string();
        add_breadcrumb(
            "cart",
            match action {
                CartAction::Upsert(_) => "Submitted cart entry",
                CartAction::Remove(_) => "Removed cart entry",
            },
            Some(&[("product_id", product_id.as_str()), ("quantity", quantity.as_str())]),
        );

        self.api.submit_cart_entry(token, action.input()).await?;

        let ticket = self.entries.ticket();
        let refreshed = self.api.cart(token).await?;

        if self.entries.apply(ticket, refreshed) {
            info!(ticket = ticket.get(), "Cart updated from server");
        }
        Ok(self.entries())
    }
}
