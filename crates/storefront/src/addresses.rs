//! Shipping addresses: the server-held list, the local selection, and the
//! "add new address" input buffer.
//!
//! Every change goes to the server first and the returned list replaces the
//! local one; nothing is applied speculatively.

use qkart_core::{Address, AddressId};
use tracing::{info, instrument};

use crate::api::StoreApi;
use crate::error::{StoreError, add_breadcrumb};
use crate::session::SessionContext;

/// The address list plus the one picked for checkout.
///
/// `selected` always names an element of `all` or is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSelection {
    all: Vec<Address>,
    selected: Option<AddressId>,
}

impl AddressSelection {
    #[must_use]
    pub fn new(all: Vec<Address>) -> Self {
        Self {
            all,
            selected: None,
        }
    }

    /// Addresses in server order.
    #[must_use]
    pub fn all(&self) -> &[Address] {
        &self.all
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&AddressId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn selected_address(&self) -> Option<&Address> {
        let id = self.selected.as_ref()?;
        self.all.iter().find(|a| &a.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Select `id` if it is in the list. Returns whether it was.
    pub fn select(&mut self, id: &AddressId) -> bool {
        if self.all.iter().any(|a| &a.id == id) {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    /// Replace the list with a server snapshot, dropping a selection that
    /// no longer exists.
    pub fn replace(&mut self, all: Vec<Address>) {
        self.all = all;
        if let Some(id) = &self.selected
            && !self.all.iter().any(|a| &a.id == id)
        {
            self.selected = None;
        }
    }
}

/// Text typed into the "add new address" box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftAddress {
    pub is_editing: bool,
    pub text: String,
}

impl DraftAddress {
    /// Open the input box.
    pub fn begin(&mut self) {
        self.is_editing = true;
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.is_editing = true;
        self.text = text.into();
    }

    /// Close the box and discard the text.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Close the box, handing back what was typed.
    pub fn take(&mut self) -> String {
        std::mem::take(self).text
    }
}

/// Address CRUD against the backend.
pub struct AddressBook<A> {
    api: A,
    selection: AddressSelection,
    draft: DraftAddress,
}

impl<A: StoreApi> AddressBook<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            selection: AddressSelection::default(),
            draft: DraftAddress::default(),
        }
    }

    #[must_use]
    pub const fn selection(&self) -> &AddressSelection {
        &self.selection
    }

    #[must_use]
    pub const fn draft(&self) -> &DraftAddress {
        &self.draft
    }

    /// Fetch the address list.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] without a session, or the request error.
    #[instrument(skip_all)]
    pub async fn load(&mut self, session: &SessionContext) -> Result<&[Address], StoreError> {
        let token = session.require_token()?;
        let all = self.api.addresses(token).await?;
        self.selection.replace(all);
        Ok(self.selection.all())
    }

    /// Add an address and clear the draft.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidInput`] for blank text and
    /// [`StoreError::AuthRequired`] without a session, both without a
    /// request; otherwise the request error, with the list unchanged.
    #[instrument(skip(self, session, text))]
    pub async fn add(
        &mut self,
        session: &SessionContext,
        text: &str,
    ) -> Result<&[Address], StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::InvalidInput("Address cannot be empty".to_string()));
        }
        let token = session.require_token()?;

        add_breadcrumb("address", "Added address", None);
        let all = self.api.add_address(token, text).await?;
        info!(count = all.len(), "Address added");
        self.selection.replace(all);
        self.draft.cancel();
        Ok(self.selection.all())
    }

    /// Delete an address, clearing the selection if it pointed there.
    ///
    /// # Errors
    ///
    /// [`StoreError::AuthRequired`] without a session, or the request error
    /// with the list and selection unchanged.
    #[instrument(skip(self, session), fields(address_id = %id))]
    pub async fn remove(
        &mut self,
        session: &SessionContext,
        id: &AddressId,
    ) -> Result<&[Address], StoreError> {
        let token = session.require_token()?;

        add_breadcrumb("address", "Deleted address", Some(&[("address_id", id.as_str())]));
        let all = self.api.delete_address(token, id).await?;
        info!(count = all.len(), "Address deleted");
        self.selection.replace(all);
        if self.selection.selected() == Some(id) {
            self.selection.selected = None;
        }
        Ok(self.selection.all())
    }

    /// Select an address for checkout; ignored if `id` is not listed.
    pub fn select(&mut self, id: &AddressId) -> bool {
        self.selection.select(id)
    }

    pub fn edit_draft(&mut self, text: impl Into<String>) {
        self.draft.edit(text);
    }

    /// Submit the draft as a new address. The draft is cleared either way.
    ///
    /// # Errors
    ///
    /// See [`Self::add`].
    pub async fn submit_draft(
        &mut self,
        session: &SessionContext,
    ) -> Result<&[Address], StoreError> {
        let text = self.draft.take();
        self.add(session, &text).await
    }
}
