//! Delivery of notices from background work to the front-end.
//!
//! Operations the user awaits return their error directly. Work that runs
//! on its own, like a debounced search firing after the user stopped
//! typing, reports through a [`Notifier`] instead.

use tokio::sync::mpsc;

use crate::error::{Notice, StoreError};

/// Sending half of the notice queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    /// Create a notifier and the receiver the front-end drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn notify(&self, notice: Notice) {
        // A closed receiver means the front-end is gone; nothing to show.
        let _ = self.tx.send(notice);
    }

    /// Log `err` and queue its notice.
    pub fn report(&self, err: &StoreError) {
        self.notify(err.report());
    }
}
