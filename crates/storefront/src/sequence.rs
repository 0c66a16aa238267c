//! Versioned state that refuses stale writes.
//!
//! Several requests that replace the same piece of state (the cart, the
//! displayed catalog) can be in flight at once, and their responses may
//! arrive in any order. Each request takes a [`Ticket`] before it is issued;
//! a response is applied only if its ticket is newer than the one that
//! produced the current value.
//!
//! Observers subscribe through a `tokio::sync::watch` channel and see every
//! accepted snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Position of a request in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A value together with the ticket that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    /// 0 for the initial value.
    pub version: u64,
    pub value: T,
}

/// State guarded by a monotonic version check.
#[derive(Debug)]
pub struct Sequenced<T> {
    state: watch::Sender<Snapshot<T>>,
    issued: AtomicU64,
}

impl<T> Sequenced<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (state, _) = watch::channel(Snapshot {
            version: 0,
            value: initial,
        });
        Self {
            state,
            issued: AtomicU64::new(0),
        }
    }

    /// Take the next ticket. Call before issuing the request.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no ticket has been handed out after `ticket`.
    #[must_use]
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Replace the value if `ticket` is newer than the current version.
    ///
    /// Returns `false` when the write was stale and dropped.
    pub fn apply(&self, ticket: Ticket, value: T) -> bool {
        let applied = self.state.send_if_modified(|current| {
            if ticket.0 <= current.version {
                return false;
            }
            current.version = ticket.0;
            current.value = value;
            true
        });

        if !applied {
            tracing::debug!(ticket = ticket.0, "Discarded stale response");
        }
        applied
    }

    /// Receive every accepted snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.state.subscribe()
    }

    /// Version of the current value.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }
}

impl<T: Clone> Sequenced<T> {
    /// Clone of the current value.
    #[must_use]
    pub fn current(&self) -> T {
        self.state.borrow().value.clone()
    }
}
