//! Dependency Cell
//!
//! A `Dep` is the smallest unit of change tracking: the set of effects that
//! read one observable slot. Reading the slot calls [`Dep::depend`], writing
//! it calls [`Dep::notify`].
//!
//! Subscribers are kept in an `IndexSet`, so notification order is the order
//! in which effects first subscribed, and subscribing twice is a no-op.

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;

use super::context::ReactiveContext;
use super::runtime::Runtime;
use super::SubscriberId;

/// Unique identifier for a dependency cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepId(u64);

impl DepId {
    /// Generate a new unique cell ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DepId {
    fn default() -> Self {
        Self::new()
    }
}

/// The subscriber set of one observable slot.
pub struct Dep {
    id: DepId,
    subscribers: RefCell<IndexSet<SubscriberId>>,
}

impl Dep {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            id: DepId::new(),
            subscribers: RefCell::new(IndexSet::new()),
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> DepId {
        self.id
    }

    /// Subscribe the active effect, if there is one.
    pub fn depend(&self) {
        let Some(subscriber_id) = ReactiveContext::current_subscriber() else {
            return;
        };

        ReactiveContext::track_dependency(self.id);
        if self.subscribers.borrow_mut().insert(subscriber_id) {
            tracing::trace!(dep = ?self.id, %subscriber_id, "subscribed");
        }
    }

    /// Run every subscribed effect, in subscription order, before returning.
    ///
    /// The subscriber list is snapshotted first: effects that run here may
    /// read (and so re-subscribe to) this same cell. A panicking effect
    /// aborts the rest of the pass. Disposed effects are pruned.
    pub fn notify(&self) {
        let subscribers: Vec<SubscriberId> = self.subscribers.borrow().iter().copied().collect();
        tracing::trace!(dep = ?self.id, count = subscribers.len(), "notify");

        for subscriber_id in subscribers {
            if !Runtime::run(subscriber_id) {
                self.subscribers.borrow_mut().shift_remove(&subscriber_id);
            }
        }
    }

    /// Current subscribers, in notification order.
    pub fn subscribers(&self) -> Vec<SubscriberId> {
        self.subscribers.borrow().iter().copied().collect()
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl Default for Dep {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.id)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
