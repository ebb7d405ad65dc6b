//! Tracked Values
//!
//! A `Tracked<T>` is a single typed reactive value: the value plus its
//! dependency cell. It is the statically typed counterpart of one
//! [`ReactiveObject`](super::ReactiveObject) property.
//!
//! ```rust
//! use ripple_core::reactive::{watch_effect, Tracked};
//!
//! let count = Tracked::new(0);
//! let reader = count.clone();
//! let effect = watch_effect(move || {
//!     let _ = reader.get();
//! });
//!
//! count.set(5);
//! assert_eq!(count.get(), 5);
//! assert_eq!(effect.run_count(), 2);
//! ```

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use super::dep::Dep;
use super::registry::{self, ObjectId};

const VALUE_KEY: &str = "value";

struct TrackedInner<T> {
    owner: ObjectId,
    value: RefCell<T>,
    dep: Rc<Dep>,
}

impl<T> Drop for TrackedInner<T> {
    fn drop(&mut self) {
        registry::release(self.owner);
    }
}

/// A typed reactive value.
///
/// Clones share the same value and cell.
pub struct Tracked<T: 'static> {
    inner: Rc<TrackedInner<T>>,
}

impl<T: 'static> Tracked<T> {
    /// Create a new tracked value.
    pub fn new(value: T) -> Self {
        let owner = ObjectId::new();
        Self {
            inner: Rc::new(TrackedInner {
                owner,
                value: RefCell::new(value),
                dep: registry::get_dependency(owner, VALUE_KEY),
            }),
        }
    }

    /// Borrow the value, subscribing the active effect.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.dep.depend();
        f(&self.inner.value.borrow())
    }

    /// Borrow the value without subscribing anything.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Set a new value and re-run every subscribed effect.
    pub fn set(&self, value: T) {
        self.inner.value.replace(value);
        self.inner.dep.notify();
    }

    /// Replace the value with one computed from the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = self.with_untracked(f);
        self.set(next);
    }

    /// Get the number of effects subscribed to this value.
    pub fn subscriber_count(&self) -> usize {
        self.inner.dep.subscriber_count()
    }
}

impl<T: Clone + 'static> Tracked<T> {
    /// Get the current value, subscribing the active effect.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value without tracking.
    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: 'static> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Debug + 'static> Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("owner", &self.inner.owner)
            .field("value", &*self.inner.value.borrow())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::watch_effect;
    use std::cell::Cell;

    #[test]
    fn tracked_get_and_set() {
        let value = Tracked::new(0);
        assert_eq!(value.get(), 0);

        value.set(42);
        assert_eq!(value.get(), 42);
    }

    #[test]
    fn tracked_update() {
        let value = Tracked::new(10);
        value.update(|v| v + 5);
        assert_eq!(value.get(), 15);
    }

    #[test]
    fn tracked_notifies_effects() {
        let value = Tracked::new(String::from("a"));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let (reader, seen_c) = (value.clone(), seen.clone());
        watch_effect(move || seen_c.borrow_mut().push(reader.get()));

        value.set("b".into());
        value.update(|v| format!("{v}c"));

        assert_eq!(*seen.borrow(), vec!["a", "b", "bc"]);
        assert_eq!(value.subscriber_count(), 1);
    }

    #[test]
    fn untracked_reads_do_not_subscribe() {
        let value = Tracked::new(1);
        let runs = Rc::new(Cell::new(0));

        let (reader, runs_c) = (value.clone(), runs.clone());
        watch_effect(move || {
            let _ = reader.get_untracked();
            runs_c.set(runs_c.get() + 1);
        });

        value.set(2);
        assert_eq!(runs.get(), 1);
        assert_eq!(value.subscriber_count(), 0);
    }

    #[test]
    fn clones_share_state() {
        let first = Tracked::new(0);
        let second = first.clone();

        first.set(42);
        assert_eq!(second.get(), 42);
    }
}
