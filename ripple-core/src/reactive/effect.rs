//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever a
//! dependency cell it read is notified.
//!
//! # How Effects Work
//!
//! 1. When created, the effect is registered with the [`Runtime`] and runs
//!    once inside a tracking scope. Every cell it reads subscribes it.
//!
//! 2. When one of those cells is written, the cell notifies the effect and
//!    it re-runs synchronously, before the write returns.
//!
//! 3. Re-runs happen in an untracked scope. Subscriptions come from the
//!    first run only, and are never cleared: an effect that read nothing on
//!    its first run is never notified.
//!
//! # Re-entrancy
//!
//! An effect that is notified while it is still running (for example, it
//! writes a property it also reads) runs again, nested inside the current
//! run. A write that eventually stops re-triggering settles; one that never
//! stops panics once the nesting passes [`MAX_REENTRANT_DEPTH`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::context::ReactiveContext;
use super::dep::DepId;
use super::runtime::Runtime;
use super::subscriber::SubscriberId;

/// How deeply one effect may re-enter itself before it is treated as a
/// runaway cycle.
pub const MAX_REENTRANT_DEPTH: usize = 100;

/// Run `effect` now, tracking its reads, and keep it subscribed.
///
/// The returned handle can be ignored; the effect stays alive until
/// [`Effect::dispose`] is called.
///
/// ```rust
/// use ripple_core::reactive::{reactive, watch_effect};
/// use serde_json::json;
///
/// let info = reactive(json!({ "height": 100 }).as_object().cloned().unwrap());
/// let reader = info.clone();
/// let effect = watch_effect(move || {
///     let _ = reader.get("height");
/// });
///
/// info.set("height", 120);
/// assert_eq!(effect.run_count(), 2);
/// ```
pub fn watch_effect<F>(effect: F) -> Effect
where
    F: Fn() + 'static,
{
    Effect::new(effect)
}

struct EffectInner {
    id: SubscriberId,
    run: Box<dyn Fn()>,
    /// Cells this effect has subscribed to.
    dependencies: RefCell<Vec<DepId>>,
    disposed: Cell<bool>,
    /// Number of runs currently on the stack.
    depth: Cell<usize>,
    run_count: Cell<usize>,
}

/// A side-effecting computation that runs when dependencies change.
///
/// Clones share state: they are handles to the same effect.
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

/// Leaves one nesting level even if the effect panics.
struct RunningGuard<'a>(&'a Cell<usize>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl Effect {
    /// Create and register a new effect, then run it once with tracking.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let effect = Self::new_lazy(run);
        effect.execute();
        effect
    }

    /// Create and register a new effect without running it.
    ///
    /// The effect has no subscriptions until [`Effect::execute`] is called.
    pub fn new_lazy<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let effect = Self {
            inner: Rc::new(EffectInner {
                id: SubscriberId::new(),
                run: Box::new(run),
                dependencies: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
                depth: Cell::new(0),
                run_count: Cell::new(0),
            }),
        };
        Runtime::register(effect.clone());
        effect
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Run the effect inside a tracking scope, subscribing it to every cell
    /// it reads.
    pub fn execute(&self) {
        let Some(_running) = self.begin() else {
            return;
        };

        let _ctx = ReactiveContext::enter(self.inner.id);
        (self.inner.run)();

        let mut dependencies = self.inner.dependencies.borrow_mut();
        for dep_id in ReactiveContext::get_dependencies() {
            if !dependencies.contains(&dep_id) {
                dependencies.push(dep_id);
            }
        }
    }

    /// Re-run the effect without tracking.
    ///
    /// Called by dependency cells on notification.
    pub fn schedule(&self) {
        let Some(_running) = self.begin() else {
            return;
        };

        let _ctx = ReactiveContext::untracked();
        (self.inner.run)();
    }

    fn begin(&self) -> Option<RunningGuard<'_>> {
        let inner = &self.inner;
        if inner.disposed.get() {
            return None;
        }
        let depth = inner.depth.get();
        if depth >= MAX_REENTRANT_DEPTH {
            panic!(
                "{} re-entered itself {depth} times; a write inside the effect keeps re-triggering it",
                inner.id
            );
        }
        if depth > 0 {
            tracing::trace!(id = %inner.id, depth, "effect re-entered");
        }
        inner.depth.set(depth + 1);
        inner.run_count.set(inner.run_count.get() + 1);
        Some(RunningGuard(&inner.depth))
    }

    /// Dispose of the effect.
    ///
    /// After disposal, the effect will not run again and is dropped from the
    /// runtime.
    pub fn dispose(&self) {
        if !self.inner.disposed.replace(true) {
            Runtime::unregister(self.inner.id);
            tracing::trace!(id = %self.inner.id, "effect disposed");
        }
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Check if the effect is running right now.
    pub fn is_running(&self) -> bool {
        self.inner.depth.get() > 0
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }

    /// Get the number of cells the effect is subscribed to.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.borrow().len()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
