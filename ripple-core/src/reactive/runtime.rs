//! Reactive Runtime
//!
//! The runtime owns every live effect. Dependency cells only store
//! [`SubscriberId`]s; when a cell is notified it asks the runtime to run each
//! ID. This keeps effect closures out of the cells, and lets `dispose` stop
//! an effect without visiting every cell it subscribed to.
//!
//! # How It Works
//!
//! 1. `watch_effect` registers the effect here, then runs it once while
//!    tracking reads.
//!
//! 2. A cell notified by a write calls [`Runtime::run`] for each subscriber.
//!
//! 3. A disposed effect is unregistered; cells that still name it prune the
//!    ID the next time they notify.
//!
//! # Thread Confinement
//!
//! The registry is thread-local and effects are `!Send`, so all reactivity
//! for a tree happens on the thread that created it.

use std::cell::RefCell;

use indexmap::IndexMap;

use super::effect::Effect;
use super::subscriber::SubscriberId;

thread_local! {
    static EFFECTS: RefCell<IndexMap<SubscriberId, Effect>> = RefCell::new(IndexMap::new());
}

/// The per-thread reactive runtime.
pub struct Runtime;

impl Runtime {
    /// Register an effect so that cells can reach it by ID.
    pub fn register(effect: Effect) {
        let id = effect.id();
        EFFECTS.with(|effects| {
            effects.borrow_mut().insert(id, effect);
        });
        tracing::trace!(%id, "effect registered");
    }

    /// Unregister an effect. Returns whether it was registered.
    pub fn unregister(id: SubscriberId) -> bool {
        let removed = EFFECTS
            .try_with(|effects| effects.borrow_mut().shift_remove(&id))
            .ok()
            .flatten();
        removed.is_some()
    }

    /// Re-run the effect with the given ID.
    ///
    /// Returns `false` if no such effect is registered. The registry borrow
    /// is released before the effect runs, since effects may register or
    /// dispose other effects.
    pub fn run(id: SubscriberId) -> bool {
        let effect = EFFECTS.with(|effects| effects.borrow().get(&id).cloned());

        match effect {
            Some(effect) => {
                effect.schedule();
                true
            }
            None => false,
        }
    }

    /// Check whether an effect is registered.
    pub fn is_registered(id: SubscriberId) -> bool {
        EFFECTS.with(|effects| effects.borrow().contains_key(&id))
    }

    /// Number of live effects on this thread.
    pub fn effect_count() -> usize {
        EFFECTS.with(|effects| effects.borrow().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn runtime_registers_and_unregisters() {
        let effect = Effect::new_lazy(|| {});
        let id = effect.id();

        assert!(Runtime::is_registered(id));
        assert!(Runtime::unregister(id));
        assert!(!Runtime::is_registered(id));
        assert!(!Runtime::unregister(id));
    }

    #[test]
    fn runtime_runs_registered_effects() {
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let effect = Effect::new_lazy(move || runs_clone.set(runs_clone.get() + 1));

        assert!(Runtime::run(effect.id()));
        assert!(Runtime::run(effect.id()));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn runtime_ignores_unknown_ids() {
        assert!(!Runtime::run(SubscriberId::new()));
    }
}
