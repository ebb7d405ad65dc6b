//! Reactive Context
//!
//! The reactive context tracks which effect is currently running, so that a
//! dependency cell read during that run can subscribe the effect.
//!
//! # Implementation
//!
//! We use a thread-local stack of tracking scopes. Running an effect pushes
//! a scope for it; the drop guard pops the scope when the run finishes, even
//! if the effect panics. The top of the stack is the active effect.
//!
//! A scope may also be *untracked*. Reads inside an untracked scope register
//! nothing, even when an outer effect scope sits below it on the stack. Effect
//! re-runs triggered by a notification use an untracked scope, so only the
//! first run of an effect establishes its subscriptions.

use std::cell::RefCell;

use super::dep::DepId;
use super::SubscriberId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the reactive context stack.
#[derive(Debug, Clone)]
struct ContextEntry {
    /// The effect being tracked, or `None` for an untracked scope.
    subscriber_id: Option<SubscriberId>,
    /// Cells read during this scope, in first-read order.
    dependencies: Vec<DepId>,
}

/// Guard that pops its scope when dropped.
pub struct ReactiveContext {
    subscriber_id: Option<SubscriberId>,
}

impl ReactiveContext {
    /// Enter a tracking scope for the given effect.
    ///
    /// While this scope is on top of the stack, every dependency cell that is
    /// read subscribes `subscriber_id`.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        Self::push(Some(subscriber_id))
    }

    /// Enter a scope in which reads are not tracked.
    pub fn untracked() -> Self {
        Self::push(None)
    }

    fn push(subscriber_id: Option<SubscriberId>) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry {
                subscriber_id,
                dependencies: Vec::new(),
            });
        });

        Self { subscriber_id }
    }

    /// Check if reads are currently being tracked.
    pub fn is_active() -> bool {
        Self::current_subscriber().is_some()
    }

    /// Get the active effect, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(|entry| entry.subscriber_id))
    }

    /// Number of scopes currently on the stack.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }

    /// Record a read of the given cell in the active scope.
    ///
    /// Untracked scopes ignore the read. A cell read twice is recorded once.
    pub fn track_dependency(dep_id: DepId) {
        CONTEXT_STACK.with(|stack| {
            if let Some(entry) = stack.borrow_mut().last_mut() {
                if entry.subscriber_id.is_some() && !entry.dependencies.contains(&dep_id) {
                    entry.dependencies.push(dep_id);
                }
            }
        });
    }

    /// Get the cells read so far in the active scope.
    pub fn get_dependencies() -> Vec<DepId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| entry.dependencies.clone())
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        // `try_with`: the guard may outlive the stack during thread teardown.
        let _ = CONTEXT_STACK.try_with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.subscriber_id, self.subscriber_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber_id, entry.subscriber_id
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_tracks_subscriber() {
        let id = SubscriberId::new();

        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());

        {
            let _ctx = ReactiveContext::enter(id);

            assert!(ReactiveContext::is_active());
            assert_eq!(ReactiveContext::current_subscriber(), Some(id));
        }

        assert!(!ReactiveContext::is_active());
        assert_eq!(ReactiveContext::depth(), 0);
    }

    #[test]
    fn context_tracks_dependencies_once() {
        let id = SubscriberId::new();
        let _ctx = ReactiveContext::enter(id);

        let (a, b) = (DepId::new(), DepId::new());
        ReactiveContext::track_dependency(a);
        ReactiveContext::track_dependency(b);
        ReactiveContext::track_dependency(a);

        assert_eq!(ReactiveContext::get_dependencies(), vec![a, b]);
    }

    #[test]
    fn nested_contexts_restore_outer() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();

        {
            let _ctx1 = ReactiveContext::enter(id1);
            {
                let _ctx2 = ReactiveContext::enter(id2);
                assert_eq!(ReactiveContext::current_subscriber(), Some(id2));
            }
            assert_eq!(ReactiveContext::current_subscriber(), Some(id1));
        }

        assert!(ReactiveContext::current_subscriber().is_none());
    }

    #[test]
    fn untracked_scope_hides_outer_effect() {
        let outer = SubscriberId::new();
        let _ctx = ReactiveContext::enter(outer);

        {
            let _quiet = ReactiveContext::untracked();
            assert!(!ReactiveContext::is_active());
            ReactiveContext::track_dependency(DepId::new());
            assert!(ReactiveContext::get_dependencies().is_empty());
        }

        assert_eq!(ReactiveContext::current_subscriber(), Some(outer));
    }
}
