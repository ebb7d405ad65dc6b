//! Dependency Registry
//!
//! Maps each observed owner and property key to its dependency cell:
//! owner → (key → [`Dep`]). Cells are created lazily on first lookup and
//! then returned unchanged for the same pair.
//!
//! Owners are referenced by [`ObjectId`] only, so the registry never keeps
//! an owner alive. Owners call [`release`] when they are dropped, which
//! discards their cells.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::dep::Dep;

/// Identity of an observed owner (a reactive object or tracked value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Generate a new unique owner ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

thread_local! {
    static TARGETS: RefCell<HashMap<ObjectId, HashMap<String, Rc<Dep>>>> = RefCell::new(HashMap::new());
}

/// Get the cell for `(owner, key)`, creating it if needed.
pub fn get_dependency(owner: ObjectId, key: &str) -> Rc<Dep> {
    TARGETS.with(|targets| {
        let mut targets = targets.borrow_mut();
        let deps = targets.entry(owner).or_default();
        if let Some(dep) = deps.get(key) {
            return Rc::clone(dep);
        }

        let dep = Rc::new(Dep::new());
        tracing::trace!(%owner, key, dep = ?dep.id(), "dependency created");
        deps.insert(key.to_owned(), Rc::clone(&dep));
        dep
    })
}

/// Drop every cell registered for `owner`.
pub fn release(owner: ObjectId) {
    // Owners may be dropped during thread teardown, after the map is gone.
    let _ = TARGETS.try_with(|targets| {
        targets.borrow_mut().remove(&owner);
    });
}

/// Number of cells registered for `owner`.
pub fn dependency_count(owner: ObjectId) -> usize {
    TARGETS.with(|targets| targets.borrow().get(&owner).map_or(0, HashMap::len))
}
