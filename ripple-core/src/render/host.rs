//! The host display tree.
//!
//! The renderer never touches a live tree directly. Everything it needs is
//! expressed by the [`Host`] trait: a browser DOM binding, a native widget
//! tree, or the in-memory [`Document`](super::Document) can all sit behind it.
//!
//! Methods take `&self`. A host shares its tree with event handlers, and a
//! handler may trigger a re-render that calls back into the same host, so
//! implementations use interior mutability and never hold a borrow across
//! a call into user code.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::HostError;
use super::props::Handler;

/// Handle to a live node owned by a [`Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a raw host index.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw host index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Capabilities the renderer requires from a live display tree.
pub trait Host {
    /// Create a detached element with the given tag name.
    fn create_element(&self, tag: &str) -> Result<NodeId, HostError>;

    /// Set (or overwrite) a string attribute.
    fn set_attribute(&self, node: NodeId, key: &str, value: &str) -> Result<(), HostError>;

    /// Remove an attribute. Removing an absent attribute is not an error.
    fn remove_attribute(&self, node: NodeId, key: &str) -> Result<(), HostError>;

    /// Register `handler` for events named `event`.
    fn add_event_listener(&self, node: NodeId, event: &str, handler: &Handler)
        -> Result<(), HostError>;

    /// Unregister a handler previously added for `event`. Handlers are
    /// matched by identity.
    fn remove_event_listener(
        &self,
        node: NodeId,
        event: &str,
        handler: &Handler,
    ) -> Result<(), HostError>;

    /// Replace all children of `node` with a single text run.
    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), HostError>;

    /// Append `child` as the last child of `parent`, detaching it first.
    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// Insert `child` into `parent` just before `reference`.
    fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId)
        -> Result<(), HostError>;

    /// Detach `child` from `parent`.
    fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// The parent of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Find the first node matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, HostError>;
}
