//! Error types for the renderer and its host.

use thiserror::Error;

use super::host::NodeId;

/// Errors reported by a [`Host`](super::Host) display tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The handle does not name a node in this tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// A child operation named a node that is not a child of `parent`.
    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Element names must be non-empty and free of whitespace and markup.
    #[error("invalid tag name {0:?}")]
    InvalidTag(String),

    /// Text nodes cannot hold attributes, listeners or children.
    #[error("{0} is a text node")]
    TextNode(NodeId),

    /// The selector syntax is not understood by this host.
    #[error("unsupported selector {0:?}")]
    UnsupportedSelector(String),
}

/// Errors raised by `mount` and `patch`.
///
/// Everything except `Host` is a caller contract violation: the renderer
/// fails fast instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The host rejected an operation.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// `patch` was given an old vnode that was never mounted.
    #[error("<{tag}> has no live node; patch requires a mounted vnode")]
    NotMounted { tag: String },

    /// `mount` was given a vnode that already owns a live node.
    #[error("<{tag}> is already mounted")]
    AlreadyMounted { tag: String },

    /// The live node to replace has no parent to mount into.
    #[error("<{tag}> is detached from the tree")]
    Detached { tag: String },

    /// A prop value does not fit its key.
    #[error("invalid prop {key:?} on <{tag}>: {reason}")]
    InvalidProp {
        tag: String,
        key: String,
        reason: &'static str,
    },

    /// No container matched the mount selector.
    #[error("no container matches {0:?}")]
    ContainerNotFound(String),
}
