//! Virtual nodes.
//!
//! A [`VNode`] describes one element: its tag, its props, and its children.
//! Once mounted it also records the live node it produced. That handle is
//! written by `mount` only and carried forward by `patch`; it is never part
//! of a vnode's identity, so clones and comparisons ignore it.

use std::fmt;

use super::host::NodeId;
use super::props::Props;

/// Children of a virtual node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Children {
    /// No children.
    #[default]
    Empty,
    /// A single run of text content.
    Text(String),
    /// Element children, in order.
    Nodes(Vec<VNode>),
}

impl Children {
    pub fn is_empty(&self) -> bool {
        match self {
            Children::Empty => true,
            Children::Text(text) => text.is_empty(),
            Children::Nodes(nodes) => nodes.is_empty(),
        }
    }

    /// Element children, or an empty slice for text and `Empty`.
    pub fn nodes(&self) -> &[VNode] {
        match self {
            Children::Nodes(nodes) => nodes,
            _ => &[],
        }
    }
}

impl From<&str> for Children {
    fn from(text: &str) -> Self {
        Children::Text(text.to_owned())
    }
}

impl From<String> for Children {
    fn from(text: String) -> Self {
        Children::Text(text)
    }
}

impl From<Vec<VNode>> for Children {
    fn from(nodes: Vec<VNode>) -> Self {
        Children::Nodes(nodes)
    }
}

/// Description of one element in the tree.
pub struct VNode {
    pub(crate) tag: String,
    pub(crate) props: Option<Props>,
    pub(crate) children: Children,
    /// Live node produced by `mount`.
    pub(crate) el: Option<NodeId>,
}

/// Create a virtual node.
///
/// No validation happens here; prop keys and values are interpreted when
/// the node is mounted.
///
/// ```rust
/// use ripple_core::{h, props};
///
/// let node = h("div", props! { "id" => "a" }, "hi");
/// assert_eq!(node.tag(), "div");
/// assert!(node.el().is_none());
/// ```
pub fn h(
    tag: impl Into<String>,
    props: impl Into<Option<Props>>,
    children: impl Into<Children>,
) -> VNode {
    VNode {
        tag: tag.into(),
        props: props.into(),
        children: children.into(),
        el: None,
    }
}

impl VNode {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn props(&self) -> Option<&Props> {
        self.props.as_ref()
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// The live node this vnode owns, once mounted.
    pub fn el(&self) -> Option<NodeId> {
        self.el
    }

    pub fn is_mounted(&self) -> bool {
        self.el.is_some()
    }
}

/// Cloning produces an unmounted copy of the description.
impl Clone for VNode {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            props: self.props.clone(),
            children: self.children.clone(),
            el: None,
        }
    }
}

impl PartialEq for VNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.props == other.props && self.children == other.children
    }
}

impl Eq for VNode {}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("tag", &self.tag)
            .field("props", &self.props)
            .field("children", &self.children)
            .field("el", &self.el)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    #[test]
    fn h_builds_the_plain_triple() {
        let node = h("ul", None, vec![h("li", None, "a"), h("li", None, "b")]);

        assert_eq!(node.tag(), "ul");
        assert!(node.props().is_none());
        assert_eq!(node.children().nodes().len(), 2);
        assert!(!node.is_mounted());
    }

    #[test]
    fn clone_drops_live_handle() {
        let mut node = h("div", props! { "id" => "a" }, "hi");
        node.el = Some(NodeId::from_index(7));

        let copy = node.clone();
        assert!(copy.el().is_none());
        assert_eq!(copy, node);
    }

    #[test]
    fn children_emptiness() {
        assert!(Children::Empty.is_empty());
        assert!(Children::from("").is_empty());
        assert!(!Children::from("x").is_empty());
        assert!(Children::from(Vec::new()).is_empty());
        assert!(Children::Text("x".into()).nodes().is_empty());
    }
}
