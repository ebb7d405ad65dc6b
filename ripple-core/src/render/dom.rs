//! In-memory display tree.
//!
//! [`Document`] is a small DOM-like tree that implements [`Host`]. Nodes live
//! in an arena and are never freed; a removed node is simply detached, the
//! same way a DOM node stays valid while something still references it.
//!
//! # Borrowing
//!
//! The tree sits behind `Rc<RefCell<_>>` and every method borrows it only for
//! its own duration. [`Document::dispatch`] clones the matching handlers and
//! releases the borrow before calling them, so a handler may write reactive
//! state whose effects patch this same document.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::error::HostError;
use super::host::{Host, NodeId};
use super::mutation::Mutation;
use super::props::{Event, Handler};
use crate::config::DocumentConfig;

struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    listeners: Vec<(String, Handler)>,
}

enum NodeKind {
    Element(Element),
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
}

struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
    journal: Option<Vec<Mutation>>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Result<&NodeData, HostError> {
        self.nodes.get(id.index()).ok_or(HostError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, HostError> {
        self.nodes.get_mut(id.index()).ok_or(HostError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&Element, HostError> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Ok(element),
            NodeKind::Text(_) => Err(HostError::TextNode(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, HostError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(element) => Ok(element),
            NodeKind::Text(_) => Err(HostError::TextNode(id)),
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: SmallVec::new(),
        });
        id
    }

    fn record(&mut self, mutation: Mutation) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(mutation);
        }
    }

    /// Remove `child` from its current parent, if any.
    fn detach(&mut self, child: NodeId) -> Result<(), HostError> {
        let parent = self.node(child)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != child);
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// The text node that can take `text` in place: `node` itself, or an
    /// element's only child when that child is text.
    fn reusable_text(&self, node: NodeId, text: &str) -> Result<Option<NodeId>, HostError> {
        let data = self.node(node)?;
        if let NodeKind::Text(_) = data.kind {
            return Ok(Some(node));
        }
        match data.children.as_slice() {
            [only] if !text.is_empty() => match self.node(*only)?.kind {
                NodeKind::Text(_) => Ok(Some(*only)),
                NodeKind::Element(_) => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Result<usize, HostError> {
        self.node(parent)?
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(HostError::NotAChild { parent, child })
    }

    /// Validate that `child` may be placed under `parent`.
    fn check_adoption(&self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.element(parent)?;
        self.node(child)?;
        // A node cannot become its own descendant.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(HostError::NotAChild { parent, child });
            }
            cursor = self.node(id)?.parent;
        }
        Ok(())
    }

    fn text_content(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(_) => {
                for child in &node.children {
                    self.text_content(*child, out);
                }
            }
        }
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => escape_into(text, out),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (key, value) in &element.attributes {
                    let _ = write!(out, " {key}=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                for child in &node.children {
                    self.write_html(*child, out);
                }
                let _ = write!(out, "</{}>", element.tag);
            }
        }
    }

    fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Ok(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Clone, Copy)]
enum Selector<'a> {
    Id(&'a str),
    Tag(&'a str),
}

fn parse_selector(selector: &str) -> Result<Selector<'_>, HostError> {
    let selector = selector.trim();
    match selector.strip_prefix('#') {
        Some(id) if !id.is_empty() && !id.contains(char::is_whitespace) => Ok(Selector::Id(id)),
        None if is_valid_tag(selector) => Ok(Selector::Tag(selector)),
        _ => Err(HostError::UnsupportedSelector(selector.to_owned())),
    }
}

/// An in-memory live tree.
///
/// Clones are handles to the same tree.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<Tree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with default settings.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create a document from `config`.
    pub fn with_config(config: DocumentConfig) -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            root: NodeId::from_index(0),
            journal: None,
        };
        tree.root = tree.push(NodeKind::Element(Element {
            tag: config.root_tag,
            attributes: IndexMap::new(),
            listeners: Vec::new(),
        }));

        if let Some(id) = config.container_id {
            let container = tree.push(NodeKind::Element(Element {
                tag: "div".to_string(),
                attributes: IndexMap::from([("id".to_string(), id)]),
                listeners: Vec::new(),
            }));
            let root = tree.root;
            tree.nodes[root.index()].children.push(container);
            tree.nodes[container.index()].parent = Some(root);
        }

        if config.record_mutations {
            tree.journal = Some(Vec::new());
        }

        Self {
            inner: Rc::new(RefCell::new(tree)),
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.inner.borrow().root
    }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tag name of an element; `None` for text nodes and unknown handles.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        let tree = self.inner.borrow();
        tree.element(node).ok().map(|element| element.tag.clone())
    }

    pub fn attribute(&self, node: NodeId, key: &str) -> Option<String> {
        let tree = self.inner.borrow();
        tree.element(node).ok()?.attributes.get(key).cloned()
    }

    /// All attributes of an element, in insertion order.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        let tree = self.inner.borrow();
        tree.element(node)
            .map(|element| {
                element
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Children of `node`, text nodes included.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.inner.borrow();
        tree.node(node).map(|n| n.children.to_vec()).unwrap_or_default()
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().text_content(node, &mut out);
        out
    }

    /// Number of listeners registered on `node` for `event`.
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        let tree = self.inner.borrow();
        tree.element(node)
            .map(|element| element.listeners.iter().filter(|(name, _)| name == event).count())
            .unwrap_or(0)
    }

    /// Fire `event` on `node`. Returns how many handlers ran.
    pub fn dispatch(&self, node: NodeId, event: &str) -> Result<usize, HostError> {
        let handlers: Vec<Handler> = {
            let tree = self.inner.borrow();
            tree.element(node)?
                .listeners
                .iter()
                .filter(|(name, _)| name == event)
                .map(|(_, handler)| handler.clone())
                .collect()
        };

        tracing::trace!(%node, event, handlers = handlers.len(), "dispatch");
        let payload = Event {
            name: event.to_owned(),
            target: node,
        };
        for handler in &handlers {
            handler.call(&payload);
        }
        Ok(handlers.len())
    }

    /// Serialize `node` and its subtree as HTML.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().write_html(node, &mut out);
        out
    }

    /// Serialize the children of `node` as HTML.
    pub fn inner_html(&self, node: NodeId) -> String {
        let tree = self.inner.borrow();
        let mut out = String::new();
        if let Ok(data) = tree.node(node) {
            for child in &data.children {
                tree.write_html(*child, &mut out);
            }
        }
        out
    }

    /// Drain the mutation journal.
    pub fn take_mutations(&self) -> Vec<Mutation> {
        self.inner
            .borrow_mut()
            .journal
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

impl Host for Document {
    fn create_element(&self, tag: &str) -> Result<NodeId, HostError> {
        if !is_valid_tag(tag) {
            return Err(HostError::InvalidTag(tag.to_owned()));
        }

        let mut tree = self.inner.borrow_mut();
        let node = tree.push(NodeKind::Element(Element {
            tag: tag.to_owned(),
            attributes: IndexMap::new(),
            listeners: Vec::new(),
        }));
        tree.record(Mutation::CreateElement {
            node,
            tag: tag.to_owned(),
        });
        Ok(node)
    }

    fn set_attribute(&self, node: NodeId, key: &str, value: &str) -> Result<(), HostError> {
        let mut tree = self.inner.borrow_mut();
        tree.element_mut(node)?
            .attributes
            .insert(key.to_owned(), value.to_owned());
        tree.record(Mutation::SetAttribute {
            node,
            key: key.to_owned(),
            value: value.to_owned(),
        });
        Ok(())
    }

    fn remove_attribute(&self, node: NodeId, key: &str) -> Result<(), HostError> {
        let mut tree = self.inner.borrow_mut();
        tree.element_mut(node)?.attributes.shift_remove(key);
        tree.record(Mutation::RemoveAttribute {
            node,
            key: key.to_owned(),
        });
        Ok(())
    }

    fn add_event_listener(
        &self,
        node: NodeId,
        event: &str,
        handler: &Handler,
    ) -> Result<(), HostError> {
        let mut tree = self.inner.borrow_mut();
        let listeners = &mut tree.element_mut(node)?.listeners;
        // Like the DOM, the same handler is registered at most once per event.
        if !listeners.iter().any(|(name, h)| name == event && h == handler) {
            listeners.push((event.to_owned(), handler.clone()));
        }
        tree.record(Mutation::AddListener {
            node,
            event: event.to_owned(),
        });
        Ok(())
    }

    fn remove_event_listener(
        &self,
        node: NodeId,
        event: &str,
        handler: &Handler,
    ) -> Result<(), HostError> {
        let mut tree = self.inner.borrow_mut();
        let listeners = &mut tree.element_mut(node)?.listeners;
        if let Some(index) = listeners
            .iter()
            .position(|(name, h)| name == event && h == handler)
        {
            listeners.remove(index);
        }
        tree.record(Mutation::RemoveListener {
            node,
            event: event.to_owned(),
        });
        Ok(())
    }

    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), HostError> {
        let mut tree = self.inner.borrow_mut();
        if let Some(target) = tree.reusable_text(node, text)? {
            if let NodeKind::Text(current) = &mut tree.node_mut(target)?.kind {
                *current = text.to_owned();
            }
        } else {
            let old_children = std::mem::take(&mut tree.node_mut(node)?.children);
            for child in old_children {
                tree.node_mut(child)?.parent = None;
            }
            if !text.is_empty() {
                let text_node = tree.push(NodeKind::Text(text.to_owned()));
                tree.node_mut(text_node)?.parent = Some(node);
                tree.node_mut(node)?.children.push(text_node);
            }
        }
        tree.record(Mutation::SetText {
            node,
            text: text.to_owned(),
        });
        Ok(())
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let mut tree = self.inner.borrow_mut();
        tree.check_adoption(parent, child)?;
        tree.detach(child)?;
        tree.node_mut(parent)?.children.push(child);
        tree.node_mut(child)?.parent = Some(parent);
        tree.record(Mutation::AppendChild { parent, child });
        Ok(())
    }

    fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), HostError> {
        let mut tree = self.inner.borrow_mut();
        tree.check_adoption(parent, child)?;
        tree.child_index(parent, reference)?;
        tree.detach(child)?;
        let index = tree.child_index(parent, reference)?;
        tree.node_mut(parent)?.children.insert(index, child);
        tree.node_mut(child)?.parent = Some(parent);
        tree.record(Mutation::InsertBefore {
            parent,
            child,
            reference,
        });
        Ok(())
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let mut tree = self.inner.borrow_mut();
        let index = tree.child_index(parent, child)?;
        tree.node_mut(parent)?.children.remove(index);
        tree.node_mut(child)?.parent = None;
        tree.record(Mutation::RemoveChild { parent, child });
        Ok(())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().node(node).ok()?.parent
    }

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, HostError> {
        let selector = parse_selector(selector)?;
        let tree = self.inner.borrow();
        let found = tree.preorder().into_iter().find(|id| {
            let Ok(element) = tree.element(*id) else {
                return false;
            };
            match selector {
                Selector::Id(wanted) => element.attributes.get("id").map(String::as_str) == Some(wanted),
                Selector::Tag(wanted) => element.tag.eq_ignore_ascii_case(wanted),
            }
        });
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn document() -> (Document, NodeId) {
        let doc = Document::with_config(DocumentConfig::with_container("app"));
        let app = doc.query_selector("#app").unwrap().unwrap();
        (doc, app)
    }

    #[test]
    fn container_from_config() {
        let (doc, app) = document();
        assert_eq!(doc.parent(app), Some(doc.root()));
        assert_eq!(doc.outer_html(doc.root()), r#"<body><div id="app"></div></body>"#);
        assert!(doc.take_mutations().is_empty());
    }

    #[test]
    fn build_and_serialize() {
        let (doc, app) = document();
        let p = doc.create_element("p").unwrap();
        doc.set_attribute(p, "class", "x\"y").unwrap();
        doc.set_text_content(p, "a < b").unwrap();
        doc.append_child(app, p).unwrap();

        assert_eq!(
            doc.inner_html(app),
            r#"<p class="x&quot;y">a &lt; b</p>"#
        );
        assert_eq!(doc.text_content(app), "a < b");
    }

    #[test]
    fn invalid_tags_are_rejected() {
        let doc = Document::new();
        assert_eq!(doc.create_element(""), Err(HostError::InvalidTag(String::new())));
        assert!(doc.create_element("<div>").is_err());
        assert!(doc.create_element("my-widget").is_ok());
    }

    #[test]
    fn set_text_content_replaces_children() {
        let (doc, app) = document();
        let a = doc.create_element("span").unwrap();
        let b = doc.create_element("span").unwrap();
        doc.append_child(app, a).unwrap();
        doc.append_child(app, b).unwrap();

        doc.set_text_content(app, "plain").unwrap();
        assert_eq!(doc.inner_html(app), "plain");
        assert_eq!(doc.parent(a), None);

        doc.set_text_content(app, "").unwrap();
        assert!(doc.children(app).is_empty());
    }

    #[test]
    fn repeated_text_reuses_text_node() {
        let (doc, app) = document();
        doc.set_text_content(app, "first").unwrap();
        let text = doc.children(app);
        let len = doc.len();

        for i in 0..100 {
            doc.set_text_content(app, &i.to_string()).unwrap();
        }

        assert_eq!(doc.len(), len);
        assert_eq!(doc.children(app), text);
        assert_eq!(doc.inner_html(app), "99");
    }

    #[test]
    fn insert_before_places_child() {
        let (doc, app) = document();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        let c = doc.create_element("i").unwrap();
        doc.append_child(app, a).unwrap();
        doc.append_child(app, b).unwrap();
        doc.insert_before(app, c, b).unwrap();

        assert_eq!(doc.children(app), vec![a, c, b]);
        assert_eq!(doc.parent(c), Some(app));
    }

    #[test]
    fn remove_child_requires_membership() {
        let (doc, app) = document();
        let a = doc.create_element("a").unwrap();
        assert_eq!(
            doc.remove_child(app, a),
            Err(HostError::NotAChild { parent: app, child: a })
        );

        doc.append_child(app, a).unwrap();
        doc.remove_child(app, a).unwrap();
        assert!(doc.children(app).is_empty());
    }

    #[test]
    fn node_cannot_adopt_its_ancestor() {
        let (doc, app) = document();
        let inner = doc.create_element("div").unwrap();
        doc.append_child(app, inner).unwrap();
        assert!(doc.append_child(inner, app).is_err());
    }

    #[test]
    fn listeners_dispatch_and_remove_by_identity() {
        let (doc, app) = document();
        let clicks = Rc::new(Cell::new(0));
        let clicks_c = clicks.clone();
        let handler = Handler::new(move |event| {
            assert_eq!(event.name, "click");
            clicks_c.set(clicks_c.get() + 1);
        });

        doc.add_event_listener(app, "click", &handler).unwrap();
        doc.add_event_listener(app, "click", &handler).unwrap();
        assert_eq!(doc.listener_count(app, "click"), 1);
        assert_eq!(doc.dispatch(app, "click").unwrap(), 1);

        doc.remove_event_listener(app, "click", &Handler::new(|_| {})).unwrap();
        assert_eq!(doc.listener_count(app, "click"), 1);

        doc.remove_event_listener(app, "click", &handler).unwrap();
        assert_eq!(doc.dispatch(app, "click").unwrap(), 0);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn handlers_may_mutate_the_document() {
        let (doc, app) = document();
        let doc_c = doc.clone();
        let handler = Handler::new(move |event| {
            doc_c.set_text_content(event.target, "clicked").unwrap();
        });

        doc.add_event_listener(app, "click", &handler).unwrap();
        doc.dispatch(app, "click").unwrap();
        assert_eq!(doc.text_content(app), "clicked");
    }

    #[test]
    fn query_selector_by_tag_and_id() {
        let (doc, app) = document();
        let span = doc.create_element("span").unwrap();
        doc.set_attribute(span, "id", "label").unwrap();
        doc.append_child(app, span).unwrap();

        assert_eq!(doc.query_selector("span").unwrap(), Some(span));
        assert_eq!(doc.query_selector("#label").unwrap(), Some(span));
        assert_eq!(doc.query_selector("#missing").unwrap(), None);
        assert!(matches!(
            doc.query_selector(".cls"),
            Err(HostError::UnsupportedSelector(_))
        ));
    }

    #[test]
    fn journal_records_in_order() {
        let (doc, app) = document();
        let div = doc.create_element("div").unwrap();
        doc.append_child(app, div).unwrap();

        assert_eq!(
            doc.take_mutations(),
            vec![
                Mutation::CreateElement { node: div, tag: "div".into() },
                Mutation::AppendChild { parent: app, child: div },
            ]
        );
        assert!(doc.take_mutations().is_empty());
    }
}
