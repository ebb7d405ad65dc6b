//! Application bootstrap.
//!
//! Ties the two halves together: a root component renders a vnode tree
//! inside an effect, so any reactive state it reads re-renders the tree.
//! The first run mounts; every later run patches against the previous tree.
//! A patch that fails part way leaves the live tree out of step with any
//! vnode tree, so the app drops it and the next run mounts from scratch.
//!
//! ```rust
//! use ripple_core::app::create_app;
//! use ripple_core::config::DocumentConfig;
//! use ripple_core::reactive::Tracked;
//! use ripple_core::render::{h, Document};
//!
//! let doc = Document::with_config(DocumentConfig::with_container("app"));
//! let count = Tracked::new(0);
//!
//! let reader = count.clone();
//! let app = create_app(move || h("p", None, format!("count: {}", reader.get())))
//!     .mount(doc.clone(), "#app")
//!     .unwrap();
//!
//! count.set(1);
//! assert_eq!(doc.inner_html(app.container()), "<p>count: 1</p>");
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::reactive::{watch_effect, Effect};
use crate::render::{mount, patch, Host, NodeId, RenderError, VNode};

/// Something that can describe the UI as a vnode tree.
pub trait Component {
    fn render(&self) -> VNode;
}

impl<F> Component for F
where
    F: Fn() -> VNode,
{
    fn render(&self) -> VNode {
        self()
    }
}

/// Create an application around a root component.
pub fn create_app<C>(root: C) -> App<C>
where
    C: Component + 'static,
{
    App { root }
}

/// An application that has not been mounted yet.
pub struct App<C> {
    root: C,
}

impl<C> App<C>
where
    C: Component + 'static,
{
    /// Mount into the node matching `selector` and start re-rendering on
    /// every change.
    ///
    /// Errors from the first render are returned. Later render errors are
    /// logged, the half-patched tree is detached, and the next change
    /// mounts a fresh one.
    pub fn mount<H>(self, host: H, selector: &str) -> Result<MountedApp, RenderError>
    where
        H: Host + 'static,
    {
        let container = host
            .query_selector(selector)?
            .ok_or_else(|| RenderError::ContainerNotFound(selector.to_owned()))?;

        let root = self.root;
        let tree: Rc<RefCell<Option<VNode>>> = Rc::new(RefCell::new(None));
        let first_error: Rc<RefCell<Option<RenderError>>> = Rc::new(RefCell::new(None));

        let started = Cell::new(false);

        let (tree_c, error_c) = (tree.clone(), first_error.clone());
        let effect = watch_effect(move || {
            let first_run = !started.replace(true);
            let mut next = root.render();
            let mut current = tree_c.borrow_mut();

            let result = match current.take() {
                None => mount(&host, &mut next, container),
                Some(previous) => {
                    let result = patch(&host, &previous, &mut next);
                    if result.is_err() {
                        detach_root(&host, container, &previous);
                        detach_root(&host, container, &next);
                    }
                    result
                }
            };

            match result {
                Ok(()) => *current = Some(next),
                Err(err) if first_run => *error_c.borrow_mut() = Some(err),
                Err(err) => tracing::error!(error = %err, "re-render failed; next change re-mounts"),
            }
        });

        if let Some(err) = first_error.borrow_mut().take() {
            effect.dispose();
            return Err(err);
        }

        tracing::debug!(selector, %container, "app mounted");
        Ok(MountedApp {
            effect,
            container,
            tree,
        })
    }
}

/// Remove a root left behind by a failed patch, if it is still attached.
fn detach_root<H: Host + ?Sized>(host: &H, container: NodeId, root: &VNode) {
    let Some(el) = root.el() else {
        return;
    };
    if host.parent(el) == Some(container) {
        if let Err(err) = host.remove_child(container, el) {
            tracing::warn!(error = %err, %el, "could not detach stale root");
        }
    }
}

/// A running application.
pub struct MountedApp {
    effect: Effect,
    container: NodeId,
    tree: Rc<RefCell<Option<VNode>>>,
}

impl MountedApp {
    /// The node the app was mounted into.
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// The render effect.
    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    /// Live node of the current root vnode.
    pub fn root_node(&self) -> Option<NodeId> {
        self.tree.borrow().as_ref().and_then(VNode::el)
    }

    /// Stop re-rendering and detach the rendered tree from the container.
    pub fn unmount<H: Host + ?Sized>(self, host: &H) -> Result<(), RenderError> {
        self.effect.dispose();
        if let Some(el) = self.root_node() {
            host.remove_child(self.container, el)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::render::{h, Children, Document};

    #[test]
    fn missing_container_is_reported() {
        let doc = Document::new();
        let result = create_app(|| h("div", None, Children::Empty)).mount(doc, "#nowhere");
        assert!(matches!(result, Err(RenderError::ContainerNotFound(_))));
    }

    #[test]
    fn first_render_error_is_returned() {
        let doc = Document::with_config(DocumentConfig::with_container("app"));
        let result = create_app(|| h("not a tag", None, Children::Empty)).mount(doc, "#app");
        assert!(matches!(result, Err(RenderError::Host(_))));
    }

    #[test]
    fn unmount_detaches_tree() {
        let doc = Document::with_config(DocumentConfig::with_container("app"));
        let app = create_app(|| h("div", None, "hello"))
            .mount(doc.clone(), "#app")
            .unwrap();
        let container = app.container();
        assert_eq!(doc.inner_html(container), "<div>hello</div>");

        app.unmount(&doc).unwrap();
        assert_eq!(doc.inner_html(container), "");
    }
}
