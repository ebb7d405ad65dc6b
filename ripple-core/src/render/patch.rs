//! Reconciliation: bring a mounted tree in line with a new description.
//!
//! # Algorithm
//!
//! 1. Different tags: the new vnode is mounted just before the old live node,
//!    then the old node is removed. Nothing else is compared. A failed mount
//!    leaves the old node in place.
//!
//! 2. Same tag: the live node is carried over to the new vnode, then props
//!    and children are reconciled separately.
//!
//! 3. Props: a key whose value changed (or is new) is applied; a key that
//!    disappeared is removed. Handlers compare by identity.
//!
//! 4. Children: text replaces whatever was there; text → nodes clears and
//!    mounts fresh; nodes → nodes patches pairwise *by index*, mounts the
//!    extra new suffix and removes the extra old suffix.
//!
//! Children are matched by position only. Swapping two siblings patches
//! each position in place rather than moving live nodes.

use super::error::RenderError;
use super::host::{Host, NodeId};
use super::mount::{mount, mount_before};
use super::props::{remove_prop, set_prop, Props};
use super::vnode::{Children, VNode};

/// Reconcile `new` against the mounted `old`, mutating the live tree.
///
/// `old` must have been mounted (directly or by an earlier patch); `new`
/// must not be. On success `new` owns the live node.
pub fn patch<H: Host + ?Sized>(host: &H, old: &VNode, new: &mut VNode) -> Result<(), RenderError> {
    let el = old.el.ok_or_else(|| RenderError::NotMounted {
        tag: old.tag.clone(),
    })?;

    if let Some(existing) = new.el {
        if existing != el || old.tag != new.tag {
            return Err(RenderError::AlreadyMounted {
                tag: new.tag.clone(),
            });
        }
    }

    if old.tag != new.tag {
        let parent = host.parent(el).ok_or_else(|| RenderError::Detached {
            tag: old.tag.clone(),
        })?;

        tracing::debug!(from = %old.tag, to = %new.tag, %el, "tag changed; replacing");
        mount_before(host, new, parent, Some(el))?;
        host.remove_child(parent, el)?;
        return Ok(());
    }

    new.el = Some(el);

    patch_props(host, el, &new.tag, old.props.as_ref(), new.props.as_ref())?;
    patch_children(host, el, &old.children, &mut new.children)
}

fn patch_props<H: Host + ?Sized>(
    host: &H,
    el: NodeId,
    tag: &str,
    old: Option<&Props>,
    new: Option<&Props>,
) -> Result<(), RenderError> {
    let empty = Props::new();
    let old = old.unwrap_or(&empty);
    let new = new.unwrap_or(&empty);

    for (key, value) in new {
        let previous = old.get(key);
        if previous != Some(value) {
            set_prop(host, el, tag, key, previous, value)?;
        }
    }

    for (key, value) in old {
        if !new.contains_key(key) {
            remove_prop(host, el, tag, key, value)?;
        }
    }

    Ok(())
}

fn patch_children<H: Host + ?Sized>(
    host: &H,
    el: NodeId,
    old: &Children,
    new: &mut Children,
) -> Result<(), RenderError> {
    match (old, new) {
        (Children::Text(previous), Children::Text(text)) => {
            if *previous != *text {
                host.set_text_content(el, text)?;
            }
        }
        (_, Children::Text(text)) => host.set_text_content(el, text)?,
        (Children::Text(_), Children::Nodes(children)) => {
            host.set_text_content(el, "")?;
            for child in children.iter_mut() {
                mount(host, child, el)?;
            }
        }
        (Children::Text(_), Children::Empty) => host.set_text_content(el, "")?,
        (old, Children::Nodes(children)) => patch_child_list(host, el, old.nodes(), children)?,
        (old, Children::Empty) => patch_child_list(host, el, old.nodes(), &mut [])?,
    }
    Ok(())
}

fn patch_child_list<H: Host + ?Sized>(
    host: &H,
    el: NodeId,
    old: &[VNode],
    new: &mut [VNode],
) -> Result<(), RenderError> {
    let common = old.len().min(new.len());

    for (previous, next) in old.iter().zip(new.iter_mut()) {
        patch(host, previous, next)?;
    }

    for child in new.iter_mut().skip(common) {
        mount(host, child, el)?;
    }

    for stale in old.iter().skip(common) {
        let live = stale.el.ok_or_else(|| RenderError::NotMounted {
            tag: stale.tag.clone(),
        })?;
        host.remove_child(el, live)?;
    }

    if old.len() != new.len() {
        tracing::debug!(%el, from = old.len(), to = new.len(), "child list resized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::props;
    use crate::render::{h, Document, Handler, Mutation};

    fn mounted(vnode: &mut VNode) -> (Document, NodeId) {
        let doc = Document::with_config(DocumentConfig::with_container("app"));
        let app = doc.query_selector("#app").unwrap().unwrap();
        mount(&doc, vnode, app).unwrap();
        doc.take_mutations();
        (doc, app)
    }

    #[test]
    fn same_tag_carries_live_node() {
        let mut old = h("div", props! { "id" => "a" }, "hi");
        let (doc, _) = mounted(&mut old);
        let mut new = h("div", props! { "id" => "a" }, "hi");

        patch(&doc, &old, &mut new).unwrap();

        assert_eq!(new.el(), old.el());
        assert!(doc.take_mutations().is_empty());
    }

    #[test]
    fn unmounted_old_fails_fast() {
        let doc = Document::new();
        let old = h("div", None, Children::Empty);
        let mut new = h("div", None, Children::Empty);

        assert!(matches!(
            patch(&doc, &old, &mut new),
            Err(RenderError::NotMounted { .. })
        ));
    }

    #[test]
    fn tag_change_replaces_in_place() {
        let mut old = h(
            "section",
            None,
            vec![h("p", None, "1"), h("div", None, "2"), h("p", None, "3")],
        );
        let (doc, _) = mounted(&mut old);
        let section = old.el().unwrap();
        let div = old.children().nodes()[1].el().unwrap();

        let mut new = h(
            "section",
            None,
            vec![h("p", None, "1"), h("span", None, "2"), h("p", None, "3")],
        );
        patch(&doc, &old, &mut new).unwrap();

        let span = new.children().nodes()[1].el().unwrap();
        assert_ne!(span, div);
        assert_eq!(doc.parent(div), None);
        assert_eq!(doc.children(section)[1], span);
        assert_eq!(
            doc.inner_html(section),
            "<p>1</p><span>2</span><p>3</p>"
        );
    }

    #[test]
    fn removed_prop_is_removed_and_kept_prop_untouched() {
        let mut old = h("div", props! { "id" => "a", "class" => "x" }, Children::Empty);
        let (doc, _) = mounted(&mut old);
        let el = old.el().unwrap();

        let mut new = h("div", props! { "id" => "a" }, Children::Empty);
        patch(&doc, &old, &mut new).unwrap();

        assert_eq!(doc.attribute(el, "id").as_deref(), Some("a"));
        assert!(doc.attribute(el, "class").is_none());
        assert_eq!(
            doc.take_mutations(),
            vec![Mutation::RemoveAttribute { node: el, key: "class".into() }]
        );
    }

    #[test]
    fn handler_swap_replaces_listener() {
        let first = Handler::new(|_| {});
        let second = Handler::new(|_| {});
        let mut old = h("button", props! { "onClick" => first }, "go");
        let (doc, _) = mounted(&mut old);
        let el = old.el().unwrap();

        let mut new = h("button", props! { "onClick" => second }, "go");
        patch(&doc, &old, &mut new).unwrap();
        assert_eq!(doc.listener_count(el, "click"), 1);

        let mut last = h("button", None, "go");
        patch(&doc, &new, &mut last).unwrap();
        assert_eq!(doc.listener_count(el, "click"), 0);
    }

    #[test]
    fn text_to_nodes_and_back() {
        let mut old = h("div", None, "plain");
        let (doc, _) = mounted(&mut old);
        let el = old.el().unwrap();

        let mut nodes = h("div", None, vec![h("b", None, "bold")]);
        patch(&doc, &old, &mut nodes).unwrap();
        assert_eq!(doc.inner_html(el), "<b>bold</b>");
        assert!(nodes.children().nodes()[0].is_mounted());

        let mut text = h("div", None, "again");
        patch(&doc, &nodes, &mut text).unwrap();
        assert_eq!(doc.inner_html(el), "again");

        let mut empty = h("div", None, Children::Empty);
        patch(&doc, &text, &mut empty).unwrap();
        assert_eq!(doc.inner_html(el), "");
    }

    #[test]
    fn empty_to_empty_is_noop() {
        let mut old = h("div", None, Children::Empty);
        let (doc, _) = mounted(&mut old);
        let mut new = h("div", None, Children::Empty);

        patch(&doc, &old, &mut new).unwrap();
        assert!(doc.take_mutations().is_empty());
    }

    #[test]
    fn nodes_to_empty_removes_all() {
        let mut old = h("ul", None, vec![h("li", None, "a"), h("li", None, "b")]);
        let (doc, _) = mounted(&mut old);
        let el = old.el().unwrap();

        let mut new = h("ul", None, Children::Empty);
        patch(&doc, &old, &mut new).unwrap();
        assert!(doc.children(el).is_empty());
    }
}
