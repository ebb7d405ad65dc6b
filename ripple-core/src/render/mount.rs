//! Mounting: materialize a virtual node into the live tree.

use super::error::RenderError;
use super::host::{Host, NodeId};
use super::props::set_prop;
use super::vnode::{Children, VNode};

/// Create the live node for `vnode` (and its subtree) and append it as the
/// last child of `container`.
///
/// On success `vnode.el()` names the new live node. Mounting a vnode that
/// already owns a live node is an error.
pub fn mount<H: Host + ?Sized>(
    host: &H,
    vnode: &mut VNode,
    container: NodeId,
) -> Result<(), RenderError> {
    mount_before(host, vnode, container, None)
}

/// Like [`mount`], but insert before `anchor` when one is given.
pub(crate) fn mount_before<H: Host + ?Sized>(
    host: &H,
    vnode: &mut VNode,
    container: NodeId,
    anchor: Option<NodeId>,
) -> Result<(), RenderError> {
    if vnode.el.is_some() {
        return Err(RenderError::AlreadyMounted {
            tag: vnode.tag.clone(),
        });
    }

    let el = host.create_element(&vnode.tag)?;
    vnode.el = Some(el);

    if let Some(props) = &vnode.props {
        for (key, value) in props {
            set_prop(host, el, &vnode.tag, key, None, value)?;
        }
    }

    match &mut vnode.children {
        Children::Empty => {}
        Children::Text(text) => host.set_text_content(el, text)?,
        Children::Nodes(children) => {
            for child in children.iter_mut() {
                mount(host, child, el)?;
            }
        }
    }

    match anchor {
        Some(anchor) => host.insert_before(container, el, anchor)?,
        None => host.append_child(container, el)?,
    }

    tracing::debug!(tag = %vnode.tag, %el, %container, "mounted");
    Ok(())
}
