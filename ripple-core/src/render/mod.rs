//! Virtual Tree Renderer
//!
//! This module turns virtual node descriptions into a live display tree and
//! keeps that tree in sync as new descriptions arrive.
//!
//! # Overview
//!
//! - [`h`] builds a [`VNode`]: a tag, optional [`Props`] and [`Children`].
//! - [`mount`] materializes a vnode (and its subtree) under a container and
//!   records the live node in the vnode.
//! - [`patch`] reconciles a mounted vnode with its next version, reusing the
//!   live node wherever the tag is unchanged.
//!
//! The live tree is reached only through the [`Host`] trait. [`Document`] is
//! the in-memory host used by tests, benches and headless embedders; it
//! journals every operation as a [`Mutation`].

mod dom;
mod error;
mod host;
mod mount;
pub mod mutation;
mod patch;
mod props;
mod vnode;

pub use dom::Document;
pub use error::{HostError, RenderError};
pub use host::{Host, NodeId};
pub use mount::mount;
pub use mutation::Mutation;
pub use patch::patch;
pub use props::{event_name, Event, Handler, PropValue, Props};
pub use vnode::{h, Children, VNode};
