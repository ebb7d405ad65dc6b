//! Ripple Core
//!
//! This crate provides the core runtime for the Ripple reactive UI framework.
//! It implements:
//!
//! - A dependency-tracking reactivity engine (cells, effects, reactive records)
//! - Virtual nodes and a reconciling renderer (mount and patch)
//! - An in-memory display tree with a serializable mutation journal
//! - An application bootstrap tying rendering to reactivity
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Dependency cells, the registry, effects and reactive objects
//! - `render`: Virtual nodes, the `Host` trait, mount and patch
//! - `app`: Root component mounting and re-rendering
//! - `config`: Settings for the in-memory document
//!
//! Everything is single-threaded and synchronous: a write re-runs every
//! subscribed effect before it returns, and a re-render patches the live tree
//! before the effect finishes.
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{h, mount, patch, props, reactive, watch_effect};
//! use ripple_core::render::Document;
//! use serde_json::json;
//!
//! let doc = Document::new();
//! let body = doc.root();
//!
//! let info = reactive(json!({ "name": "fxc" }).as_object().cloned().unwrap());
//! let mut view = h("p", props! { "class" => "name" }, "fxc");
//! mount(&doc, &mut view, body).unwrap();
//!
//! let reader = info.clone();
//! let (doc_c, current) = (doc.clone(), std::cell::RefCell::new(view));
//! watch_effect(move || {
//!     let name = reader.get("name").unwrap();
//!     let mut next = h("p", props! { "class" => "name" }, name.as_str().unwrap_or_default());
//!     patch(&doc_c, &current.borrow(), &mut next).unwrap();
//!     *current.borrow_mut() = next;
//! });
//!
//! info.set("name", "ripple");
//! assert_eq!(doc.inner_html(body), r#"<p class="name">ripple</p>"#);
//! ```

pub mod app;
pub mod config;
pub mod reactive;
pub mod render;

pub use reactive::{reactive, watch_effect};
pub use render::{h, mount, patch};
