//! Reactive Primitives
//!
//! This module implements the reactivity engine: dependency cells, the
//! registry that maps owners and keys to cells, effects, and the reactive
//! records that effects read.
//!
//! # Concepts
//!
//! ## Dependency cells
//!
//! A [`Dep`] holds the set of effects subscribed to one observable slot.
//! Reading the slot inside an effect subscribes the effect; writing the slot
//! re-runs every subscriber, synchronously and in subscription order.
//!
//! ## Effects
//!
//! [`watch_effect`] runs a closure once while recording which cells it
//! reads. Whenever one of those cells is written, the closure runs again.
//!
//! ## Reactive objects
//!
//! [`reactive`] turns a JSON object into a [`ReactiveObject`] whose keys each
//! own a cell. [`Tracked`] is the typed single-value form.
//!
//! # Implementation Notes
//!
//! Tracking uses a thread-local stack of scopes ([`ReactiveContext`]). The
//! whole engine is single-threaded: handles are `Rc`-based and `!Send`.

mod context;
mod dep;
mod effect;
mod object;
pub mod registry;
mod runtime;
mod subscriber;
mod tracked;

pub use context::ReactiveContext;
pub use dep::{Dep, DepId};
pub use effect::{watch_effect, Effect, MAX_REENTRANT_DEPTH};
pub use object::{reactive, ReactiveError, ReactiveObject};
pub use registry::{get_dependency, ObjectId};
pub use runtime::Runtime;
pub use subscriber::SubscriberId;
pub use tracked::Tracked;
