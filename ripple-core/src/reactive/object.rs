//! Reactive Objects
//!
//! A [`ReactiveObject`] is a record whose properties report reads and writes
//! to their dependency cells. Instead of intercepting property syntax, reads
//! and writes go through explicit [`ReactiveObject::get`] and
//! [`ReactiveObject::set`] calls.
//!
//! The reactive key set is fixed when the object is created. A key written
//! later is stored and readable, but it has no cell: reading it subscribes
//! nothing and writing it notifies nothing.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::dep::Dep;
use super::registry::{self, ObjectId};

/// Errors raised while building or reading a reactive object.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// Only JSON objects have properties to instrument.
    #[error("reactive() expects an object, got {found}")]
    NotAnObject { found: &'static str },

    /// Conversion to or from `serde_json::Value` failed.
    #[error("value conversion failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Instrument every key of `raw` and return the reactive object.
///
/// Clones of the returned handle alias the same object.
pub fn reactive(raw: Map<String, Value>) -> ReactiveObject {
    let id = ObjectId::new();
    let slots = raw
        .into_iter()
        .map(|(key, value)| {
            let dep = registry::get_dependency(id, &key);
            let slot = Slot {
                value: RefCell::new(value),
                dep,
            };
            (key, slot)
        })
        .collect::<IndexMap<_, _>>();

    tracing::debug!(%id, keys = slots.len(), "reactive object created");

    ReactiveObject {
        inner: Rc::new(ObjectInner {
            id,
            slots,
            untracked: RefCell::new(IndexMap::new()),
        }),
    }
}

struct Slot {
    value: RefCell<Value>,
    dep: Rc<Dep>,
}

struct ObjectInner {
    id: ObjectId,
    slots: IndexMap<String, Slot>,
    /// Keys added after instrumentation.
    untracked: RefCell<IndexMap<String, Value>>,
}

impl Drop for ObjectInner {
    fn drop(&mut self) {
        registry::release(self.id);
    }
}

/// A record with dependency-tracked properties.
#[derive(Clone)]
pub struct ReactiveObject {
    inner: Rc<ObjectInner>,
}

impl ReactiveObject {
    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ReactiveError> {
        match value {
            Value::Object(map) => Ok(reactive(map)),
            other => Err(ReactiveError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Build from any serializable struct; its fields become the keys.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, ReactiveError> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Identity of this object in the dependency registry.
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// Read a property, subscribing the active effect if the key is reactive.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(slot) = self.inner.slots.get(key) {
            slot.dep.depend();
            return Some(slot.value.borrow().clone());
        }
        self.inner.untracked.borrow().get(key).cloned()
    }

    /// Read a property and deserialize it.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ReactiveError> {
        self.get(key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(ReactiveError::from)
    }

    /// Read a property without subscribing anything.
    pub fn get_untracked(&self, key: &str) -> Option<Value> {
        match self.inner.slots.get(key) {
            Some(slot) => Some(slot.value.borrow().clone()),
            None => self.inner.untracked.borrow().get(key).cloned(),
        }
    }

    /// Write a property.
    ///
    /// For a reactive key, every subscribed effect re-runs before this
    /// returns. Other keys are stored silently.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.inner.slots.get(key) {
            Some(slot) => {
                slot.value.replace(value);
                slot.dep.notify();
            }
            None => {
                tracing::trace!(id = %self.inner.id, key, "write to non-reactive key");
                self.inner.untracked.borrow_mut().insert(key.to_owned(), value);
            }
        }
    }

    /// Replace a property with a value computed from its current one.
    ///
    /// The current value is read untracked; a missing key reads as `null`.
    pub fn update<F>(&self, key: &str, f: F)
    where
        F: FnOnce(&Value) -> Value,
    {
        let current = self.get_untracked(key).unwrap_or(Value::Null);
        self.set(key, f(&current));
    }

    /// Check whether `key` was present at instrumentation time.
    pub fn is_reactive(&self, key: &str) -> bool {
        self.inner.slots.contains_key(key)
    }

    /// The reactive keys, in their original order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.slots.keys().map(String::as_str)
    }

    /// Untracked copy of every property as a JSON object.
    pub fn snapshot(&self) -> Value {
        let mut map: Map<String, Value> = self
            .inner
            .slots
            .iter()
            .map(|(key, slot)| (key.clone(), slot.value.borrow().clone()))
            .collect();
        for (key, value) in self.inner.untracked.borrow().iter() {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Check whether two handles alias the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("id", &self.inner.id)
            .field("value", &self.snapshot())
            .finish()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
