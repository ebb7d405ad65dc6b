//! Props: attributes and event handlers.
//!
//! A prop key that starts with `on` followed by an uppercase letter is an
//! event binding (`onClick` listens for `click`). Every other key is a plain
//! string attribute.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::error::RenderError;
use super::host::{Host, NodeId};

/// Ordered prop map of a virtual node.
pub type Props = IndexMap<String, PropValue>;

/// An event delivered to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Lower-case event name, e.g. `click`.
    pub name: String,
    /// The node the event was dispatched on.
    pub target: NodeId,
}

/// An event callback.
///
/// Handlers compare by identity: two handlers are equal only if they are
/// clones of the same `Handler`.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", self.addr())
    }
}

/// Value of a single prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    /// A plain attribute, already stringified.
    Attr(String),
    /// An event handler.
    Handler(Handler),
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Attr(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Attr(value)
    }
}

impl From<Handler> for PropValue {
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

macro_rules! attr_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    Self::Attr(value.to_string())
                }
            }
        )*
    };
}

attr_from_display!(bool, char, i32, i64, u32, u64, usize, f64);

/// Build a [`Props`] map.
///
/// ```rust
/// use ripple_core::props;
/// use ripple_core::render::{Handler, PropValue};
///
/// let props = props! {
///     "id" => "counter",
///     "tabindex" => 0,
///     "onClick" => Handler::new(|_| {}),
/// };
/// assert_eq!(props["id"], PropValue::from("counter"));
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::render::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut props = $crate::render::Props::new();
        $(
            props.insert(
                ::std::string::String::from($key),
                $crate::render::PropValue::from($value),
            );
        )+
        props
    }};
}

/// The event name bound by `key`, if `key` is an event key.
pub fn event_name(key: &str) -> Option<String> {
    let rest = key.strip_prefix("on")?;
    rest.chars()
        .next()
        .filter(char::is_ascii_uppercase)
        .map(|_| rest.to_lowercase())
}

/// How one prop lands on a live node.
enum Binding<'a> {
    Listener { event: String, handler: &'a Handler },
    Attribute(&'a str),
}

fn binding<'a>(tag: &str, key: &str, value: &'a PropValue) -> Result<Binding<'a>, RenderError> {
    let invalid = |reason| RenderError::InvalidProp {
        tag: tag.to_owned(),
        key: key.to_owned(),
        reason,
    };

    match (event_name(key), value) {
        (Some(event), PropValue::Handler(handler)) => Ok(Binding::Listener { event, handler }),
        (None, PropValue::Attr(value)) => Ok(Binding::Attribute(value)),
        (Some(_), PropValue::Attr(_)) => Err(invalid("event keys take a handler")),
        (None, PropValue::Handler(_)) => Err(invalid("handlers need an `on<Event>` key")),
    }
}

/// Apply `value` for `key` on `el`, replacing `old` if it was a listener.
pub(crate) fn set_prop<H: Host + ?Sized>(
    host: &H,
    el: NodeId,
    tag: &str,
    key: &str,
    old: Option<&PropValue>,
    value: &PropValue,
) -> Result<(), RenderError> {
    match binding(tag, key, value)? {
        Binding::Listener { event, handler } => {
            if let Some(PropValue::Handler(previous)) = old {
                host.remove_event_listener(el, &event, previous)?;
            }
            host.add_event_listener(el, &event, handler)?;
        }
        Binding::Attribute(value) => host.set_attribute(el, key, value)?,
    }
    Ok(())
}

/// Undo a prop that is no longer present.
pub(crate) fn remove_prop<H: Host + ?Sized>(
    host: &H,
    el: NodeId,
    tag: &str,
    key: &str,
    old: &PropValue,
) -> Result<(), RenderError> {
    match binding(tag, key, old)? {
        Binding::Listener { event, handler } => host.remove_event_listener(el, &event, handler)?,
        Binding::Attribute(_) => host.remove_attribute(el, key)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_keys_need_capitalized_name() {
        assert_eq!(event_name("onClick"), Some("click".to_string()));
        assert_eq!(event_name("onMouseOver"), Some("mouseover".to_string()));
        assert_eq!(event_name("one"), None);
        assert_eq!(event_name("on"), None);
        assert_eq!(event_name("id"), None);
    }

    #[test]
    fn handlers_compare_by_identity() {
        let a = Handler::new(|_| {});
        let b = Handler::new(|_| {});

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn attributes_are_stringified() {
        assert_eq!(PropValue::from(3), PropValue::Attr("3".into()));
        assert_eq!(PropValue::from(true), PropValue::Attr("true".into()));
    }

    #[test]
    fn mismatched_values_are_rejected() {
        let handler = PropValue::from(Handler::new(|_| {}));
        assert!(matches!(
            binding("div", "title", &handler),
            Err(RenderError::InvalidProp { .. })
        ));
        assert!(matches!(
            binding("div", "onClick", &PropValue::from("x")),
            Err(RenderError::InvalidProp { .. })
        ));
    }
}
