use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::Node;
use crate::events::{Emitter, Event, ListenerId};
use crate::raw::RawValue;
use crate::schema::{RecordType, DEFAULT_RECORD_TYPE};
use crate::serialize::record_to_plain;

struct RecordInner {
    type_name: Rc<str>,
    attrs: RefCell<IndexMap<String, Node>>,
    events: Emitter,
}

/// Keyed, observable container.
///
/// `set` and `unset` emit `change:<key>` followed by `change`. Setting a key
/// to a value it already holds (same leaf value, same container) is silent.
#[derive(Clone)]
pub struct RecordNode {
    inner: Rc<RecordInner>,
}

impl RecordNode {
    pub fn new() -> Self {
        Self::with_type_name(DEFAULT_RECORD_TYPE)
    }

    pub fn with_type_name(type_name: impl Into<Rc<str>>) -> Self {
        Self {
            inner: Rc::new(RecordInner {
                type_name: type_name.into(),
                attrs: RefCell::new(IndexMap::new()),
                events: Emitter::new(),
            }),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    pub fn is_instance_of(&self, record_type: &RecordType) -> bool {
        self.type_name() == record_type.name()
    }

    pub fn get(&self, key: &str) -> Option<Node> {
        self.inner.attrs.borrow().get(key).cloned()
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.attrs.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.attrs.borrow().keys().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(String, Node)> {
        self.inner
            .attrs
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.attrs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.attrs.borrow().is_empty()
    }

    /// Stores `value` under `key`. Returns `true` and notifies when the
    /// stored value changed.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Node>) -> bool {
        let key = key.into();
        let value = value.into();
        {
            let mut attrs = self.inner.attrs.borrow_mut();
            if attrs.get(&key).is_some_and(|prev| prev.same_node(&value)) {
                return false;
            }
            attrs.insert(key.clone(), value.clone());
        }
        self.notify_change(key, value);
        true
    }

    /// Stores `value` under `key` without notifying anyone.
    pub fn set_silent(&self, key: impl Into<String>, value: impl Into<Node>) {
        self.inner
            .attrs
            .borrow_mut()
            .insert(key.into(), value.into());
    }

    /// Removes `key`, notifying with an undefined value when it was present.
    pub fn unset(&self, key: &str) -> Option<Node> {
        let removed = self.inner.attrs.borrow_mut().shift_remove(key);
        if removed.is_some() {
            self.notify_change(key.to_string(), Node::Leaf(RawValue::Undefined));
        }
        removed
    }

    pub fn events(&self) -> &Emitter {
        &self.inner.events
    }

    pub fn on<F>(&self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        self.inner.events.on(name, listener)
    }

    pub fn on_all<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        self.inner.events.on_all(listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    /// Emits a caller-defined event from this record.
    pub fn trigger(&self, name: impl Into<String>, args: Vec<Node>) {
        self.inner.events.emit(&Event::Custom {
            name: name.into(),
            args,
        });
    }

    pub fn ptr_eq(&self, other: &RecordNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Deep plain copy of this record.
    pub fn to_plain(&self) -> RawValue {
        record_to_plain(self)
    }

    pub(crate) fn with_attrs<R>(&self, f: impl FnOnce(&IndexMap<String, Node>) -> R) -> R {
        f(&self.inner.attrs.borrow())
    }

    fn notify_change(&self, key: String, value: Node) {
        self.inner.events.emit(&Event::ChangeKey {
            record: self.clone(),
            key,
            value,
        });
        self.inner.events.emit(&Event::Change {
            record: self.clone(),
        });
    }
}

impl Default for RecordNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.attrs.try_borrow() {
            Ok(attrs) => f
                .debug_struct("RecordNode")
                .field("type", &self.type_name())
                .field("attrs", &*attrs)
                .finish(),
            Err(_) => f
                .debug_struct("RecordNode")
                .field("type", &self.type_name())
                .finish_non_exhaustive(),
        }
    }
}
