use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Node;
use crate::events::{Emitter, Event, ListenerId};
use crate::raw::RawValue;
use crate::schema::{RecordType, SequenceType, DEFAULT_SEQUENCE_TYPE};
use crate::serialize::sequence_to_plain;

struct SequenceInner {
    type_name: Rc<str>,
    elements: RefCell<Vec<Node>>,
    element_type: RefCell<Option<RecordType>>,
    events: Emitter,
}

/// Ordered, observable container. `push` emits `add`, `remove` emits
/// `remove`.
#[derive(Clone)]
pub struct SequenceNode {
    inner: Rc<SequenceInner>,
}

impl SequenceNode {
    pub fn new() -> Self {
        Self::with_type_name(DEFAULT_SEQUENCE_TYPE)
    }

    pub fn with_type_name(type_name: impl Into<Rc<str>>) -> Self {
        Self {
            inner: Rc::new(SequenceInner {
                type_name: type_name.into(),
                elements: RefCell::new(Vec::new()),
                element_type: RefCell::new(None),
                events: Emitter::new(),
            }),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    pub fn is_instance_of(&self, sequence_type: &SequenceType) -> bool {
        self.type_name() == sequence_type.name()
    }

    /// Record type used for raw mapping elements that carry no type hint of
    /// their own.
    pub fn element_type(&self) -> Option<RecordType> {
        self.inner.element_type.borrow().clone()
    }

    pub fn set_element_type(&self, element_type: Option<RecordType>) {
        *self.inner.element_type.borrow_mut() = element_type;
    }

    pub fn get(&self, index: usize) -> Option<Node> {
        self.inner.elements.borrow().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.elements.borrow().is_empty()
    }

    pub fn to_vec(&self) -> Vec<Node> {
        self.inner.elements.borrow().clone()
    }

    /// Appends `element` and returns its index.
    pub fn push(&self, element: impl Into<Node>) -> usize {
        let element = element.into();
        let index = {
            let mut elements = self.inner.elements.borrow_mut();
            elements.push(element.clone());
            elements.len() - 1
        };
        self.inner.events.emit(&Event::Add {
            sequence: self.clone(),
            index,
            element,
        });
        index
    }

    pub fn remove(&self, index: usize) -> Option<Node> {
        let element = {
            let mut elements = self.inner.elements.borrow_mut();
            if index >= elements.len() {
                return None;
            }
            elements.remove(index)
        };
        self.inner.events.emit(&Event::Remove {
            sequence: self.clone(),
            index,
            element: element.clone(),
        });
        Some(element)
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

    pub fn trigger(&self, name: impl Into<String>, args: Vec<Node>) {
        self.inner.events.emit(&Event::Custom {
            name: name.into(),
            args,
        });
    }

    pub fn ptr_eq(&self, other: &SequenceNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn to_plain(&self) -> RawValue {
        sequence_to_plain(self)
    }

    pub(crate) fn with_elements<R>(&self, f: impl FnOnce(&[Node]) -> R) -> R {
        f(&self.inner.elements.borrow())
    }
}

impl Default for SequenceNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SequenceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("SequenceNode");
        out.field("type", &self.type_name());
        if let Some(element_type) = self.inner.element_type.borrow().as_ref() {
            out.field("element_type", &element_type.name());
        }
        match self.inner.elements.try_borrow() {
            Ok(elements) => out.field("elements", &*elements).finish(),
            Err(_) => out.finish_non_exhaustive(),
        }
    }
}
