//! Notifications emitted by record and sequence containers.
//!
//! Every container owns an [`Emitter`]. Listeners subscribe either to one
//! event name (`"change:street"`, `"add"`, ...) or to all events. An emitter
//! can carry a *relay*: a weak link to a parent emitter that re-emits every
//! event after the local listeners have run. Relays are what the event bridge
//! installs to bubble notifications up a materialized tree.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::node::{Node, RecordNode, SequenceNode};

pub type ListenerId = u64;

type Listener = Rc<dyn Fn(&Event)>;

#[derive(Debug, Clone)]
pub enum Event {
    /// Aggregate notification after one or more keys of `record` changed.
    Change { record: RecordNode },
    /// A single key of `record` was replaced or removed.
    ChangeKey {
        record: RecordNode,
        key: String,
        value: Node,
    },
    Add {
        sequence: SequenceNode,
        index: usize,
        element: Node,
    },
    Remove {
        sequence: SequenceNode,
        index: usize,
        element: Node,
    },
    /// Caller-defined event raised through `trigger`.
    Custom { name: String, args: Vec<Node> },
}

impl Event {
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Event::Change { .. } => Cow::Borrowed("change"),
            Event::ChangeKey { key, .. } => Cow::Owned(format!("change:{key}")),
            Event::Add { .. } => Cow::Borrowed("add"),
            Event::Remove { .. } => Cow::Borrowed("remove"),
            Event::Custom { name, .. } => Cow::Borrowed(name.as_str()),
        }
    }
}

struct Subscription {
    /// `None` subscribes to every event.
    filter: Option<String>,
    listener: Listener,
}

#[derive(Default)]
struct EmitterInner {
    last_id: Cell<ListenerId>,
    listeners: RefCell<BTreeMap<ListenerId, Subscription>>,
    relay: RefCell<Option<Weak<EmitterInner>>>,
}

impl EmitterInner {
    fn notify(&self, name: &str, event: &Event) {
        // Snapshot so listeners can subscribe/unsubscribe while being called.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .values()
            .filter(|sub| sub.filter.as_deref().map_or(true, |f| f == name))
            .map(|sub| Rc::clone(&sub.listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    fn parent(&self) -> Option<Rc<EmitterInner>> {
        self.relay.borrow().as_ref().and_then(Weak::upgrade)
    }
}

/// Publish/subscribe hub of one container.
///
/// Cloning yields another handle to the same hub.
#[derive(Clone, Default)]
pub struct Emitter {
    inner: Rc<EmitterInner>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to events whose [`Event::name`] equals `name`.
    pub fn on<F>(&self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        self.subscribe(Some(name.into()), Rc::new(listener))
    }

    /// Subscribes `listener` to every event, relayed ones included.
    pub fn on_all<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Event) + 'static,
    {
        self.subscribe(None, Rc::new(listener))
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Delivers `event` to local listeners, then walks the relay chain and
    /// delivers the same event at every ancestor.
    pub fn emit(&self, event: &Event) {
        let name = event.name();
        let mut current = Some(Rc::clone(&self.inner));
        while let Some(emitter) = current {
            emitter.notify(&name, event);
            current = emitter.parent();
        }
    }

    /// Installs a relay to `parent`.
    ///
    /// Returns `false` without changing anything when a relay is already
    /// installed or when `parent` already relays (directly or transitively)
    /// into `self`.
    pub fn relay_to(&self, parent: &Emitter) -> bool {
        if self.inner.relay.borrow().is_some() || parent.reaches(self) {
            return false;
        }
        *self.inner.relay.borrow_mut() = Some(Rc::downgrade(&parent.inner));
        true
    }

    pub fn has_relay(&self) -> bool {
        self.inner.parent().is_some()
    }

    pub fn ptr_eq(&self, other: &Emitter) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn reaches(&self, target: &Emitter) -> bool {
        let mut current = Some(Rc::clone(&self.inner));
        while let Some(emitter) = current {
            if Rc::ptr_eq(&emitter, &target.inner) {
                return true;
            }
            current = emitter.parent();
        }
        false
    }

    fn subscribe(&self, filter: Option<String>, listener: Listener) -> ListenerId {
        let id = self.inner.last_id.get().saturating_add(1);
        self.inner.last_id.set(id);
        self.inner
            .listeners
            .borrow_mut()
            .insert(id, Subscription { filter, listener });
        id
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listener_count())
            .field("relay", &self.has_relay())
            .finish()
    }
}
