//! Child-to-parent event forwarding for materialized trees.

use tracing::{debug, trace};

use crate::events::Emitter;
use crate::node::Node;

/// Makes every event `child` emits re-emit from `parent` when `enabled`.
///
/// Leaves have no events, so the call is a no-op unless both sides are
/// containers. A child keeps its first relay; later requests are ignored.
/// Returns whether a relay was installed.
///
/// The relay holds `parent` weakly. Once the parent container is dropped
/// (for example replaced in its own parent with no handle left to it),
/// `child` stops forwarding and its events stay local.
pub fn attach_bubble(parent: &Node, child: &Node, enabled: bool) -> bool {
    match parent.events() {
        Some(parent_events) => relay(parent_events, child, enabled),
        None => false,
    }
}

pub(crate) fn relay(parent: &Emitter, child: &Node, enabled: bool) -> bool {
    if !enabled {
        return false;
    }
    let Some(child_events) = child.events() else {
        return false;
    };
    if child_events.relay_to(parent) {
        trace!("relay installed");
        true
    } else {
        debug!("relay rejected: child already relays or would relay into itself");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{RecordNode, SequenceNode};
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter(node: &Node) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        node.events()
            .expect("container")
            .on_all(move |_| sink.set(sink.get() + 1));
        hits
    }

    #[test]
    fn enabled_bridge_forwards_child_events() {
        let parent = Node::Record(RecordNode::new());
        let child = RecordNode::new();
        assert!(attach_bubble(&parent, &Node::Record(child.clone()), true));
        let hits = counter(&parent);
        child.set("k", 1);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn disabled_bridge_keeps_streams_independent() {
        let parent = Node::Record(RecordNode::new());
        let child = SequenceNode::new();
        assert!(!attach_bubble(&parent, &Node::Sequence(child.clone()), false));
        let hits = counter(&parent);
        child.push(1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn leaves_are_ignored() {
        let parent = Node::Record(RecordNode::new());
        assert!(!attach_bubble(&parent, &Node::from("x"), true));
        assert!(!attach_bubble(&Node::from("x"), &parent, true));
    }

    #[test]
    fn second_parent_is_rejected() {
        let first = Node::Record(RecordNode::new());
        let second = Node::Record(RecordNode::new());
        let child = Node::Record(RecordNode::new());
        assert!(attach_bubble(&first, &child, true));
        assert!(!attach_bubble(&second, &child, true));
        let hits = counter(&second);
        child.as_record().expect("record").set("k", 1);
        assert_eq!(hits.get(), 0);
    }
}
