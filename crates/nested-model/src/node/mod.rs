//! Observable containers that make up a materialized tree.
//!
//! A tree is built from [`Node`]s: plain leaves, [`RecordNode`]s (keyed,
//! insertion-ordered attributes) and [`SequenceNode`]s (ordered elements).
//! Container handles are cheap `Rc` clones; all clones share storage and
//! emitter. Mutations go through `&self` and notify listeners synchronously
//! once the storage borrow has been released.

mod record;
mod sequence;

pub use record::RecordNode;
pub use sequence::SequenceNode;

use serde::ser::{Serialize, Serializer};

use crate::events::Emitter;
use crate::raw::RawValue;
use crate::serialize::to_plain;

#[derive(Debug, Clone)]
pub enum Node {
    /// Plain value stored as-is. May be a primitive or an opaque plain
    /// sequence/mapping a caller chose not to materialize.
    Leaf(RawValue),
    Record(RecordNode),
    Sequence(SequenceNode),
}

impl Node {
    pub fn is_container(&self) -> bool {
        !matches!(self, Node::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&RawValue> {
        match self {
            Node::Leaf(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordNode> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceNode> {
        match self {
            Node::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<RecordNode> {
        match self {
            Node::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_sequence(self) -> Option<SequenceNode> {
        match self {
            Node::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    /// Emitter of the container, `None` for leaves.
    pub fn events(&self) -> Option<&Emitter> {
        match self {
            Node::Leaf(_) => None,
            Node::Record(record) => Some(record.events()),
            Node::Sequence(sequence) => Some(sequence.events()),
        }
    }

    /// Containers compare by identity, leaves by [`RawValue::same_value`].
    pub fn same_node(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Leaf(a), Node::Leaf(b)) => a.same_value(b),
            (Node::Record(a), Node::Record(b)) => a.ptr_eq(b),
            (Node::Sequence(a), Node::Sequence(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn to_plain(&self) -> RawValue {
        to_plain(self)
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::Leaf(RawValue::Undefined)
    }
}

impl From<RawValue> for Node {
    fn from(value: RawValue) -> Self {
        Node::Leaf(value)
    }
}

impl From<RecordNode> for Node {
    fn from(record: RecordNode) -> Self {
        Node::Record(record)
    }
}

impl From<SequenceNode> for Node {
    fn from(sequence: SequenceNode) -> Self {
        Node::Sequence(sequence)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Leaf(RawValue::from(s))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Leaf(RawValue::Str(s))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Leaf(RawValue::Bool(b))
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Leaf(RawValue::Integer(i))
    }
}

impl From<i32> for Node {
    fn from(i: i32) -> Self {
        Node::Leaf(RawValue::from(i))
    }
}

impl From<f64> for Node {
    fn from(f: f64) -> Self {
        Node::Leaf(RawValue::Float(f))
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_plain().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaves_compare_by_value_containers_by_identity() {
        assert!(Node::from(f64::NAN).same_node(&Node::from(f64::NAN)));
        assert!(!Node::from("a").same_node(&Node::from("b")));

        let record = RecordNode::new();
        let alias = Node::Record(record.clone());
        assert!(alias.same_node(&Node::Record(record)));
        assert!(!alias.same_node(&Node::Record(RecordNode::new())));
        assert!(!alias.same_node(&Node::Sequence(SequenceNode::new())));
    }

    #[test]
    fn leaves_have_no_emitter() {
        assert!(Node::from(1).events().is_none());
        assert!(Node::from(RecordNode::new()).events().is_some());
        assert!(!Node::default().is_container());
    }

    #[test]
    fn serializes_through_plain_form() {
        let record = RecordNode::new();
        record.set("name", "Name");
        let tags = SequenceNode::new();
        tags.push("a");
        record.set("tags", tags);
        let json = serde_json::to_value(Node::Record(record)).expect("serialize");
        assert_eq!(json, json!({"name": "Name", "tags": ["a"]}));
    }
}
