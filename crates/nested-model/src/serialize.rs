//! Deep conversion of a container tree back into plain data.

use serde_json::Value;

use crate::node::{Node, RecordNode, SequenceNode};
use crate::raw::RawValue;

/// Expands every record and sequence reachable from `node` into plain data.
/// Leaves, including opaque plain sequences and mappings, are copied as-is.
pub fn to_plain(node: &Node) -> RawValue {
    match node {
        Node::Leaf(value) => value.clone(),
        Node::Record(record) => record_to_plain(record),
        Node::Sequence(sequence) => sequence_to_plain(sequence),
    }
}

/// [`to_plain`] followed by [`RawValue::to_json`].
pub fn to_json(node: &Node) -> Value {
    to_plain(node).to_json()
}

pub(crate) fn record_to_plain(record: &RecordNode) -> RawValue {
    record.with_attrs(|attrs| {
        RawValue::Record(
            attrs
                .iter()
                .map(|(key, value)| (key.clone(), to_plain(value)))
                .collect(),
        )
    })
}

pub(crate) fn sequence_to_plain(sequence: &SequenceNode) -> RawValue {
    sequence.with_elements(|elements| RawValue::Sequence(elements.iter().map(to_plain).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_record_holding_sequence_of_records() {
        let root = RecordNode::new();
        let list = SequenceNode::new();
        let item = RecordNode::new();
        item.set("key", "value");
        list.push(item);
        root.set("key", list);

        assert_eq!(to_json(&Node::Record(root)), json!({"key": [{"key": "value"}]}));
    }

    #[test]
    fn opaque_plain_values_pass_through() {
        let root = RecordNode::new();
        let plain = RawValue::from(json!([1, {"a": 2}]));
        root.set("raw", plain.clone());
        let out = root.to_plain();
        assert!(out.get("raw").is_some_and(|v| v.same_value(&plain)));
    }

    #[test]
    fn handles_deep_nesting() {
        let root = RecordNode::new();
        let mut cursor = root.clone();
        for _ in 0..200 {
            let next = RecordNode::new();
            cursor.set("next", next.clone());
            cursor = next;
        }
        cursor.set("end", true);

        let mut plain = &root.to_plain();
        let mut depth = 0;
        while let Some(next) = plain.get("next") {
            plain = next;
            depth += 1;
        }
        assert_eq!(depth, 200);
        assert_eq!(plain.get("end"), Some(&RawValue::Bool(true)));
    }

    #[test]
    fn serialization_does_not_mutate_the_tree() {
        let root = RecordNode::new();
        root.set("a", 1);
        let fired = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = std::rc::Rc::clone(&fired);
        root.on_all(move |_| flag.set(true));
        let _ = root.to_plain();
        assert!(!fired.get());
        assert_eq!(root.len(), 1);
    }
}
