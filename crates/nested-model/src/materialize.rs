//! Recursive construction of container trees from plain data.
//!
//! # Overview
//!
//! [`Materializer`] walks a [`RawValue`] and an optional [`SchemaNode`] in
//! lock-step:
//!
//! - primitives come back unchanged as [`Node::Leaf`],
//! - mappings become records (schema type, else the configured default),
//! - sequences become sequences whose elements are materialized with the
//!   `element` schema.
//!
//! When bubbling is enabled every container created below the root relays its
//! events to the container it was installed in.
//!
//! Schema hints are advisory. A hint that does not fit the value it meets
//! falls back to defaults instead of failing:
//!
//! - a sequence hint met by a mapping builds a default record,
//! - a record hint met by a sequence is read as the element hint of a
//!   default sequence.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::bridge;
use crate::error::{NestedModelError, Result};
use crate::node::{Node, RecordNode, SequenceNode};
use crate::raw::RawValue;
use crate::schema::{default_record_type, default_sequence_type, RecordType, SchemaNode, SequenceType};

/// Configuration of a [`Materializer`].
#[derive(Clone)]
pub struct MaterializeOptions {
    /// Relay every child container's events to its parent. Default `false`.
    pub bubble_events: bool,
    /// Record type used where the schema names none.
    pub default_record: RecordType,
    /// Sequence type used where the schema names none.
    pub default_sequence: SequenceType,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            bubble_events: false,
            default_record: default_record_type(),
            default_sequence: default_sequence_type(),
        }
    }
}

impl MaterializeOptions {
    pub fn with_bubble_events(mut self, bubble_events: bool) -> Self {
        self.bubble_events = bubble_events;
        self
    }

    pub fn with_default_record(mut self, record_type: RecordType) -> Self {
        self.default_record = record_type;
        self
    }

    pub fn with_default_sequence(mut self, sequence_type: SequenceType) -> Self {
        self.default_sequence = sequence_type;
        self
    }
}

impl fmt::Debug for MaterializeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterializeOptions")
            .field("bubble_events", &self.bubble_events)
            .field("default_record", &self.default_record.name())
            .field("default_sequence", &self.default_sequence.name())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Materializer {
    options: MaterializeOptions,
}

impl Materializer {
    pub fn new(options: MaterializeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MaterializeOptions {
        &self.options
    }

    /// Builds the container tree for `value`.
    ///
    /// Fails with [`NestedModelError::InvalidArgument`] when `value` is
    /// absent; nothing is built in that case.
    pub fn materialize(&self, value: Option<&RawValue>, schema: Option<&SchemaNode>) -> Result<Node> {
        let value = value.ok_or(NestedModelError::InvalidArgument("value is required"))?;
        Ok(self.build(value, schema))
    }

    /// Fills the existing `target` record from a mapping instead of
    /// allocating a new root record.
    pub fn materialize_into(
        &self,
        value: Option<&RawValue>,
        schema: Option<&SchemaNode>,
        target: &RecordNode,
    ) -> Result<RecordNode> {
        let value = value.ok_or(NestedModelError::InvalidArgument("value is required"))?;
        let RawValue::Record(entries) = value else {
            return Err(NestedModelError::InvalidArgument(
                "value must be a mapping when a target record is supplied",
            ));
        };
        Ok(self.build_record(entries, schema, Some(target.clone())))
    }

    /// Sequence entry point: builds a sequence container from `array`.
    pub fn materialize_sequence(
        &self,
        array: Option<&[RawValue]>,
        schema: Option<&SchemaNode>,
    ) -> Result<SequenceNode> {
        let array = array.ok_or(NestedModelError::InvalidArgument("array is required"))?;
        Ok(self.build_sequence(array, schema))
    }

    /// Materializes `value` as a new element of `sequence`, applying the
    /// sequence's element type to untyped mappings, and appends it.
    pub fn append_raw(
        &self,
        sequence: &SequenceNode,
        value: &RawValue,
        schema: Option<&SchemaNode>,
    ) -> Node {
        let element = self.build_element(sequence, value, schema);
        bridge::relay(sequence.events(), &element, self.options.bubble_events);
        sequence.push(element.clone());
        element
    }

    fn build(&self, value: &RawValue, schema: Option<&SchemaNode>) -> Node {
        match value {
            RawValue::Record(entries) => Node::Record(self.build_record(entries, schema, None)),
            RawValue::Sequence(items) => Node::Sequence(self.build_sequence(items, schema)),
            leaf => Node::Leaf(leaf.clone()),
        }
    }

    fn build_record(
        &self,
        entries: &IndexMap<String, RawValue>,
        schema: Option<&SchemaNode>,
        target: Option<RecordNode>,
    ) -> RecordNode {
        let record = target.unwrap_or_else(|| self.new_record(schema));
        for (key, value) in entries {
            let child = self.build(value, schema.and_then(|s| s.field(key)));
            bridge::relay(record.events(), &child, self.options.bubble_events);
            record.set(key.clone(), child);
        }
        trace!(
            type_name = record.type_name(),
            fields = entries.len(),
            "materialized record"
        );
        record
    }

    fn build_sequence(&self, items: &[RawValue], schema: Option<&SchemaNode>) -> SequenceNode {
        let (sequence, element_schema) = self.new_sequence(schema);
        if let Some(record_type) = element_schema.and_then(SchemaNode::record_type) {
            sequence.set_element_type(Some(Rc::clone(record_type)));
        }
        for item in items {
            let element = self.build_element(&sequence, item, element_schema);
            bridge::relay(sequence.events(), &element, self.options.bubble_events);
            sequence.push(element);
        }
        trace!(
            type_name = sequence.type_name(),
            elements = items.len(),
            "materialized sequence"
        );
        sequence
    }

    fn build_element(&self, sequence: &SequenceNode, item: &RawValue, schema: Option<&SchemaNode>) -> Node {
        match item {
            RawValue::Record(entries) if schema.and_then(SchemaNode::record_type).is_none() => {
                let target = sequence.element_type().map(|record_type| record_type.create());
                Node::Record(self.build_record(entries, schema, target))
            }
            _ => self.build(item, schema),
        }
    }

    fn new_record(&self, schema: Option<&SchemaNode>) -> RecordNode {
        match schema {
            Some(SchemaNode::Record {
                record_type: Some(record_type),
                ..
            }) => record_type.create(),
            Some(SchemaNode::Sequence { .. }) => {
                debug!("sequence schema met a mapping, using the default record type");
                self.options.default_record.create()
            }
            _ => self.options.default_record.create(),
        }
    }

    fn new_sequence<'s>(&self, schema: Option<&'s SchemaNode>) -> (SequenceNode, Option<&'s SchemaNode>) {
        match schema {
            Some(SchemaNode::Sequence {
                sequence_type,
                element,
            }) => {
                let sequence_type = sequence_type.as_ref().unwrap_or(&self.options.default_sequence);
                (sequence_type.create(), Some(element.as_ref()))
            }
            Some(record @ SchemaNode::Record { .. }) => {
                debug!("record schema met a sequence, reading it as the element schema");
                (self.options.default_sequence.create(), Some(record))
            }
            _ => (self.options.default_sequence.create(), None),
        }
    }
}

/// Materializes `value` with default container types.
pub fn materialize(value: Option<&RawValue>, schema: Option<&SchemaNode>, bubble_events: bool) -> Result<Node> {
    Materializer::new(MaterializeOptions::default().with_bubble_events(bubble_events)).materialize(value, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RecordClass, SequenceClass};
    use serde_json::json;

    fn raw(v: serde_json::Value) -> RawValue {
        RawValue::from(v)
    }

    #[test]
    fn missing_value_is_rejected() {
        let err = materialize(None, None, false).unwrap_err();
        assert_eq!(err, NestedModelError::InvalidArgument("value is required"));
        let err = Materializer::default()
            .materialize_sequence(None, None)
            .unwrap_err();
        assert_eq!(err, NestedModelError::InvalidArgument("array is required"));
    }

    #[test]
    fn target_requires_a_mapping() {
        let target = RecordNode::new();
        let err = Materializer::default()
            .materialize_into(Some(&raw(json!([1]))), None, &target)
            .unwrap_err();
        assert!(matches!(err, NestedModelError::InvalidArgument(_)));
        assert!(target.is_empty());
    }

    #[test]
    fn target_record_is_reused() {
        let target = RecordNode::with_type_name("Existing");
        target.set("kept", true);
        let out = Materializer::default()
            .materialize_into(Some(&raw(json!({"added": 1}))), None, &target)
            .unwrap();
        assert!(out.ptr_eq(&target));
        assert_eq!(out.keys(), vec!["kept".to_string(), "added".to_string()]);
    }

    #[test]
    fn sequence_schema_on_mapping_degrades_to_defaults() {
        let schema = SchemaNode::sequence_of(SequenceClass::new("List").into_type(), SchemaNode::Leaf);
        let node = materialize(Some(&raw(json!({"a": {}}))), Some(&schema), false).unwrap();
        let record = node.as_record().expect("record");
        assert_eq!(record.type_name(), crate::schema::DEFAULT_RECORD_TYPE);
    }

    #[test]
    fn record_schema_on_sequence_types_the_elements() {
        let item = RecordClass::new("Item").into_type();
        let schema = SchemaNode::record_of(Rc::clone(&item));
        let node = materialize(Some(&raw(json!([{}, {}]))), Some(&schema), false).unwrap();
        let sequence = node.as_sequence().expect("sequence");
        assert_eq!(sequence.type_name(), crate::schema::DEFAULT_SEQUENCE_TYPE);
        assert!(sequence.element_type().is_some());
        for element in sequence.to_vec() {
            assert!(element.as_record().expect("record").is_instance_of(&item));
        }
    }

    #[test]
    fn configured_defaults_are_used() {
        let options = MaterializeOptions::default()
            .with_default_record(RecordClass::new("Entity").into_type())
            .with_default_sequence(SequenceClass::new("List").into_type());
        let node = Materializer::new(options)
            .materialize(Some(&raw(json!({"xs": []}))), None)
            .unwrap();
        let record = node.as_record().expect("record");
        assert_eq!(record.type_name(), "Entity");
        let xs = record.get("xs").and_then(Node::into_sequence).expect("sequence");
        assert_eq!(xs.type_name(), "List");
    }

    #[test]
    fn append_raw_uses_sequence_element_type() {
        let address = RecordClass::new("Address").into_type();
        let addresses = SequenceClass::new("Addresses")
            .with_element_type(Rc::clone(&address))
            .into_type();
        let materializer = Materializer::new(MaterializeOptions::default().with_bubble_events(true));
        let empty: Vec<RawValue> = Vec::new();
        let sequence = materializer
            .materialize_sequence(Some(empty.as_slice()), Some(&SchemaNode::sequence_of(addresses, SchemaNode::Leaf)))
            .unwrap();

        let hits = Rc::new(std::cell::Cell::new(0));
        let sink = Rc::clone(&hits);
        sequence.on("change:street", move |_| sink.set(sink.get() + 1));

        let element = materializer.append_raw(&sequence, &raw(json!({"street": "s"})), None);
        let record = element.as_record().expect("record");
        assert!(record.is_instance_of(&address));
        assert_eq!(sequence.len(), 1);

        record.set("street", "t");
        assert_eq!(hits.get(), 1);
    }
}
