//! Optional per-position hints for the materializer.
//!
//! A [`SchemaNode`] mirrors the shape of the raw input. It names the
//! container type to build at a position and carries the hints for nested
//! positions. Missing hints always mean "use the defaults".

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::node::{Node, RecordNode, SequenceNode};
use crate::raw::RawValue;

pub const DEFAULT_RECORD_TYPE: &str = "Record";
pub const DEFAULT_SEQUENCE_TYPE: &str = "Sequence";

/// Builds empty record containers of one named type.
pub trait RecordFactory {
    fn name(&self) -> &str;
    fn create(&self) -> RecordNode;
}

/// Builds empty sequence containers of one named type.
pub trait SequenceFactory {
    fn name(&self) -> &str;
    fn create(&self) -> SequenceNode;
}

pub type RecordType = Rc<dyn RecordFactory>;
pub type SequenceType = Rc<dyn SequenceFactory>;

/// Stock record factory: a type name plus default attributes every new
/// instance starts with.
#[derive(Debug, Clone)]
pub struct RecordClass {
    name: Rc<str>,
    defaults: IndexMap<String, RawValue>,
}

impl RecordClass {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            name: name.into(),
            defaults: IndexMap::new(),
        }
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn into_type(self) -> RecordType {
        Rc::new(self)
    }
}

impl RecordFactory for RecordClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self) -> RecordNode {
        let record = RecordNode::with_type_name(Rc::clone(&self.name));
        for (key, value) in &self.defaults {
            record.set_silent(key.clone(), Node::Leaf(value.clone()));
        }
        record
    }
}

/// Stock sequence factory: a type name plus an optional element record type.
#[derive(Clone)]
pub struct SequenceClass {
    name: Rc<str>,
    element_type: Option<RecordType>,
}

impl SequenceClass {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            name: name.into(),
            element_type: None,
        }
    }

    pub fn with_element_type(mut self, element_type: RecordType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    pub fn into_type(self) -> SequenceType {
        Rc::new(self)
    }
}

impl SequenceFactory for SequenceClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self) -> SequenceNode {
        let sequence = SequenceNode::with_type_name(Rc::clone(&self.name));
        sequence.set_element_type(self.element_type.clone());
        sequence
    }
}

impl fmt::Debug for SequenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceClass")
            .field("name", &self.name)
            .field("element_type", &self.element_type.as_ref().map(|t| t.name()))
            .finish()
    }
}

pub fn default_record_type() -> RecordType {
    RecordClass::new(DEFAULT_RECORD_TYPE).into_type()
}

pub fn default_sequence_type() -> SequenceType {
    SequenceClass::new(DEFAULT_SEQUENCE_TYPE).into_type()
}

#[derive(Clone, Default)]
pub enum SchemaNode {
    #[default]
    Leaf,
    Record {
        record_type: Option<RecordType>,
        fields: IndexMap<String, SchemaNode>,
    },
    Sequence {
        sequence_type: Option<SequenceType>,
        element: Box<SchemaNode>,
    },
}

impl SchemaNode {
    /// Untyped record hint, usually followed by [`SchemaNode::with_field`].
    pub fn record() -> Self {
        SchemaNode::Record {
            record_type: None,
            fields: IndexMap::new(),
        }
    }

    pub fn record_of(record_type: RecordType) -> Self {
        SchemaNode::Record {
            record_type: Some(record_type),
            fields: IndexMap::new(),
        }
    }

    pub fn sequence(element: SchemaNode) -> Self {
        SchemaNode::Sequence {
            sequence_type: None,
            element: Box::new(element),
        }
    }

    pub fn sequence_of(sequence_type: SequenceType, element: SchemaNode) -> Self {
        SchemaNode::Sequence {
            sequence_type: Some(sequence_type),
            element: Box::new(element),
        }
    }

    /// Adds a hint for `key`. Only record hints have fields; on any other
    /// variant the call is a no-op.
    pub fn with_field(mut self, key: impl Into<String>, schema: SchemaNode) -> Self {
        if let SchemaNode::Record { fields, .. } = &mut self {
            fields.insert(key.into(), schema);
        }
        self
    }

    pub fn field(&self, key: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Record { fields, .. } => fields.get(key),
            _ => None,
        }
    }

    pub fn record_type(&self) -> Option<&RecordType> {
        match self {
            SchemaNode::Record { record_type, .. } => record_type.as_ref(),
            _ => None,
        }
    }

    pub fn sequence_type(&self) -> Option<&SequenceType> {
        match self {
            SchemaNode::Sequence { sequence_type, .. } => sequence_type.as_ref(),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Sequence { element, .. } => Some(element.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Leaf => f.write_str("Leaf"),
            SchemaNode::Record {
                record_type,
                fields,
            } => f
                .debug_struct("Record")
                .field("record_type", &record_type.as_ref().map(|t| t.name()))
                .field("fields", fields)
                .finish(),
            SchemaNode::Sequence {
                sequence_type,
                element,
            } => f
                .debug_struct("Sequence")
                .field("sequence_type", &sequence_type.as_ref().map(|t| t.name()))
                .field("element", element)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_class_applies_defaults() {
        let address = RecordClass::new("Address")
            .with_default("country", "SE")
            .into_type();
        let record = address.create();
        assert_eq!(record.type_name(), "Address");
        assert!(record.is_instance_of(&address));
        assert_eq!(
            record.get("country").and_then(|n| n.as_leaf().cloned()),
            Some(RawValue::from("SE"))
        );
    }

    #[test]
    fn sequence_class_carries_element_type() {
        let phone = RecordClass::new("Phone").into_type();
        let phones = SequenceClass::new("Phones")
            .with_element_type(Rc::clone(&phone))
            .into_type();
        let sequence = phones.create();
        assert_eq!(sequence.type_name(), "Phones");
        assert_eq!(
            sequence.element_type().map(|t| t.name().to_string()),
            Some("Phone".to_string())
        );
    }

    #[test]
    fn accessors_degrade_on_other_variants() {
        let schema = SchemaNode::sequence(SchemaNode::record()).with_field("ignored", SchemaNode::Leaf);
        assert!(schema.field("ignored").is_none());
        assert!(schema.record_type().is_none());
        assert!(schema.element().is_some());
        assert!(SchemaNode::Leaf.element().is_none());
    }

    #[test]
    fn debug_prints_type_names() {
        let schema = SchemaNode::record_of(RecordClass::new("Person").into_type())
            .with_field("tags", SchemaNode::sequence(SchemaNode::Leaf));
        let text = format!("{schema:?}");
        assert!(text.contains("Person"));
        assert!(text.contains("tags"));
    }
}
