//! Plain, untyped input/output data.
//!
//! [`RawValue`] is the closed set of shapes the materializer understands:
//! primitives, ordered sequences, and insertion-ordered mappings. It is built
//! once at the ingestion boundary (usually from [`serde_json::Value`]) so that
//! the recursive algorithms match on tags instead of inspecting types.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// Absent value. Kept verbatim inside the tree, dropped from JSON objects.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Integer(i64),
    /// Any float, including NaN and the infinities.
    Float(f64),
    Str(String),
    Sequence(Vec<RawValue>),
    Record(IndexMap<String, RawValue>),
}

impl RawValue {
    /// Empty mapping.
    pub fn record() -> Self {
        RawValue::Record(IndexMap::new())
    }

    /// Empty sequence.
    pub fn sequence() -> Self {
        RawValue::Sequence(Vec::new())
    }

    /// `true` for everything that is neither a sequence nor a mapping.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, RawValue::Sequence(_) | RawValue::Record(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, RawValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Integer(i) => Some(*i as f64),
            RawValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&IndexMap<String, RawValue>> {
        match self {
            RawValue::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up `key` when `self` is a mapping.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.as_record().and_then(|map| map.get(key))
    }

    /// Deep equality where NaN equals NaN and integers compare numerically
    /// with floats. Mapping comparison honours key order.
    pub fn same_value(&self, other: &RawValue) -> bool {
        match (self, other) {
            (RawValue::Undefined, RawValue::Undefined) | (RawValue::Null, RawValue::Null) => true,
            (RawValue::Bool(a), RawValue::Bool(b)) => a == b,
            (RawValue::Str(a), RawValue::Str(b)) => a == b,
            (RawValue::Integer(a), RawValue::Integer(b)) => a == b,
            (RawValue::Float(a), RawValue::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (RawValue::Integer(i), RawValue::Float(f)) | (RawValue::Float(f), RawValue::Integer(i)) => {
                *i as f64 == *f
            }
            (RawValue::Sequence(a), RawValue::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_value(y))
            }
            (RawValue::Record(a), RawValue::Record(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_value(vb))
            }
            _ => false,
        }
    }

    /// Converts to JSON the way `JSON.stringify` would: undefined mapping
    /// entries are dropped, undefined sequence elements and non-finite floats
    /// become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            RawValue::Undefined | RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Integer(i) => Value::Number((*i).into()),
            RawValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            RawValue::Str(s) => Value::String(s.clone()),
            RawValue::Sequence(items) => Value::Array(items.iter().map(RawValue::to_json).collect()),
            RawValue::Record(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    if !value.is_undefined() {
                        out.insert(key.clone(), value.to_json());
                    }
                }
                Value::Object(out)
            }
        }
    }
}

impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Integer(i),
                None => n.as_f64().map_or(RawValue::Null, RawValue::Float),
            },
            Value::String(s) => RawValue::Str(s),
            Value::Array(items) => RawValue::Sequence(items.into_iter().map(RawValue::from).collect()),
            Value::Object(map) => RawValue::Record(
                map.into_iter()
                    .map(|(k, v)| (k, RawValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for RawValue {
    fn from(v: &Value) -> Self {
        RawValue::from(v.clone())
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Integer(i)
    }
}

impl From<i32> for RawValue {
    fn from(i: i32) -> Self {
        RawValue::Integer(i64::from(i))
    }
}

impl From<f64> for RawValue {
    fn from(f: f64) -> Self {
        RawValue::Float(f)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Str(s.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Str(s)
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(items: Vec<RawValue>) -> Self {
        RawValue::Sequence(items)
    }
}

impl From<IndexMap<String, RawValue>> for RawValue {
    fn from(map: IndexMap<String, RawValue>) -> Self {
        RawValue::Record(map)
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawValue::Undefined | RawValue::Null => serializer.serialize_unit(),
            RawValue::Bool(b) => serializer.serialize_bool(*b),
            RawValue::Integer(i) => serializer.serialize_i64(*i),
            RawValue::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            RawValue::Float(_) => serializer.serialize_unit(),
            RawValue::Str(s) => serializer.serialize_str(s),
            RawValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            RawValue::Record(entries) => {
                let defined = entries.values().filter(|v| !v.is_undefined()).count();
                let mut map = serializer.serialize_map(Some(defined))?;
                for (key, value) in entries {
                    if !value.is_undefined() {
                        map.serialize_entry(key, value)?;
                    }
                }
                map.end()
            }
        }
    }
}
