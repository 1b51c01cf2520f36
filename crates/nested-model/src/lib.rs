//! nested-model — observable record/sequence trees materialized from plain
//! nested data.
//!
//! - [`materialize`] / [`Materializer`]: plain data + optional schema →
//!   container tree, optionally bubbling child events to parents.
//! - [`attach_bubble`]: the child-to-parent event relay used while building.
//! - [`to_plain`] / [`to_json`]: container tree → plain data.
//!
//! ```
//! use nested_model::{materialize, RawValue};
//! use serde_json::json;
//!
//! let raw = RawValue::from(json!({"name": "Name", "addresses": [{"street": "street 1"}]}));
//! let root = materialize(Some(&raw), None, true).unwrap();
//! let record = root.as_record().unwrap();
//!
//! let address = record
//!     .get("addresses")
//!     .and_then(|a| a.as_sequence().and_then(|s| s.get(0)))
//!     .and_then(|a| a.into_record())
//!     .unwrap();
//! address.set("street", "new street");
//!
//! assert_eq!(
//!     nested_model::to_json(&root),
//!     json!({"name": "Name", "addresses": [{"street": "new street"}]})
//! );
//! ```

pub mod bridge;
pub mod error;
pub mod events;
pub mod materialize;
pub mod node;
pub mod raw;
pub mod schema;
pub mod serialize;

pub use bridge::attach_bubble;
pub use error::{NestedModelError, Result};
pub use events::{Emitter, Event, ListenerId};
pub use materialize::{materialize, MaterializeOptions, Materializer};
pub use node::{Node, RecordNode, SequenceNode};
pub use raw::RawValue;
pub use schema::{
    RecordClass, RecordFactory, RecordType, SchemaNode, SequenceClass, SequenceFactory, SequenceType,
    DEFAULT_RECORD_TYPE, DEFAULT_SEQUENCE_TYPE,
};
pub use serialize::{to_json, to_plain};
