//! Core types for the hierarchical record store.

use serde_json::Value;
use std::collections::BTreeMap;

/// RecordId: dotted path-like identifier (`"2"`, `"2.1"`, `"2.1.3"`)
pub type RecordId = String;

/// Fields: open set of named scalar values carried by a record
pub type Fields = BTreeMap<String, Value>;

/// FieldPatch: per-key values to put back; `None` removes the key
pub type FieldPatch = BTreeMap<String, Option<Value>>;
