//! Record Store
//!
//! In-memory forest of records with ordered children. Records are addressed by
//! id; parent/child structure is held by ownership, never by back-pointers.

pub mod forest;
pub mod search;

pub use forest::Forest;

use crate::error::StoreError;
use crate::types::{FieldPatch, Fields, RecordId};
use serde::{Deserialize, Serialize};

/// Record: one node of the forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
    #[serde(default)]
    pub children: Vec<Record>,
}

impl Record {
    /// Create a childless record
    pub fn new(id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
            children: Vec::new(),
        }
    }

    /// Builder-style child attachment, mostly useful for seeding
    pub fn with_child(mut self, child: Record) -> Self {
        self.children.push(child);
        self
    }

    /// Number of records in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Record::subtree_len).sum::<usize>()
    }
}

/// Where a record sits: its owner (`None` for the root sequence) and index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub parent_id: Option<RecordId>,
    pub index: usize,
}

/// A subtree detached by [`RecordStore::delete`], kept so it can be restored
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub location: Location,
    pub record: Record,
}

/// Record store interface
///
/// `find` is total: an empty or unknown id yields `None`. Mutations that
/// cannot resolve their target return a [`StoreError`] and change nothing.
pub trait RecordStore {
    fn roots(&self) -> &[Record];
    fn find(&self, id: &str) -> Option<&Record>;
    fn create(&mut self, fields: Fields, parent_id: Option<&str>) -> Result<RecordId, StoreError>;
    /// Merge `fields` onto the record; returns the prior value of every key
    /// the merge set (`None` where the key was absent).
    fn update(&mut self, id: &str, fields: Fields) -> Result<FieldPatch, StoreError>;
    fn delete(&mut self, id: &str) -> Result<Removed, StoreError>;
    /// Set or remove the listed keys, leaving every other field alone.
    fn patch_fields(&mut self, id: &str, patch: FieldPatch) -> Result<(), StoreError>;
    /// Re-insert a previously removed subtree at its recorded location.
    fn restore(&mut self, removed: Removed) -> Result<(), StoreError>;
}
