//! In-memory forest implementation of [`RecordStore`].

use super::search;
use super::{Location, Record, RecordStore, Removed};
use crate::error::StoreError;
use crate::types::{FieldPatch, Fields, RecordId};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Owned forest of records
///
/// Besides the records themselves the forest remembers the highest ordinal
/// it has issued under every owner, so ids freed by a delete are not handed
/// out again.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    roots: Vec<Record>,
    root_issued: u64,
    child_issued: HashMap<RecordId, u64>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from existing records, rejecting empty or duplicate ids
    pub fn from_records(roots: Vec<Record>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for id in search::ids(&roots) {
            if id.is_empty() {
                return Err(StoreError::Seed("record with empty id".to_string()));
            }
            if !seen.insert(id.clone()) {
                return Err(StoreError::Seed(format!("duplicate id '{}'", id)));
            }
        }
        let mut forest = Self {
            roots,
            ..Self::default()
        };
        forest.root_issued = highest_ordinal(&forest.roots);
        let mut stack: Vec<&Record> = forest.roots.iter().collect();
        while let Some(record) = stack.pop() {
            if !record.children.is_empty() {
                forest
                    .child_issued
                    .insert(record.id.clone(), highest_ordinal(&record.children));
            }
            stack.extend(record.children.iter());
        }
        Ok(forest)
    }

    /// Parse a JSON array of records
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let roots: Vec<Record> =
            serde_json::from_str(json).map_err(|e| StoreError::Seed(e.to_string()))?;
        Self::from_records(roots)
    }

    pub fn into_records(self) -> Vec<Record> {
        self.roots
    }

    /// Total number of records at every depth
    pub fn len(&self) -> usize {
        self.roots.iter().map(Record::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pick the next free id under `owner`, given its current child count
    fn allocate(&mut self, owner: Option<&str>, count: usize) -> RecordId {
        let issued = match owner {
            None => self.root_issued,
            Some(parent) => self.child_issued.get(parent).copied().unwrap_or(0),
        };
        let mut ordinal = (count as u64).max(issued) + 1;
        let mut id = compose_id(owner, ordinal);
        while search::find(&self.roots, &id).is_some() {
            ordinal += 1;
            id = compose_id(owner, ordinal);
        }
        match owner {
            None => self.root_issued = ordinal,
            Some(parent) => {
                self.child_issued.insert(parent.to_string(), ordinal);
            }
        }
        id
    }

    fn siblings_mut(&mut self, parent_id: Option<&str>) -> Result<&mut Vec<Record>, StoreError> {
        match parent_id {
            None => Ok(&mut self.roots),
            Some(parent) => search::find_mut(&mut self.roots, parent)
                .map(|record| &mut record.children)
                .ok_or_else(|| StoreError::ParentNotFound(parent.to_string())),
        }
    }
}

/// Highest numeric last id segment among `siblings`; non-numeric ids count as 0
fn highest_ordinal(siblings: &[Record]) -> u64 {
    siblings
        .iter()
        .filter_map(|r| r.id.rsplit('.').next()?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

fn compose_id(owner: Option<&str>, ordinal: u64) -> RecordId {
    match owner {
        None => ordinal.to_string(),
        Some(parent) => format!("{}.{}", parent, ordinal),
    }
}

impl RecordStore for Forest {
    fn roots(&self) -> &[Record] {
        &self.roots
    }

    fn find(&self, id: &str) -> Option<&Record> {
        search::find(&self.roots, id)
    }

    fn create(&mut self, fields: Fields, parent_id: Option<&str>) -> Result<RecordId, StoreError> {
        let parent_id = parent_id.filter(|p| !p.is_empty());
        let count = match parent_id {
            None => self.roots.len(),
            Some(parent) => search::find(&self.roots, parent)
                .ok_or_else(|| StoreError::ParentNotFound(parent.to_string()))?
                .children
                .len(),
        };
        let id = self.allocate(parent_id, count);
        self.siblings_mut(parent_id)?
            .push(Record::new(id.clone(), fields));
        trace!(record_id = %id, parent_id = ?parent_id, "Created record");
        Ok(id)
    }

    fn update(&mut self, id: &str, fields: Fields) -> Result<FieldPatch, StoreError> {
        let record = search::find_mut(&mut self.roots, id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;
        let mut prior = FieldPatch::new();
        for (key, value) in fields {
            prior.insert(key.clone(), record.fields.insert(key, value));
        }
        trace!(record_id = %id, keys = prior.len(), "Updated record");
        Ok(prior)
    }

    fn delete(&mut self, id: &str) -> Result<Removed, StoreError> {
        let location = search::locate(&self.roots, id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;
        let siblings = self.siblings_mut(location.parent_id.as_deref())?;
        let record = siblings.remove(location.index);
        trace!(
            record_id = %id,
            parent_id = ?location.parent_id,
            removed = record.subtree_len(),
            "Deleted record"
        );
        Ok(Removed { location, record })
    }

    fn patch_fields(&mut self, id: &str, patch: FieldPatch) -> Result<(), StoreError> {
        let record = search::find_mut(&mut self.roots, id)
            .ok_or_else(|| StoreError::RecordNotFound(id.to_string()))?;
        for (key, value) in patch {
            match value {
                Some(value) => record.fields.insert(key, value),
                None => record.fields.remove(&key),
            };
        }
        Ok(())
    }

    fn restore(&mut self, removed: Removed) -> Result<(), StoreError> {
        let Removed {
            location: Location { parent_id, index },
            record,
        } = removed;
        let siblings = self.siblings_mut(parent_id.as_deref())?;
        let index = index.min(siblings.len());
        siblings.insert(index, record);
        Ok(())
    }
}
