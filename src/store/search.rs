//! Depth-first search over a forest
//!
//! Pre-order traversal: each root is checked before its children, children are
//! visited in stored order, and the first match wins. An empty target never
//! matches, which is how "no parent" is expressed by callers.

use super::{Location, Record};
use crate::types::RecordId;

/// Find the record with `id`
pub fn find<'a>(roots: &'a [Record], id: &str) -> Option<&'a Record> {
    if id.is_empty() {
        return None;
    }
    find_in(roots, id)
}

fn find_in<'a>(records: &'a [Record], id: &str) -> Option<&'a Record> {
    for record in records {
        if record.id == id {
            return Some(record);
        }
        if let Some(found) = find_in(&record.children, id) {
            return Some(found);
        }
    }
    None
}

/// Mutable counterpart of [`find`]
pub fn find_mut<'a>(roots: &'a mut [Record], id: &str) -> Option<&'a mut Record> {
    if id.is_empty() {
        return None;
    }
    find_in_mut(roots, id)
}

fn find_in_mut<'a>(records: &'a mut [Record], id: &str) -> Option<&'a mut Record> {
    for record in records.iter_mut() {
        if record.id == id {
            return Some(record);
        }
        if let found @ Some(_) = find_in_mut(&mut record.children, id) {
            return found;
        }
    }
    None
}

/// Find the record whose children contain `id`. Roots have no parent.
pub fn find_parent<'a>(roots: &'a [Record], id: &str) -> Option<&'a Record> {
    if id.is_empty() {
        return None;
    }
    for record in roots {
        if record.children.iter().any(|child| child.id == id) {
            return Some(record);
        }
        if let Some(found) = find_parent(&record.children, id) {
            return Some(found);
        }
    }
    None
}

/// Resolve the owner and index of `id`
///
/// The parent lookup runs first; a record with no resolvable parent is
/// looked up in the root sequence.
pub fn locate(roots: &[Record], id: &str) -> Option<Location> {
    if id.is_empty() {
        return None;
    }
    if let Some(parent) = find_parent(roots, id) {
        let index = parent.children.iter().position(|child| child.id == id)?;
        return Some(Location {
            parent_id: Some(parent.id.clone()),
            index,
        });
    }
    roots
        .iter()
        .position(|record| record.id == id)
        .map(|index| Location {
            parent_id: None,
            index,
        })
}

/// All ids in traversal order
pub fn ids(roots: &[Record]) -> Vec<RecordId> {
    let mut out = Vec::new();
    let mut stack: Vec<&Record> = roots.iter().rev().collect();
    while let Some(record) = stack.pop() {
        out.push(record.id.clone());
        stack.extend(record.children.iter().rev());
    }
    out
}
