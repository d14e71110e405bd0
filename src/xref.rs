//! Cross-reference table and revision trailers.
//!
//! A document carries one cross-reference table spanning all incremental
//! revisions. Each revision contributes a trailer dictionary; the table keeps
//! them in file order so the trailer consistency checks can reach the first
//! and last revision directly.

use crate::object::{Dictionary, ObjectRef};
use std::collections::HashMap;

/// Cross-reference table mapping object references to byte offsets, plus the
/// trailer dictionary of every revision in file order.
#[derive(Debug, Clone, Default)]
pub struct XrefTable {
    offsets: HashMap<ObjectRef, u64>,
    revisions: Vec<Dictionary>,
}

impl XrefTable {
    /// Create an empty cross-reference table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the byte offset of an indirect object.
    pub fn insert_offset(&mut self, obj_ref: ObjectRef, offset: u64) {
        self.offsets.insert(obj_ref, offset);
    }

    /// Byte offset of an indirect object, if known.
    pub fn offset(&self, obj_ref: ObjectRef) -> Option<u64> {
        self.offsets.get(&obj_ref).copied()
    }

    /// Number of objects known to the table.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Append the trailer dictionary of the next revision (file order).
    pub fn push_revision(&mut self, trailer: Dictionary) {
        self.revisions.push(trailer);
    }

    /// Trailer of the first revision written to the file.
    pub fn first_trailer(&self) -> Option<&Dictionary> {
        self.revisions.first()
    }

    /// Trailer of the last (current) revision.
    pub fn last_trailer(&self) -> Option<&Dictionary> {
        self.revisions.last()
    }

    /// Number of revisions recorded.
    pub fn revision_count(&self) -> usize {
        self.revisions.len()
    }
}
