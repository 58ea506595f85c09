use std::collections::HashMap;

use allocative::Allocative;

use crate::error::ExecutionError;
use crate::table::RowId;
use crate::value::Value;

/// Maps primary-key values to the [RowId] of the row holding them.
///
/// Only [Table](crate::Table) mutates an index, always in lockstep with its
/// row map.
#[derive(Debug, Clone, Default, Allocative)]
pub struct PkIndex {
    entries: HashMap<Value, RowId>,
}

impl PkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` for `row_id`.
    ///
    /// # Errors
    /// Returns [ExecutionError::DuplicateKey] if `key` is already indexed; the
    /// index is left unchanged in that case.
    pub(crate) fn insert(&mut self, key: Value, row_id: RowId) -> Result<(), ExecutionError> {
        if self.entries.contains_key(&key) {
            return Err(ExecutionError::DuplicateKey(key.to_string()));
        }
        self.entries.insert(key, row_id);
        Ok(())
    }

    pub fn get(&self, key: &Value) -> Option<RowId> {
        self.entries.get(key).copied()
    }

    pub(crate) fn remove(&mut self, key: &Value) -> Option<RowId> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, RowId)> {
        self.entries.iter().map(|(key, row_id)| (key, *row_id))
    }
}
