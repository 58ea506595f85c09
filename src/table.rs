use std::collections::HashMap;

use allocative::Allocative;

use crate::column::Column;
use crate::error::{ExecutionError, SchemaError};
use crate::index::PkIndex;
use crate::value::Value;

/// A stored row: column name to value. Columns left out at insert time are
/// absent from the map.
pub type Row = HashMap<String, Value>;

/// Physical slot of a row inside its table.
///
/// Assigned from a per-table counter at insert time and never handed out
/// twice, except after [Table::truncate] resets the counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Allocative)]
pub struct RowId(pub u64);

impl RowId {
    fn next(self) -> Self {
        RowId(self.0 + 1)
    }
}

/// A named table owning its schema, its rows and its primary-key index.
///
/// Every method that changes the row map updates the index in the same call,
/// so the set of `(key, RowId)` pairs in the index always matches the
/// primary-key values found in the rows.
#[derive(Debug, Allocative)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    column_map: HashMap<String, usize>,
    rows: HashMap<RowId, Row>,
    next_row_id: RowId,
    primary_key: String,
    pk_index: Option<PkIndex>,
}

impl Table {
    /// Builds an empty table.
    ///
    /// # Errors
    /// - [SchemaError::DuplicateColumn] if two columns share a name.
    /// - [SchemaError::MultiplePrimaryKeys] if more than one column is primary.
    /// - [SchemaError::MissingPrimaryKey] if no column is primary.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, SchemaError> {
        let mut column_map = HashMap::with_capacity(columns.len());
        let mut primary_key: Option<&str> = None;

        for (position, column) in columns.iter().enumerate() {
            if column_map.insert(column.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }
            if column.primary_key {
                if primary_key.is_some() {
                    return Err(SchemaError::MultiplePrimaryKeys);
                }
                primary_key = Some(&column.name);
            }
        }

        let primary_key = primary_key
            .ok_or(SchemaError::MissingPrimaryKey)?
            .to_string();

        Ok(Self {
            name: name.into(),
            columns,
            column_map,
            rows: HashMap::new(),
            next_row_id: RowId::default(),
            primary_key,
            pk_index: Some(PkIndex::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_map.get(name).map(|&i| &self.columns[i])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_map.contains_key(name)
    }

    /// Name of the primary-key column.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn pk_index(&self) -> Option<&PkIndex> {
        self.pk_index.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The id the next inserted row will receive.
    pub fn next_row_id(&self) -> RowId {
        self.next_row_id
    }

    pub fn get(&self, row_id: RowId) -> Option<&Row> {
        self.rows.get(&row_id)
    }

    /// All stored rows, in no particular order.
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(row_id, row)| (*row_id, row))
    }

    /// Looks a primary-key value up in the index.
    ///
    /// Returns `None` when the table has no index; the caller must then fall
    /// back to a scan.
    pub fn lookup_pk(&self, key: &Value) -> Option<Option<RowId>> {
        self.pk_index.as_ref().map(|index| index.get(key))
    }

    /// Bytes allocated on the heap by this table (rows, index and schema).
    pub fn heap_size(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }

    fn check_column(&self, column: &str) -> Result<(), ExecutionError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ExecutionError::ColumnNotFound {
                column: column.to_string(),
                table: self.name.clone(),
            })
        }
    }

    /// Stores a new row and indexes its primary-key value.
    ///
    /// Nothing is stored and the RowId counter does not move when an error is
    /// returned.
    ///
    /// # Errors
    /// - [ExecutionError::ColumnNotFound] for a column outside the schema.
    /// - [ExecutionError::PrimaryKeyMissing] if the row has no primary-key value.
    /// - [ExecutionError::DuplicateKey] if the primary-key value is already indexed.
    pub fn insert(&mut self, row: Row) -> Result<RowId, ExecutionError> {
        for column in row.keys() {
            self.check_column(column)?;
        }

        let key = row
            .get(&self.primary_key)
            .ok_or_else(|| ExecutionError::PrimaryKeyMissing(self.primary_key.clone()))?;

        let row_id = self.next_row_id;
        // Index first: a duplicate key must leave the row map untouched.
        if let Some(index) = self.pk_index.as_mut() {
            index.insert(key.clone(), row_id)?;
        }
        self.rows.insert(row_id, row);
        self.next_row_id = row_id.next();

        Ok(row_id)
    }

    /// Applies `assignments` to every row in `row_ids`, returning how many rows
    /// were found and changed.
    ///
    /// # Errors
    /// - [ExecutionError::PrimaryKeyUpdate] if an assignment targets the primary key.
    /// - [ExecutionError::ColumnNotFound] for a column outside the schema.
    ///
    /// Validation happens before any row is touched.
    pub fn update(&mut self, row_ids: &[RowId], assignments: &Row) -> Result<usize, ExecutionError> {
        if assignments.contains_key(&self.primary_key) {
            return Err(ExecutionError::PrimaryKeyUpdate(self.primary_key.clone()));
        }
        for column in assignments.keys() {
            self.check_column(column)?;
        }

        let mut updated = 0;
        for row_id in row_ids {
            if let Some(row) = self.rows.get_mut(row_id) {
                for (column, value) in assignments {
                    row.insert(column.clone(), value.clone());
                }
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Removes one row and its index entry.
    pub fn delete(&mut self, row_id: RowId) -> Option<Row> {
        let row = self.rows.remove(&row_id)?;
        if let (Some(index), Some(key)) = (self.pk_index.as_mut(), row.get(&self.primary_key)) {
            index.remove(key);
        }
        Some(row)
    }

    /// Removes every row, resets the RowId counter and starts a fresh index.
    /// Returns the number of rows removed.
    pub fn truncate(&mut self) -> usize {
        let removed = self.rows.len();
        self.rows.clear();
        self.next_row_id = RowId::default();
        self.pk_index = Some(PkIndex::new());
        removed
    }
}
