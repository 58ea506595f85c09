use allocative::Allocative;

use crate::data_type::DataType;

/// A schema attribute of a table.
#[derive(Debug, Clone, PartialEq, Eq, Allocative)]
pub struct Column {
    /// The name of the column, unique within its table.
    pub name: String,
    /// The declared data type of the column.
    pub data_type: DataType,
    /// Whether this column is the table's primary key.
    pub primary_key: bool,
    /// Reserved for unique constraints. Never enforced.
    pub unique: bool,
}

impl Column {
    /// Creates a plain (non-key) column.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
        }
    }

    /// Creates a column flagged as the primary key.
    pub fn primary(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            primary_key: true,
            ..Self::new(name, data_type)
        }
    }
}
