use std::fmt;
use std::str::FromStr;

use allocative::Allocative;

use crate::error::SchemaError;

/// Represents the supported data types in the database schema.
///
/// The declared type is informational only: inserted values are not checked
/// against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Allocative)]
pub enum DataType {
    /// A 64-bit signed integer.
    Int,
    /// A variable-length UTF-8 character string.
    Text,
}

impl FromStr for DataType {
    type Err = SchemaError;

    /// Resolves a type name (case-insensitive) from the fixed type table.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_uppercase().as_str() {
            "INT" => Ok(DataType::Int),
            "TEXT" => Ok(DataType::Text),
            _ => Err(SchemaError::UnknownDataType(name.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => f.write_str("INT"),
            DataType::Text => f.write_str("TEXT"),
        }
    }
}
