use crate::column::Column;
use crate::table::Row;
use crate::value::Value;

/// A parsed statement, ready for the [Engine](crate::Engine).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable(CreateTable),
    Insert(Insert),
    Select(Select),
    Update(Update),
    Delete(Delete),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    /// Column name to value, paired positionally from the statement.
    pub values: Row,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    /// Projected columns; empty means every column.
    pub columns: Vec<String>,
    pub join: Option<JoinSpec>,
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Row,
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub where_clause: Option<WhereClause>,
}

/// `JOIN right_table ON left_table.left_column = right_table.right_column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
}

/// A single `column = value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub column: String,
    pub value: Value,
}

impl WhereClause {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// True if `row` holds exactly [WhereClause::value] under [WhereClause::column].
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}
