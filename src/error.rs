use thiserror::Error;

use crate::tokenizer::TokenKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure surfaced by the query pipeline.
///
/// Each stage has its own error type; this enum only groups them so callers
/// running a whole statement can use a single `?`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Raised by the tokenizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("illegal character {ch:?} at offset {position}")]
    IllegalCharacter { ch: char, position: usize },
}

/// Raised by the parser when the token stream does not fit the grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },

    #[error("{0} cannot start a statement")]
    UnknownStatement(TokenKind),

    #[error("expected {expected}, found {found:?}")]
    ExpectedWord { expected: &'static str, found: String },

    #[error("expected a literal, found {0}")]
    ExpectedLiteral(TokenKind),

    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),

    #[error("JOIN table mismatch: expected {expected}, got {found}")]
    JoinTableMismatch { expected: String, found: String },

    #[error("{columns} column(s) but {values} value(s)")]
    ValueCountMismatch { columns: usize, values: usize },

    #[error("unexpected {0} after end of statement")]
    TrailingInput(TokenKind),
}

/// Raised when a table definition is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table {0} already exists")]
    DuplicateTable(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("primary key required")]
    MissingPrimaryKey,

    #[error("multiple primary keys not allowed")]
    MultiplePrimaryKeys,

    #[error("unknown data type: {0}")]
    UnknownDataType(String),
}

/// Raised while running a well-formed command against the stored tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("table {0} does not exist")]
    TableNotFound(String),

    #[error("column {column} does not exist in table {table}")]
    ColumnNotFound { column: String, table: String },

    #[error("primary key {0} missing")]
    PrimaryKeyMissing(String),

    #[error("duplicate primary key {0}")]
    DuplicateKey(String),

    #[error("cannot update primary key {0}")]
    PrimaryKeyUpdate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_errors_convert_into_error() {
        let err: Error = LexError::IllegalCharacter {
            ch: '#',
            position: 3,
        }
        .into();
        assert!(matches!(err, Error::Lex(_)));

        let err: Error = ExecutionError::TableNotFound("users".into()).into();
        assert_eq!(err.to_string(), "execution error: table users does not exist");
    }

    #[test]
    fn test_syntax_error_message_names_both_kinds() {
        let err = SyntaxError::UnexpectedToken {
            expected: TokenKind::From,
            found: TokenKind::Where,
        };
        assert_eq!(err.to_string(), "expected FROM, found WHERE");
    }
}
