pub mod column;
pub mod command;
pub mod data_type;
pub mod engine;
pub mod error;
pub mod index;
pub mod parser;
pub mod shared;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use column::Column;
pub use command::{Command, CreateTable, Delete, Insert, JoinSpec, Select, Update, WhereClause};
pub use data_type::DataType;
pub use engine::{Engine, QueryResult};
pub use error::{Error, ExecutionError, LexError, Result, SchemaError, SyntaxError};
pub use index::PkIndex;
pub use parser::parse;
pub use shared::SharedEngine;
pub use table::{Row, RowId, Table};
pub use tokenizer::{Token, TokenKind, tokenize};
pub use value::Value;
