use crate::{
    command::{Command, CreateTable, Delete, Insert, JoinSpec, Select, Update, WhereClause},
    error::{Error, ExecutionError, Result, SchemaError},
    parser::parse,
    table::{Row, RowId, Table},
    tokenizer::tokenize,
};
use std::collections::HashMap;

/// The main entry point for the in-memory database engine.
/// It owns every table and is the only place commands are executed.
#[derive(Debug, Default)]
pub struct Engine {
    /// A map of table names to their respective [Table] structures.
    tables: HashMap<String, Table>,
}

/// Outcome of [Engine::execute].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Result column names, in display order. Empty for mutations.
    pub columns: Vec<String>,
    /// Rows produced by a `SELECT`, in no particular order.
    pub rows: Vec<Row>,
    /// Rows inserted, updated or deleted.
    pub affected: usize,
}

impl QueryResult {
    fn affected(affected: usize) -> Self {
        Self {
            affected,
            ..Self::default()
        }
    }
}

impl Engine {
    /// Creates a new, empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a reference to a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Returns the names of all tables, in no particular order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    fn get_table(&self, name: &str) -> std::result::Result<&Table, ExecutionError> {
        self.tables
            .get(name)
            .ok_or_else(|| ExecutionError::TableNotFound(name.to_string()))
    }

    fn get_table_mut(&mut self, name: &str) -> std::result::Result<&mut Table, ExecutionError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| ExecutionError::TableNotFound(name.to_string()))
    }

    /// Tokenizes, parses and runs one statement.
    ///
    /// # Errors
    /// Returns the first error raised by any stage. A failed statement leaves
    /// the stored data unchanged.
    ///
    /// # Example
    /// ```
    /// use minidb::{Engine, Value};
    /// let mut db = Engine::new();
    /// db.execute("CREATE TABLE t (id INT PRIMARY KEY, v TEXT)").unwrap();
    /// db.execute("INSERT INTO t (id, v) VALUES (1, 'a')").unwrap();
    ///
    /// let result = db.execute("SELECT * FROM t WHERE id = 1").unwrap();
    /// assert_eq!(result.rows.len(), 1);
    /// assert_eq!(result.rows[0]["v"], Value::from("a"));
    ///
    /// assert_eq!(db.execute("DELETE FROM t WHERE id = 1").unwrap().affected, 1);
    /// ```
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        let result = tokenize(sql)
            .map_err(Error::from)
            .and_then(parse)
            .and_then(|command| self.run(command));

        if let Err(err) = &result {
            tracing::warn!(%err, sql, "statement rejected");
        }
        result
    }

    /// Runs an already parsed command.
    pub fn run(&mut self, command: Command) -> Result<QueryResult> {
        match command {
            Command::CreateTable(create) => {
                self.create_table(create)?;
                Ok(QueryResult::default())
            }
            Command::Insert(insert) => self.insert(insert).map(QueryResult::affected),
            Command::Select(select) => self.query(&select),
            Command::Update(update) => self.update(update).map(QueryResult::affected),
            Command::Delete(delete) => self.delete(delete).map(QueryResult::affected),
        }
    }

    /// Creates a new table.
    ///
    /// # Errors
    /// Returns [SchemaError::DuplicateTable] if the name is taken, or the
    /// schema error raised by [Table::new].
    pub fn create_table(&mut self, create: CreateTable) -> Result<()> {
        if self.tables.contains_key(&create.name) {
            return Err(SchemaError::DuplicateTable(create.name).into());
        }
        let table = Table::new(create.name.clone(), create.columns)?;
        tracing::debug!(table = %create.name, columns = table.columns().len(), "table created");
        self.tables.insert(create.name, table);
        Ok(())
    }

    /// Inserts one row and returns the number of rows stored (always 1).
    pub fn insert(&mut self, insert: Insert) -> Result<usize> {
        let table = self.get_table_mut(&insert.table)?;
        let row_id = table.insert(insert.values)?;
        tracing::debug!(table = %insert.table, row_id = row_id.0, "row inserted");
        Ok(1)
    }

    /// Returns the rows selected by `select`, projected or joined.
    pub fn select(&self, select: &Select) -> Result<Vec<Row>> {
        self.query(select).map(|result| result.rows)
    }

    /// Executes a `SELECT`, returning its rows together with the result
    /// column names.
    ///
    /// # Errors
    /// - [ExecutionError::TableNotFound] if the table does not exist.
    /// - [ExecutionError::ColumnNotFound] if a projected column is not in the schema.
    pub fn query(&self, select: &Select) -> Result<QueryResult> {
        let table = self.get_table(&select.table)?;

        if let Some(join) = &select.join {
            return self.query_join(select, join);
        }

        for column in &select.columns {
            if !table.has_column(column) {
                return Err(column_not_found(column, table.name()).into());
            }
        }

        // Resolve which columns need to be projected
        let columns = if select.columns.is_empty() {
            table.columns().iter().map(|c| c.name.clone()).collect()
        } else {
            select.columns.clone()
        };

        let rows = matching_row_ids(table, select.where_clause.as_ref())
            .into_iter()
            .filter_map(|row_id| table.get(row_id))
            .map(|row| {
                if select.columns.is_empty() {
                    row.clone()
                } else {
                    project(row, &columns)
                }
            })
            .collect();

        Ok(QueryResult {
            columns,
            rows,
            affected: 0,
        })
    }

    /// Runs a `SELECT ... JOIN`. Unqualified projection and predicate columns
    /// are looked up in the left table first, then in the right one.
    fn query_join(&self, select: &Select, join: &JoinSpec) -> Result<QueryResult> {
        let left = self.get_table(&join.left_table)?;
        let right = self.get_table(&join.right_table)?;

        let resolve = |column: &str| -> std::result::Result<String, ExecutionError> {
            [left, right]
                .into_iter()
                .find(|table| table.has_column(column))
                .map(|table| qualify(table.name(), column))
                .ok_or_else(|| column_not_found(column, &select.table))
        };

        let columns: Vec<String> = if select.columns.is_empty() {
            [left, right]
                .into_iter()
                .flat_map(|table| {
                    table
                        .columns()
                        .iter()
                        .map(move |c| qualify(table.name(), &c.name))
                })
                .collect()
        } else {
            select
                .columns
                .iter()
                .map(|c| resolve(c.as_str()))
                .collect::<std::result::Result<_, _>>()?
        };

        let predicate = select
            .where_clause
            .as_ref()
            .map(|p| resolve(p.column.as_str()).map(|key| WhereClause::new(key, p.value.clone())))
            .transpose()?;

        let rows = self
            .join(join)?
            .into_iter()
            .filter(|row| predicate.as_ref().is_none_or(|p| p.matches(row)))
            .map(|row| {
                if select.columns.is_empty() {
                    row
                } else {
                    project(&row, &columns)
                }
            })
            .collect();

        Ok(QueryResult {
            columns,
            rows,
            affected: 0,
        })
    }

    /// Nested-loop equality join. Every emitted row carries the columns of
    /// both sides under `table.column` keys. No index is used.
    ///
    /// # Errors
    /// - [ExecutionError::TableNotFound] if either table does not exist.
    /// - [ExecutionError::ColumnNotFound] if a join column is not in its table.
    pub fn join(&self, join: &JoinSpec) -> Result<Vec<Row>> {
        let left = self.get_table(&join.left_table)?;
        let right = self.get_table(&join.right_table)?;
        for (table, column) in [(left, &join.left_column), (right, &join.right_column)] {
            if !table.has_column(column) {
                return Err(column_not_found(column, table.name()).into());
            }
        }

        let mut results = Vec::new();
        for (_, left_row) in left.rows() {
            // A row without a value for the join column never matches.
            let Some(left_value) = left_row.get(&join.left_column) else {
                continue;
            };
            for (_, right_row) in right.rows() {
                if right_row.get(&join.right_column) == Some(left_value) {
                    let mut merged = Row::with_capacity(left_row.len() + right_row.len());
                    for (side, row) in [(left, left_row), (right, right_row)] {
                        for (column, value) in row {
                            merged.insert(qualify(side.name(), column), value.clone());
                        }
                    }
                    results.push(merged);
                }
            }
        }

        tracing::trace!(
            left = %join.left_table,
            right = %join.right_table,
            matched = results.len(),
            "nested loop join"
        );
        Ok(results)
    }

    /// Applies the assignments of an `UPDATE` and returns the number of rows
    /// touched.
    ///
    /// # Errors
    /// - [ExecutionError::TableNotFound] if the table does not exist.
    /// - [ExecutionError::PrimaryKeyUpdate] if the primary key is assigned.
    /// - [ExecutionError::ColumnNotFound] if an assigned column is not in the schema.
    pub fn update(&mut self, update: Update) -> Result<usize> {
        let table = self.get_table_mut(&update.table)?;
        let row_ids = matching_row_ids(table, update.where_clause.as_ref());
        let updated = table.update(&row_ids, &update.assignments)?;
        tracing::debug!(table = %update.table, updated, "rows updated");
        Ok(updated)
    }

    /// Removes the rows matched by a `DELETE` and returns how many were removed.
    ///
    /// Without a predicate the table is truncated: its RowId counter and its
    /// index start over.
    pub fn delete(&mut self, delete: Delete) -> Result<usize> {
        let table = self.get_table_mut(&delete.table)?;

        let deleted = match &delete.where_clause {
            None => table.truncate(),
            Some(predicate) => matching_row_ids(table, Some(predicate))
                .into_iter()
                .filter(|row_id| table.delete(*row_id).is_some())
                .count(),
        };

        tracing::debug!(table = %delete.table, deleted, "rows deleted");
        Ok(deleted)
    }
}

/// Ids of the rows satisfying `where_clause` (all rows when there is none).
///
/// A predicate on the primary key is answered by the index in O(1) and
/// yields at most one id; anything else scans the whole table.
fn matching_row_ids(table: &Table, where_clause: Option<&WhereClause>) -> Vec<RowId> {
    let Some(predicate) = where_clause else {
        return table.rows().map(|(row_id, _)| row_id).collect();
    };

    if predicate.column == table.primary_key() {
        if let Some(hit) = table.lookup_pk(&predicate.value) {
            tracing::trace!(table = table.name(), "primary key fast path");
            return hit.into_iter().collect();
        }
    }

    tracing::trace!(table = table.name(), column = %predicate.column, "full scan");
    table
        .rows()
        .filter(|(_, row)| predicate.matches(row))
        .map(|(row_id, _)| row_id)
        .collect()
}

/// Keeps the listed columns of `row`. Columns the row has no value for are
/// left out.
fn project(row: &Row, columns: &[String]) -> Row {
    columns
        .iter()
        .filter_map(|column| row.get(column).map(|value| (column.clone(), value.clone())))
        .collect()
}

fn qualify(table: &str, column: &str) -> String {
    format!("{table}.{column}")
}

fn column_not_found(column: &str, table: &str) -> ExecutionError {
    ExecutionError::ColumnNotFound {
        column: column.to_string(),
        table: table.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn users_db() -> Engine {
        let mut db = Engine::new();
        db.execute("CREATE TABLE users (id INT PRIMARY KEY, name TEXT, age INT)")
            .unwrap();
        db.execute("INSERT INTO users (id, name, age) VALUES (1, 'Alice', 30)")
            .unwrap();
        db.execute("INSERT INTO users (id, name, age) VALUES (2, 'Bob', 17)")
            .unwrap();
        db.execute("INSERT INTO users (id, name, age) VALUES (3, 'Charlie', 30)")
            .unwrap();
        db
    }

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect()
    }

    /// Sorted values of `column` across `rows`, for order-independent checks.
    fn sorted(rows: &[Row], column: &str) -> Vec<Value> {
        let mut values: Vec<Value> = rows.iter().map(|r| r[column].clone()).collect();
        values.sort_by_key(|v| v.to_string());
        values
    }

    /// The index must mirror exactly the primary-key values found by a scan.
    fn assert_index_consistent(db: &Engine, name: &str) {
        let table = db.table(name).unwrap();
        let mut scanned: Vec<(String, RowId)> = table
            .rows()
            .map(|(row_id, row)| (row[table.primary_key()].to_string(), row_id))
            .collect();
        let mut indexed: Vec<(String, RowId)> = table
            .pk_index()
            .unwrap()
            .iter()
            .map(|(key, row_id)| (key.to_string(), row_id))
            .collect();
        scanned.sort();
        indexed.sort();
        assert_eq!(scanned, indexed);
    }

    #[test]
    fn test_create_table_errors() {
        let mut db = users_db();

        assert_eq!(
            db.execute("CREATE TABLE users (id INT PRIMARY KEY)")
                .unwrap_err(),
            Error::Schema(SchemaError::DuplicateTable("users".into()))
        );
        assert_eq!(
            db.execute("CREATE TABLE t (a INT PRIMARY KEY, a TEXT)")
                .unwrap_err(),
            Error::Schema(SchemaError::DuplicateColumn("a".into()))
        );
        assert_eq!(
            db.execute("CREATE TABLE t (a INT, b TEXT)").unwrap_err(),
            Error::Schema(SchemaError::MissingPrimaryKey)
        );
        assert_eq!(
            db.execute("CREATE TABLE t (a INT PRIMARY KEY, b TEXT PRIMARY KEY)")
                .unwrap_err(),
            Error::Schema(SchemaError::MultiplePrimaryKeys)
        );
        assert!(db.table("t").is_none());
    }

    #[test]
    fn test_table_names() {
        let mut db = users_db();
        db.execute("CREATE TABLE posts (id INT PRIMARY KEY)").unwrap();

        let mut tables = db.table_names();
        tables.sort();

        assert_eq!(tables, vec!["posts", "users"]);
    }

    #[test]
    fn test_round_trip_select_by_primary_key() {
        let db_result = users_db()
            .execute("SELECT * FROM users WHERE id = 2")
            .unwrap();

        assert_eq!(db_result.columns, vec!["id", "name", "age"]);
        assert_eq!(
            db_result.rows,
            vec![row(&[
                ("id", Value::Int(2)),
                ("name", Value::from("Bob")),
                ("age", Value::Int(17)),
            ])]
        );
    }

    #[test]
    fn test_scenario_create_insert_select_delete() {
        let mut db = Engine::new();
        db.execute("CREATE TABLE t (id INT PRIMARY KEY, v TEXT)")
            .unwrap();
        assert_eq!(
            db.execute("INSERT INTO t (id, v) VALUES (1, 'a')")
                .unwrap()
                .affected,
            1
        );

        let result = db.execute("SELECT * FROM t WHERE id = 1").unwrap();
        assert_eq!(
            result.rows,
            vec![row(&[("id", Value::Int(1)), ("v", Value::from("a"))])]
        );
        assert_eq!(result.rows[0]["id"].to_string(), "1");

        assert_eq!(
            db.execute("DELETE FROM t WHERE id = 1").unwrap().affected,
            1
        );
        assert!(db.execute("SELECT * FROM t WHERE id = 1").unwrap().rows.is_empty());
        assert_index_consistent(&db, "t");
    }

    #[test]
    fn test_insert_duplicate_primary_key() {
        let mut db = users_db();

        let err = db
            .execute("INSERT INTO users (id, name) VALUES (1, 'Again')")
            .unwrap_err();

        assert_eq!(
            err,
            Error::Execution(ExecutionError::DuplicateKey("1".into()))
        );
        let table = db.table("users").unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.next_row_id(), RowId(3));
        assert_index_consistent(&db, "users");
    }

    #[test]
    fn test_insert_errors() {
        let mut db = users_db();

        assert_eq!(
            db.execute("INSERT INTO nope (id) VALUES (1)").unwrap_err(),
            Error::Execution(ExecutionError::TableNotFound("nope".into()))
        );
        assert_eq!(
            db.execute("INSERT INTO users (name) VALUES ('x')")
                .unwrap_err(),
            Error::Execution(ExecutionError::PrimaryKeyMissing("id".into()))
        );
        assert!(matches!(
            db.execute("INSERT INTO users (id, email) VALUES (9, 'x')"),
            Err(Error::Execution(ExecutionError::ColumnNotFound { .. }))
        ));
        assert_eq!(db.table("users").unwrap().row_count(), 3);
    }

    #[test]
    fn test_insert_does_not_coerce_values() {
        let mut db = users_db();
        db.execute("INSERT INTO users (id, age) VALUES ('4', 'old')")
            .unwrap();

        let result = db.execute("SELECT age FROM users WHERE id = '4'").unwrap();
        assert_eq!(result.rows, vec![row(&[("age", Value::from("old"))])]);

        // '4' and 4 are different keys
        assert!(db.execute("SELECT * FROM users WHERE id = 4").unwrap().rows.is_empty());
        db.execute("INSERT INTO users (id) VALUES (4)").unwrap();
        assert_index_consistent(&db, "users");
    }

    #[test]
    fn test_select_projection_and_scan() {
        let db = users_db();

        let result = db_query(&db, "SELECT name FROM users WHERE age = 30");
        assert_eq!(result.columns, vec!["name"]);
        assert_eq!(
            sorted(&result.rows, "name"),
            vec![Value::from("Alice"), Value::from("Charlie")]
        );
        assert!(result.rows.iter().all(|r| r.len() == 1));

        let all = db_query(&db, "SELECT * FROM users");
        assert_eq!(all.rows.len(), 3);
    }

    #[test]
    fn test_select_command_directly() {
        let db = users_db();

        let rows = db
            .select(&Select {
                table: "users".into(),
                columns: vec!["name".into()],
                join: None,
                where_clause: Some(WhereClause::new("id", Value::Int(1))),
            })
            .unwrap();

        assert_eq!(rows, vec![row(&[("name", Value::from("Alice"))])]);
    }

    fn db_query(db: &Engine, sql: &str) -> QueryResult {
        let Command::Select(select) = parse(tokenize(sql).unwrap()).unwrap() else {
            panic!("Expected Select");
        };
        db.query(&select).unwrap()
    }

    #[test]
    fn test_select_errors() {
        let mut db = users_db();

        assert_eq!(
            db.execute("SELECT * FROM nope").unwrap_err(),
            Error::Execution(ExecutionError::TableNotFound("nope".into()))
        );
        assert_eq!(
            db.execute("SELECT email FROM users").unwrap_err(),
            Error::Execution(ExecutionError::ColumnNotFound {
                column: "email".into(),
                table: "users".into()
            })
        );
    }

    #[test]
    fn test_select_missing_primary_key_returns_nothing() {
        let mut db = users_db();
        assert!(db.execute("SELECT * FROM users WHERE id = 42").unwrap().rows.is_empty());
        assert!(db.execute("SELECT * FROM users WHERE nope = 1").unwrap().rows.is_empty());
    }

    #[test]
    fn test_select_leaves_out_absent_values() {
        let mut db = users_db();
        db.execute("INSERT INTO users (id) VALUES (9)").unwrap();

        let result = db.execute("SELECT id, name FROM users WHERE id = 9").unwrap();
        assert_eq!(result.rows, vec![row(&[("id", Value::Int(9))])]);
    }

    #[test]
    fn test_update_by_primary_key_keeps_row_indexed() {
        let mut db = users_db();

        let result = db
            .execute("UPDATE users SET name = 'Bobby' WHERE id = 2")
            .unwrap();
        assert_eq!(result.affected, 1);

        let rows = db.execute("SELECT name FROM users WHERE id = 2").unwrap().rows;
        assert_eq!(rows, vec![row(&[("name", Value::from("Bobby"))])]);
        assert_eq!(db.table("users").unwrap().row_count(), 3);
        assert_index_consistent(&db, "users");

        assert_eq!(
            db.execute("UPDATE users SET name = 'x' WHERE id = 99")
                .unwrap()
                .affected,
            0
        );
    }

    #[test]
    fn test_update_by_scan() {
        let mut db = users_db();

        let updated = db
            .execute("UPDATE users SET age = 31 WHERE age = 30")
            .unwrap()
            .affected;
        assert_eq!(updated, 2);

        let rows = db.execute("SELECT id FROM users WHERE age = 31").unwrap().rows;
        assert_eq!(sorted(&rows, "id"), vec![Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn test_update_without_where_touches_every_row() {
        let mut db = users_db();

        assert_eq!(db.execute("UPDATE users SET age = 0").unwrap().affected, 3);
        assert_eq!(
            db.execute("SELECT * FROM users WHERE age = 0").unwrap().rows.len(),
            3
        );
    }

    #[test]
    fn test_update_errors() {
        let mut db = users_db();

        assert_eq!(
            db.execute("UPDATE users SET id = 5 WHERE id = 1").unwrap_err(),
            Error::Execution(ExecutionError::PrimaryKeyUpdate("id".into()))
        );
        assert_eq!(
            db.execute("UPDATE nope SET a = 1").unwrap_err(),
            Error::Execution(ExecutionError::TableNotFound("nope".into()))
        );
        assert!(matches!(
            db.execute("UPDATE users SET email = 'x' WHERE id = 1"),
            Err(Error::Execution(ExecutionError::ColumnNotFound { .. }))
        ));
        assert!(db.execute("SELECT * FROM users WHERE id = 1").unwrap().rows.len() == 1);
    }

    #[test]
    fn test_delete_by_scan_updates_index() {
        let mut db = users_db();

        assert_eq!(
            db.execute("DELETE FROM users WHERE age = 30").unwrap().affected,
            2
        );
        let remaining = db.execute("SELECT * FROM users").unwrap().rows;
        assert_eq!(sorted(&remaining, "id"), vec![Value::Int(2)]);
        assert_index_consistent(&db, "users");

        // keys freed by the delete can be inserted again
        db.execute("INSERT INTO users (id) VALUES (1)").unwrap();
        assert_index_consistent(&db, "users");
    }

    #[test]
    fn test_delete_by_primary_key() {
        let mut db = users_db();

        assert_eq!(db.execute("DELETE FROM users WHERE id = 3").unwrap().affected, 1);
        assert_eq!(db.execute("DELETE FROM users WHERE id = 3").unwrap().affected, 0);
        assert_eq!(db.table("users").unwrap().row_count(), 2);
        assert_index_consistent(&db, "users");
    }

    #[test]
    fn test_delete_all_resets_row_ids() {
        let mut db = users_db();

        assert_eq!(db.execute("DELETE FROM users").unwrap().affected, 3);
        let table = db.table("users").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.next_row_id(), RowId(0));
        assert!(table.pk_index().unwrap().is_empty());

        db.execute("INSERT INTO users (id) VALUES (1)").unwrap();
        let table = db.table("users").unwrap();
        assert_eq!(table.lookup_pk(&Value::Int(1)), Some(Some(RowId(0))));
        assert_index_consistent(&db, "users");
    }

    #[test]
    fn test_delete_without_where_keyword_is_a_predicate() {
        let mut db = users_db();

        assert_eq!(db.execute("DELETE FROM users id = 1").unwrap().affected, 1);
        assert_eq!(db.table("users").unwrap().row_count(), 2);
    }

    #[test]
    fn test_index_consistency_after_mixed_operations() {
        let mut db = Engine::new();
        db.execute("CREATE TABLE t (id INT PRIMARY KEY, v INT)").unwrap();
        for i in 0..20 {
            db.execute(&format!("INSERT INTO t (id, v) VALUES ({i}, {})", i % 3))
                .unwrap();
        }
        db.execute("DELETE FROM t WHERE v = 0").unwrap();
        db.execute("UPDATE t SET v = 7 WHERE id = 5").unwrap();
        db.execute("DELETE FROM t WHERE id = 4").unwrap();
        assert!(db.execute("INSERT INTO t (id) VALUES (1)").is_err());
        db.execute("INSERT INTO t (id, v) VALUES (3, 3)").unwrap();
        db.execute("UPDATE t SET v = 1 WHERE v = 2").unwrap();

        assert_index_consistent(&db, "t");
        assert_eq!(db.table("t").unwrap().next_row_id(), RowId(21));
    }

    fn shop_db() -> Engine {
        let mut db = Engine::new();
        db.execute("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)")
            .unwrap();
        db.execute("CREATE TABLE orders (id INT PRIMARY KEY, user_id INT)")
            .unwrap();
        db.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')")
            .unwrap();
        db.execute("INSERT INTO users (id, name) VALUES (2, 'Bob')")
            .unwrap();
        db.execute("INSERT INTO orders (id, user_id) VALUES (10, 1)")
            .unwrap();
        db
    }

    #[test]
    fn test_join_single_match() {
        let mut db = shop_db();

        let result = db
            .execute("SELECT * FROM users JOIN orders ON users.id = orders.user_id")
            .unwrap();

        assert_eq!(
            result.columns,
            vec!["users.id", "users.name", "orders.id", "orders.user_id"]
        );
        assert_eq!(
            result.rows,
            vec![row(&[
                ("users.id", Value::Int(1)),
                ("users.name", Value::from("Alice")),
                ("orders.id", Value::Int(10)),
                ("orders.user_id", Value::Int(1)),
            ])]
        );
    }

    #[test]
    fn test_join_with_projection_and_where() {
        let mut db = shop_db();
        db.execute("INSERT INTO orders (id, user_id) VALUES (11, 1)")
            .unwrap();
        db.execute("INSERT INTO orders (id, user_id) VALUES (12, 2)")
            .unwrap();

        let result = db
            .execute("SELECT name, user_id FROM users JOIN orders ON users.id = orders.user_id WHERE name = 'Alice'")
            .unwrap();

        assert_eq!(result.columns, vec!["users.name", "orders.user_id"]);
        assert_eq!(result.rows.len(), 2);
        assert!(result.rows.iter().all(|r| r["users.name"] == Value::from("Alice")
            && r["orders.user_id"] == Value::Int(1)
            && r.len() == 2));
    }

    #[test]
    fn test_join_errors() {
        let mut db = shop_db();

        assert_eq!(
            db.execute("SELECT * FROM users JOIN items ON users.id = items.user_id")
                .unwrap_err(),
            Error::Execution(ExecutionError::TableNotFound("items".into()))
        );
        assert!(matches!(
            db.execute("SELECT * FROM users JOIN orders ON users.id = orders.buyer"),
            Err(Error::Execution(ExecutionError::ColumnNotFound { .. }))
        ));
        assert!(matches!(
            db.execute("SELECT total FROM users JOIN orders ON users.id = orders.user_id"),
            Err(Error::Execution(ExecutionError::ColumnNotFound { .. }))
        ));
    }

    #[test]
    fn test_join_skips_rows_without_join_value() {
        let mut db = shop_db();
        db.execute("INSERT INTO orders (id) VALUES (13)").unwrap();

        let rows = db
            .join(&JoinSpec {
                left_table: "users".into(),
                left_column: "id".into(),
                right_table: "orders".into(),
                right_column: "user_id".into(),
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_failed_statements_report_each_stage() {
        let mut db = users_db();

        assert!(matches!(db.execute("SELECT # FROM users"), Err(Error::Lex(_))));
        assert!(matches!(db.execute("SELECT FROM users"), Err(Error::Syntax(_))));
        assert_eq!(db.table("users").unwrap().row_count(), 3);
    }
}
