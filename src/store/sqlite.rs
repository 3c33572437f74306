use log::{debug, info};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes, generate_seed_insert};
use crate::error::{DbError, DbResult};
use crate::query::Statement;
use crate::schema::{ColumnMeta, ColumnType, DependencyResolver, ForeignKeyMeta, TableSchema};

/// Rows returned by a read, with every cell rendered as text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `row`, if both exist and the cell is not NULL
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }
}

/// The persistence engine: one SQLite connection with FK enforcement on
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> DbResult<Self> {
        let conn = Connection::open(db_path)?;
        info!("Opened database {:?}", db_path);
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Create missing tables and indexes, then seed tables that are empty
    pub fn bootstrap(&mut self, schemas: &[&TableSchema]) -> DbResult<()> {
        let ordered = DependencyResolver::new(schemas)
            .ordered()
            .map_err(DbError::Schema)?;

        let tx = self.conn.transaction()?;

        for schema in &ordered {
            tx.execute(&generate_create_table(schema), [])?;
            for index_sql in generate_indexes(schema) {
                tx.execute(&index_sql, [])?;
            }

            let count: i64 = tx.query_row(&format!("SELECT COUNT(1) FROM {}", schema.name), [], |row| {
                row.get(0)
            })?;
            if count == 0 && !schema.seed.is_empty() {
                let mut stmt = tx.prepare_cached(&generate_seed_insert(schema))?;
                for row in schema.seed {
                    stmt.execute(rusqlite::params_from_iter(row.iter()))?;
                }
                info!("Seeded {} with {} rows", schema.name, schema.seed.len());
            }
        }

        tx.commit()?;
        info!("Bootstrapped {} tables", ordered.len());
        Ok(())
    }

    /// Run a read statement and collect every row
    pub fn query(&self, statement: &Statement) -> DbResult<QueryResult> {
        debug!("query: {} ({} params)", statement.sql, statement.params.len());
        let mut stmt = self.conn.prepare_cached(&statement.sql)?;
        for (idx, value) in statement.params.iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();
        let mut rows = Vec::new();
        let mut cursor = stmt.raw_query();
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(render_cell(row.get_ref(idx)?));
            }
            rows.push(values);
        }

        Ok(QueryResult { columns, rows })
    }

    /// True when the statement yields at least one row
    pub fn exists(&self, statement: &Statement) -> DbResult<bool> {
        Ok(!self.query(statement)?.is_empty())
    }

    /// Read a single integer, e.g. from `SELECT COUNT(*)`
    pub fn count(&self, statement: &Statement) -> DbResult<i64> {
        debug!("count: {}", statement.sql);
        let mut stmt = self.conn.prepare_cached(&statement.sql)?;
        for (idx, value) in statement.params.iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }
        let mut cursor = stmt.raw_query();
        match cursor.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Ok(0),
        }
    }

    /// Execute one write statement and return the number of affected rows
    pub fn write(&self, statement: &Statement) -> DbResult<usize> {
        execute(&self.conn, statement)
    }

    /// Execute several writes in one transaction; either all commit or none do
    pub fn write_all(&mut self, statements: &[Statement]) -> DbResult<usize> {
        let tx = self.conn.transaction()?;
        let mut affected = 0;
        for statement in statements {
            affected += execute(&tx, statement)?;
        }
        tx.commit()?;
        Ok(affected)
    }

    pub fn introspect_columns(&self, table: &str) -> DbResult<Vec<ColumnMeta>> {
        let mut stmt = self.conn.prepare_cached(
            r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#,
        )?;
        let rows = stmt.query_map([table], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut columns = Vec::new();
        for row in rows {
            let (name, declared, not_null, default, pk) = row?;
            let col_type = ColumnType::from_declared(&declared).ok_or_else(|| {
                DbError::Schema(format!("{}.{} has unsupported type '{}'", table, name, declared))
            })?;
            columns.push(ColumnMeta {
                name,
                col_type,
                nullable: !not_null,
                default,
                primary_key: pk > 0,
            });
        }
        Ok(columns)
    }

    pub fn introspect_foreign_keys(&self, table: &str) -> DbResult<Vec<ForeignKeyMeta>> {
        let mut stmt = self.conn.prepare_cached(
            r#"SELECT "from", "table", "to" FROM pragma_foreign_key_list(?1) ORDER BY id, seq"#,
        )?;
        let rows = stmt
            .query_map([table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut keys = Vec::new();
        for (column, target_table, target_column) in rows {
            // `REFERENCES parent` without a column targets the parent's primary key
            let target_column = match target_column {
                Some(target_column) => target_column,
                None => self.implicit_target(table, &column, &target_table)?,
            };
            keys.push(ForeignKeyMeta {
                column,
                target_table,
                target_column,
            });
        }
        Ok(keys)
    }

    fn implicit_target(&self, table: &str, column: &str, target_table: &str) -> DbResult<String> {
        let keys: Vec<String> = self
            .introspect_columns(target_table)?
            .into_iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect();
        match <[String; 1]>::try_from(keys) {
            Ok([key]) => Ok(key),
            Err(_) => Err(DbError::Schema(format!(
                "{}.{} references {}, which has no single primary key column",
                table, column, target_table
            ))),
        }
    }
}

fn execute(conn: &Connection, statement: &Statement) -> DbResult<usize> {
    debug!("write: {} ({} params)", statement.sql, statement.params.len());
    let mut stmt = conn.prepare_cached(&statement.sql)?;
    for (idx, value) in statement.params.iter().enumerate() {
        value.bind_to(idx + 1, &mut stmt)?;
    }
    Ok(stmt.raw_execute()?)
}

fn render_cell(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(format!("<{} bytes>", b.len())),
    }
}
