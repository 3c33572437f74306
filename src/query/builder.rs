//! Parameterized statement construction.
//!
//! Table and column identifiers only ever come from catalog metadata or a
//! static view definition, and catalog identifiers are always quoted.
//! User-supplied values always travel as bound parameters.

use crate::error::{DbError, DbResult};
use crate::parser::SqlValue;
use crate::schema::{ForeignKeyMeta, TableMeta};

use super::view::JoinView;

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// What a read targets: a catalogued table or a predefined join view
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Table(&'a TableMeta),
    View(&'static JoinView),
}

impl Source<'_> {
    pub fn name(&self) -> &str {
        match self {
            Source::Table(table) => &table.name,
            Source::View(view) => view.name,
        }
    }

    /// SQL expression for an output column, if the source has it
    fn expression(&self, column: &str) -> Option<String> {
        match self {
            Source::Table(table) => table.column(column).map(|c| quote_ident(&c.name)),
            Source::View(view) => view.column(column).map(|c| c.expr.to_string()),
        }
    }
}

/// Quote an identifier so reserved words and odd names are safe in SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quoted_columns(table: &TableMeta) -> String {
    table
        .column_names()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ")
}

/// INSERT with one placeholder per column, values in declared column order
pub fn build_insert(table: &TableMeta, values: Vec<SqlValue>) -> Statement {
    let placeholders: Vec<&str> = table.columns.iter().map(|_| "?").collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&table.name),
        quoted_columns(table),
        placeholders.join(", ")
    );
    Statement::new(sql, values)
}

/// UPDATE touching only the assigned columns; the key is the trailing parameter
pub fn build_update(table: &TableMeta, assignments: Vec<(String, SqlValue)>, pk: SqlValue) -> Statement {
    let mut sets = Vec::with_capacity(assignments.len());
    let mut params = Vec::with_capacity(assignments.len() + 1);
    for (name, value) in assignments {
        sets.push(format!("{} = ?", quote_ident(&name)));
        params.push(value);
    }
    params.push(pk);

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote_ident(&table.name),
        sets.join(", "),
        quote_ident(&table.primary_key)
    );
    Statement::new(sql, params)
}

pub fn build_delete(table: &TableMeta, pk: SqlValue) -> Statement {
    Statement::new(
        format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(&table.name),
            quote_ident(&table.primary_key)
        ),
        vec![pk],
    )
}

/// SELECT with zero or more equality filters joined by AND
pub fn build_select(source: Source<'_>, filters: &[(String, String)]) -> DbResult<Statement> {
    let mut conditions = Vec::with_capacity(filters.len());
    let mut params = Vec::with_capacity(filters.len());
    for (name, value) in filters {
        let expr = source.expression(name).ok_or_else(|| DbError::UnknownAttribute {
            table: source.name().to_string(),
            attribute: name.clone(),
        })?;
        conditions.push(format!("{} = ?", expr));
        params.push(SqlValue::Text(value.clone()));
    }

    let mut sql = match source {
        Source::Table(table) => format!(
            "SELECT {} FROM {}",
            quoted_columns(table),
            quote_ident(&table.name)
        ),
        Source::View(view) => {
            let projection: Vec<String> = view
                .columns
                .iter()
                .map(|c| format!("{} AS {}", c.expr, c.name))
                .collect();
            format!("SELECT {} FROM {}", projection.join(", "), view.from)
        }
    };

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    let order_by = match source {
        Source::Table(table) => quote_ident(&table.primary_key),
        Source::View(view) => view.order_by.to_string(),
    };
    sql.push_str(" ORDER BY ");
    sql.push_str(&order_by);

    Ok(Statement::new(sql, params))
}

/// Probe for any row with `column = value`
pub fn build_exists(table: &str, column: &str, value: SqlValue) -> Statement {
    Statement::new(
        format!(
            "SELECT 1 FROM {} WHERE {} = ? LIMIT 1",
            quote_ident(table),
            quote_ident(column)
        ),
        vec![value],
    )
}

/// Count rows of `referencing` whose `fk` points at the row of `target` keyed by `pk`
pub fn build_reference_count(
    referencing: &str,
    fk: &ForeignKeyMeta,
    target: &TableMeta,
    pk: SqlValue,
) -> Statement {
    Statement::new(
        format!(
            "SELECT COUNT(*) FROM {} WHERE {} IN (SELECT {} FROM {} WHERE {} = ?)",
            quote_ident(referencing),
            quote_ident(&fk.column),
            quote_ident(&fk.target_column),
            quote_ident(&target.name),
            quote_ident(&target.primary_key)
        ),
        vec![pk],
    )
}
