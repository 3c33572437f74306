use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DbError, DbResult};
use crate::parser::{RawValue, SqlValue};
use crate::query::build_exists;
use crate::schema::{Catalog, ColumnMeta, ColumnType, TableMeta};
use crate::store::SqliteStore;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is valid"));

/// Validates user input against live schema metadata and current table contents
pub struct Validator<'a> {
    pub(super) catalog: &'a Catalog,
    pub(super) store: &'a SqliteStore,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a Catalog, store: &'a SqliteStore) -> Self {
        Self { catalog, store }
    }

    /// Validate one raw value for `column` of `table` and resolve it to the
    /// column's type.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// 1. empty value on a NOT NULL column
    /// 2. empty value on a nullable column (accepted as NULL)
    /// 3. primary key already taken
    /// 4. foreign key target missing
    /// 5. date format
    /// 6. integer format
    pub fn validate_field(
        &self,
        raw: &RawValue,
        column: &ColumnMeta,
        table: &TableMeta,
    ) -> DbResult<SqlValue> {
        let Some(value) = raw.as_text() else {
            if column.nullable {
                return Ok(SqlValue::Null);
            }
            return Err(DbError::MissingRequiredField {
                table: table.name.clone(),
                column: column.name.clone(),
            });
        };

        if column.primary_key {
            let probe = build_exists(&table.name, &column.name, SqlValue::Text(value.to_string()));
            if self.store.exists(&probe)? {
                return Err(DbError::DuplicateKey {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    value: value.to_string(),
                });
            }
        }

        if let Some(fk) = table.foreign_key(&column.name) {
            let probe = build_exists(&fk.target_table, &fk.target_column, SqlValue::Text(value.to_string()));
            if !self.store.exists(&probe)? {
                return Err(DbError::DanglingForeignKey {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    value: value.to_string(),
                    target_table: fk.target_table.clone(),
                    target_column: fk.target_column.clone(),
                });
            }
        }

        if column.is_date() && !DATE_PATTERN.is_match(value) {
            return Err(DbError::InvalidDateFormat {
                table: table.name.clone(),
                column: column.name.clone(),
                value: value.to_string(),
            });
        }

        match column.col_type {
            ColumnType::Integer => parse_integer(value)
                .map(SqlValue::Integer)
                .ok_or_else(|| DbError::InvalidIntegerFormat {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    value: value.to_string(),
                }),
            ColumnType::Text => Ok(SqlValue::Text(value.to_string())),
        }
    }
}

/// Digits only, and small enough for SQLite's 64-bit integers
fn parse_integer(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
