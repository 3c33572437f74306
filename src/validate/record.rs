use std::collections::HashSet;

use super::field::Validator;
use crate::error::{DbError, DbResult};
use crate::parser::{RawValue, SqlValue};
use crate::query::build_exists;

impl Validator<'_> {
    /// Validate a full row for `table`, one value per column in declared order.
    /// Returns the values resolved to their column types.
    pub fn validate_insert(&self, row: &[RawValue], table: &str) -> DbResult<Vec<SqlValue>> {
        let meta = self.catalog.table(table)?;
        if row.len() != meta.columns.len() {
            return Err(DbError::ArityMismatch {
                table: table.to_string(),
                expected: meta.columns.len(),
                actual: row.len(),
            });
        }

        row.iter()
            .zip(&meta.columns)
            .map(|(raw, column)| self.validate_field(raw, column, meta))
            .collect()
    }

    /// Validate a partial update of the row keyed by `pk`.
    ///
    /// Only the named attributes are touched. An explicit empty value sets the
    /// column to NULL; an attribute that is not named keeps its stored value.
    pub fn validate_update(
        &self,
        pk: &str,
        assignments: &[(String, RawValue)],
        table: &str,
    ) -> DbResult<Vec<(String, SqlValue)>> {
        let meta = self.catalog.table(table)?;
        if assignments.is_empty() {
            return Err(DbError::ArityMismatch {
                table: table.to_string(),
                expected: 1,
                actual: 0,
            });
        }

        let pk = pk.trim();
        let probe = build_exists(&meta.name, &meta.primary_key, SqlValue::Text(pk.to_string()));
        if pk.is_empty() || !self.store.exists(&probe)? {
            return Err(DbError::UnknownEntity {
                table: table.to_string(),
                column: meta.primary_key.clone(),
                value: pk.to_string(),
            });
        }

        if assignments.iter().any(|(name, _)| *name == meta.primary_key) {
            return Err(DbError::ImmutableKey {
                table: table.to_string(),
                column: meta.primary_key.clone(),
            });
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(assignments.len());
        for (name, raw) in assignments {
            let column = meta.column(name).ok_or_else(|| DbError::UnknownAttribute {
                table: table.to_string(),
                attribute: name.clone(),
            })?;
            if !seen.insert(name.as_str()) {
                return Err(DbError::DuplicateAttribute {
                    table: table.to_string(),
                    attribute: name.clone(),
                });
            }
            resolved.push((column.name.clone(), self.validate_field(raw, column, meta)?));
        }

        Ok(resolved)
    }
}
