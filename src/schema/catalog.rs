//! Session cache of live schema metadata.
//!
//! Loaded once from the store right after bootstrap and read-only afterwards.

use log::info;
use std::collections::HashMap;

use super::types::{ColumnMeta, ForeignKeyMeta, TableMeta};
use crate::error::{DbError, DbResult};
use crate::store::SqliteStore;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Load order, for listing
    order: Vec<String>,
    tables: HashMap<String, TableMeta>,
}

impl Catalog {
    /// Introspect every named table from the live store
    pub fn load(store: &SqliteStore, tables: &[&str]) -> DbResult<Self> {
        let mut catalog = Catalog::default();

        for &name in tables {
            let columns = store.introspect_columns(name)?;
            if columns.is_empty() {
                return Err(DbError::Schema(format!("unknown table '{}'", name)));
            }
            let foreign_keys = store.introspect_foreign_keys(name)?;
            let meta = table_meta(name, columns, foreign_keys)?;
            catalog.order.push(meta.name.clone());
            catalog.tables.insert(meta.name.clone(), meta);
        }

        info!("Loaded catalog for {} tables", catalog.order.len());
        Ok(catalog)
    }

    pub fn table(&self, table: &str) -> DbResult<&TableMeta> {
        self.tables
            .get(table)
            .ok_or_else(|| DbError::Schema(format!("unknown table '{}'", table)))
    }

    pub fn columns(&self, table: &str) -> DbResult<&[ColumnMeta]> {
        Ok(&self.table(table)?.columns)
    }

    pub fn foreign_keys(&self, table: &str) -> DbResult<&[ForeignKeyMeta]> {
        Ok(&self.table(table)?.foreign_keys)
    }

    pub fn primary_key_name(&self, table: &str) -> DbResult<&str> {
        Ok(&self.table(table)?.primary_key)
    }

    /// Every foreign key in another table that points at `table`
    pub fn referencing(&self, table: &str) -> DbResult<Vec<(&str, &ForeignKeyMeta)>> {
        self.table(table)?;
        Ok(self
            .tables()
            .filter(|t| t.name != table)
            .flat_map(|t| {
                t.foreign_keys
                    .iter()
                    .filter(|fk| fk.target_table == table)
                    .map(move |fk| (t.name.as_str(), fk))
            })
            .collect())
    }

    /// Catalogued table names in load order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMeta> {
        self.order.iter().filter_map(|name| self.tables.get(name))
    }
}

fn table_meta(
    name: &str,
    columns: Vec<ColumnMeta>,
    foreign_keys: Vec<ForeignKeyMeta>,
) -> DbResult<TableMeta> {
    let keys: Vec<&ColumnMeta> = columns.iter().filter(|c| c.primary_key).collect();
    let primary_key = match keys.as_slice() {
        [key] => key.name.clone(),
        _ => {
            return Err(DbError::Schema(format!(
                "table '{}' must have exactly one primary key column, found {}",
                name,
                keys.len()
            )))
        }
    };

    let mut positioned = Vec::with_capacity(foreign_keys.len());
    for fk in foreign_keys {
        let position = columns.iter().position(|c| c.name == fk.column).ok_or_else(|| {
            DbError::Schema(format!("foreign key on unknown column {}.{}", name, fk.column))
        })?;
        positioned.push((position, fk));
    }
    // pragma_foreign_key_list reports keys newest first; keep declaration order
    positioned.sort_by_key(|(position, _)| *position);
    let foreign_keys = positioned.into_iter().map(|(_, fk)| fk).collect();

    Ok(TableMeta {
        name: name.to_string(),
        columns,
        foreign_keys,
        primary_key,
    })
}
