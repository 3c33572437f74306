use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Declared column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }

    /// Parse a declared type as reported by `pragma_table_info`
    pub fn from_declared(declared: &str) -> Option<Self> {
        match declared.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => Some(ColumnType::Integer),
            "TEXT" => Some(ColumnType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

// =============================================================================
// Static descriptors (bootstrap DDL)
// =============================================================================

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Raw SQL default expression
    pub default: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            primary_key: false,
            default: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            primary_key: false,
            default: None,
        }
    }

    /// Create the primary key column
    pub const fn key(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            primary_key: true,
            default: None,
        }
    }

    /// A date column stored as `YYYY-MM-DD` text, defaulting to today
    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            col_type: ColumnType::Text,
            nullable: false,
            primary_key: false,
            default: Some("CURRENT_DATE"),
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(
        column: &'static str,
        references_table: &'static str,
        references_column: &'static str,
    ) -> Self {
        Self {
            column,
            references_table,
            references_column,
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
    /// Rows inserted when the table is empty at bootstrap, in column order
    pub seed: &'static [&'static [&'static str]],
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }
}

// =============================================================================
// Live metadata (introspected)
// =============================================================================

/// One column as reported by the live store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

impl ColumnMeta {
    /// Date semantics are signalled by a date-valued default
    pub fn is_date(&self) -> bool {
        match &self.default {
            Some(default) => {
                let default = default.trim().to_ascii_lowercase();
                default == "current_date" || default.starts_with("date(") || default.starts_with("(date(")
            }
            None => false,
        }
    }
}

/// One foreign key as reported by the live store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKeyMeta {
    pub column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Cached metadata for one table
#[derive(Debug, Clone, Serialize)]
pub struct TableMeta {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
    pub foreign_keys: Vec<ForeignKeyMeta>,
    pub primary_key: String,
}

impl TableMeta {
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKeyMeta> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(default: Option<&str>) -> ColumnMeta {
        ColumnMeta {
            name: "d".into(),
            col_type: ColumnType::Text,
            nullable: false,
            default: default.map(String::from),
            primary_key: false,
        }
    }

    #[test]
    fn test_date_marker() {
        assert!(meta(Some("CURRENT_DATE")).is_date());
        assert!(meta(Some("(date('now'))")).is_date());
        assert!(!meta(Some("'x'")).is_date());
        assert!(!meta(None).is_date());
    }

    #[test]
    fn test_declared_types() {
        assert_eq!(ColumnType::from_declared("integer"), Some(ColumnType::Integer));
        assert_eq!(ColumnType::from_declared("TEXT"), Some(ColumnType::Text));
        assert_eq!(ColumnType::from_declared("REAL"), None);
    }
}
