//! Table schema definitions for the airline dataset

use super::types::*;

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static AIRCRAFT: TableSchema = TableSchema {
    name: "aircraft",
    columns: &[
        Column::key("aircraft_id", ColumnType::Integer),
        Column::required("age", ColumnType::Integer),
        Column::required("capacity", ColumnType::Integer),
    ],
    foreign_keys: &[],
    seed: &[&["1", "5", "420"], &["2", "9", "110"]],
};

pub static PILOT: TableSchema = TableSchema {
    name: "pilot",
    columns: &[
        Column::key("staff_id", ColumnType::Integer),
        Column::required("last_name", ColumnType::Text),
        Column::required("first_name", ColumnType::Text),
    ],
    foreign_keys: &[],
    seed: &[&["1", "beckham", "david"], &["2", "kane", "harry"]],
};

// =============================================================================
// Dependent Tables
// =============================================================================

pub static FLIGHT: TableSchema = TableSchema {
    name: "flight",
    columns: &[
        Column::key("flight_id", ColumnType::Text),
        Column::required("start_airport", ColumnType::Text),
        Column::required("destination_airport", ColumnType::Text),
        Column::date("departure_date"),
        Column::required("aircraft_id", ColumnType::Integer),
        Column::required("pilot_1", ColumnType::Integer),
        Column::new("pilot_2", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("aircraft_id", "aircraft", "aircraft_id"),
        ForeignKey::new("pilot_1", "pilot", "staff_id"),
        ForeignKey::new("pilot_2", "pilot", "staff_id"),
    ],
    seed: &[],
};

/// All table schemas in dependency order
pub static ALL_TABLES: &[&TableSchema] = &[&AIRCRAFT, &PILOT, &FLIGHT];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_one_key() {
        for table in ALL_TABLES {
            let keys = table.columns.iter().filter(|c| c.primary_key).count();
            assert_eq!(keys, 1, "{} must have exactly one primary key", table.name);
        }
    }

    #[test]
    fn test_seed_rows_match_arity() {
        for table in ALL_TABLES {
            for row in table.seed {
                assert_eq!(row.len(), table.columns.len(), "seed row for {}", table.name);
            }
        }
    }

    #[test]
    fn test_foreign_keys_point_at_keys() {
        for table in ALL_TABLES {
            for fk in table.foreign_keys {
                let target = get_table(fk.references_table).unwrap();
                let column = target
                    .columns
                    .iter()
                    .find(|c| c.name == fk.references_column)
                    .unwrap();
                assert!(column.primary_key);
            }
        }
    }
}
