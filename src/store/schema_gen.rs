use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let pk = if col.primary_key { " PRIMARY KEY" } else { "" };
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let default = col
            .default
            .map(|d| format!(" DEFAULT {}", d))
            .unwrap_or_default();

        columns.push(format!(
            "    {} {}{}{}{}",
            col.name,
            col.col_type.sql_name(),
            pk,
            null_constraint,
            default
        ));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}

/// Generate the positional INSERT used for seed rows
pub fn generate_seed_insert(schema: &TableSchema) -> String {
    let columns: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{AIRCRAFT, FLIGHT};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&FLIGHT);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS flight"));
        assert!(sql.contains("flight_id TEXT PRIMARY KEY NOT NULL"));
        assert!(sql.contains("departure_date TEXT NOT NULL DEFAULT CURRENT_DATE"));
        assert!(sql.contains("    pilot_2 INTEGER,"));
        assert!(sql.contains("FOREIGN KEY (aircraft_id) REFERENCES aircraft(aircraft_id)"));
        assert!(sql.contains("FOREIGN KEY (pilot_2) REFERENCES pilot(staff_id)"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&FLIGHT);
        assert_eq!(indexes.len(), 3);
        assert!(indexes.iter().any(|i| i.contains("idx_flight_pilot_1")));
        assert!(generate_indexes(&AIRCRAFT).is_empty());
    }

    #[test]
    fn test_generate_seed_insert() {
        assert_eq!(
            generate_seed_insert(&AIRCRAFT),
            "INSERT INTO aircraft (aircraft_id, age, capacity) VALUES (?, ?, ?)"
        );
    }
}
