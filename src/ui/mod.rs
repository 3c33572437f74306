//! Console output.
//!
//! Status lines are cyan, errors red and tables green, or everything goes out
//! as JSON when requested.

mod table;

use crossterm::style::Stylize;
use serde_json::{json, Map, Value};
use std::io::{self, Stdout, Write};

use crate::schema::TableMeta;
use crate::store::QueryResult;

pub use table::render_table;

/// Writes command results to a terminal (or any writer)
pub struct Console<W: Write> {
    out: W,
    json: bool,
    color: bool,
}

impl Console<Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(io::stdout(), json, true)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, json: bool, color: bool) -> Self {
        Self { out, json, color }
    }

    pub fn status(&mut self, message: impl Into<String>) -> io::Result<()> {
        let message = message.into();
        if self.json {
            return self.write_json(&json!({ "status": message }));
        }
        if self.color {
            writeln!(self.out, "{}", message.cyan())
        } else {
            writeln!(self.out, "{}", message)
        }
    }

    pub fn error(&mut self, message: impl Into<String>) -> io::Result<()> {
        let message = message.into();
        if self.json {
            return self.write_json(&json!({ "error": message }));
        }
        if self.color {
            writeln!(self.out, "{}", message.red())
        } else {
            writeln!(self.out, "{}", message)
        }
    }

    pub fn table(&mut self, result: &QueryResult) -> io::Result<()> {
        if self.json {
            return self.write_json(&Value::Array(result_objects(result)));
        }
        for line in render_table(result) {
            if self.color {
                writeln!(self.out, "{}", line.green())?;
            } else {
                writeln!(self.out, "{}", line)?;
            }
        }
        Ok(())
    }

    /// Describe catalogued tables: columns, types, keys and references
    pub fn schema<'t>(&mut self, tables: impl Iterator<Item = &'t TableMeta>) -> io::Result<()> {
        let tables: Vec<&TableMeta> = tables.collect();
        if self.json {
            let value = serde_json::to_value(&tables).map_err(io::Error::other)?;
            return self.write_json(&value);
        }

        for table in tables {
            writeln!(self.out, "{} (primary key: {})", table.name, table.primary_key)?;
            for column in &table.columns {
                let mut line = format!("  {} {}", column.name, column.col_type);
                if !column.nullable {
                    line.push_str(" NOT NULL");
                }
                if let Some(default) = &column.default {
                    line.push_str(&format!(" DEFAULT {}", default));
                }
                if let Some(fk) = table.foreign_key(&column.name) {
                    line.push_str(&format!(" -> {}.{}", fk.target_table, fk.target_column));
                }
                writeln!(self.out, "{}", line)?;
            }
        }
        Ok(())
    }

    fn write_json(&mut self, value: &Value) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        writeln!(self.out, "{}", text)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// One JSON object per row, keyed by column name
fn result_objects(result: &QueryResult) -> Vec<Value> {
    result
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = result
                .columns
                .iter()
                .zip(row)
                .map(|(column, cell)| {
                    let value = cell.clone().map(Value::String).unwrap_or(Value::Null);
                    (column.clone(), value)
                })
                .collect();
            Value::Object(object)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult {
            columns: vec!["flight_id".into(), "pilot_2".into()],
            rows: vec![vec![Some("BA1".into()), None]],
        }
    }

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn test_plain_table() {
        let mut console = Console::new(Vec::new(), false, false);
        console.table(&sample()).unwrap();
        assert_eq!(output(console), "flight_id  pilot_2\nBA1        NULL\n");
    }

    #[test]
    fn test_json_table() {
        let mut console = Console::new(Vec::new(), true, false);
        console.table(&sample()).unwrap();
        let value: Value = serde_json::from_str(&output(console)).unwrap();
        assert_eq!(value, json!([{ "flight_id": "BA1", "pilot_2": null }]));
    }

    #[test]
    fn test_plain_status_has_no_escape_codes() {
        let mut console = Console::new(Vec::new(), false, false);
        console.status("done").unwrap();
        assert_eq!(output(console), "done\n");
    }

    #[test]
    fn test_schema_listing() {
        let db = crate::AirlineDb::open_in_memory().unwrap();
        let mut console = Console::new(Vec::new(), false, false);
        console.schema(db.catalog().tables()).unwrap();
        let text = output(console);
        assert!(text.contains("flight (primary key: flight_id)"));
        assert!(text.contains("  departure_date TEXT NOT NULL DEFAULT CURRENT_DATE"));
        assert!(text.contains("  pilot_2 INTEGER -> pilot.staff_id"));
    }

    #[test]
    fn test_json_error() {
        let mut console = Console::new(Vec::new(), true, false);
        console.error("boom").unwrap();
        let value: Value = serde_json::from_str(&output(console)).unwrap();
        assert_eq!(value["error"], "boom");
    }
}
