use super::types::TableSchema;
use std::collections::{HashMap, HashSet};

/// Orders table schemas so FK parents are created before their children
pub struct DependencyResolver<'s> {
    tables: Vec<&'s TableSchema>,
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl<'s> DependencyResolver<'s> {
    pub fn new(tables: &[&'s TableSchema]) -> Self {
        let deps = tables
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self {
            tables: tables.to_vec(),
            deps,
        }
    }

    /// Return all tables in dependency order (parents before children).
    /// Ties keep the order the tables were given in.
    pub fn ordered(&self) -> Result<Vec<&'s TableSchema>, String> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table in &self.tables {
            if !visited.contains(table.name) {
                self.visit(table.name, &mut visited, &mut temp_visited, &mut result)?;
            }
        }

        Ok(result)
    }

    fn visit(
        &self,
        name: &'static str,
        visited: &mut HashSet<&'static str>,
        temp_visited: &mut HashSet<&'static str>,
        result: &mut Vec<&'s TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            let mut deps: Vec<_> = deps.iter().copied().collect();
            deps.sort_unstable();
            for dep in deps {
                if dep == name {
                    continue;
                }
                if !self.deps.contains_key(dep) {
                    return Err(format!("{} references unknown table: {}", name, dep));
                }
                self.visit(dep, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = self.tables.iter().find(|t| t.name == name) {
            result.push(*table);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{AIRCRAFT, FLIGHT, PILOT};
    use crate::schema::types::{Column, ColumnType, ForeignKey};

    #[test]
    fn test_parents_come_first() {
        let resolver = DependencyResolver::new(&[&FLIGHT, &PILOT, &AIRCRAFT]);
        let names: Vec<_> = resolver.ordered().unwrap().iter().map(|t| t.name).collect();

        let flight_pos = names.iter().position(|&n| n == "flight").unwrap();
        let pilot_pos = names.iter().position(|&n| n == "pilot").unwrap();
        let aircraft_pos = names.iter().position(|&n| n == "aircraft").unwrap();

        assert_eq!(names.len(), 3);
        assert!(aircraft_pos < flight_pos);
        assert!(pilot_pos < flight_pos);
    }

    #[test]
    fn test_missing_parent_is_an_error() {
        let resolver = DependencyResolver::new(&[&FLIGHT]);
        assert!(resolver.ordered().is_err());
    }

    static LOOP_A: TableSchema = TableSchema {
        name: "a",
        columns: &[Column::key("id", ColumnType::Integer), Column::new("b_id", ColumnType::Integer)],
        foreign_keys: &[ForeignKey::new("b_id", "b", "id")],
        seed: &[],
    };

    static LOOP_B: TableSchema = TableSchema {
        name: "b",
        columns: &[Column::key("id", ColumnType::Integer), Column::new("a_id", ColumnType::Integer)],
        foreign_keys: &[ForeignKey::new("a_id", "a", "id")],
        seed: &[],
    };

    #[test]
    fn test_cycle_detected() {
        let resolver = DependencyResolver::new(&[&LOOP_A, &LOOP_B]);
        let err = resolver.ordered().unwrap_err();
        assert!(err.contains("Circular dependency"));
    }
}
