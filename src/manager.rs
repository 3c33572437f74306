//! The operations offered to the command line: insert, update, delete and query.
//!
//! Every operation validates fully before it writes, so a rejected operation
//! leaves the database untouched.

use log::{info, warn};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{DbError, DbResult};
use crate::parser::{RawValue, SqlValue};
use crate::query::{
    build_delete, build_exists, build_insert, build_reference_count, build_select, build_update,
    get_view, Source, Statement, Statistic, ALL_VIEWS,
};
use crate::schema::{table_names, Catalog, ALL_TABLES};
use crate::store::{QueryResult, SqliteStore};
use crate::validate::Validator;

pub struct AirlineDb {
    store: SqliteStore,
    catalog: Catalog,
}

impl AirlineDb {
    /// Open (creating if needed) the database at `path` and load the catalog
    pub fn open(path: &Path) -> DbResult<Self> {
        Self::init(SqliteStore::open(path)?)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Self::init(SqliteStore::open_in_memory()?)
    }

    fn init(mut store: SqliteStore) -> DbResult<Self> {
        store.bootstrap(ALL_TABLES)?;
        let catalog = Catalog::load(&store, &table_names())?;
        Ok(Self { store, catalog })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Validation without writing, against the current contents
    pub fn validator(&self) -> Validator<'_> {
        Validator::new(&self.catalog, &self.store)
    }

    /// Insert a batch of rows. Every row is validated before any is written,
    /// and the batch commits as a unit.
    pub fn insert_entity(&mut self, table: &str, rows: &[Vec<RawValue>]) -> DbResult<usize> {
        let statements = self.prepare_inserts(table, rows).inspect_err(|e| rejected("insert", table, e))?;
        let inserted = self.store.write_all(&statements)?;
        info!("Inserted {} rows into {}", inserted, table);
        Ok(inserted)
    }

    fn prepare_inserts(&self, table: &str, rows: &[Vec<RawValue>]) -> DbResult<Vec<Statement>> {
        let meta = self.catalog.table(table)?;
        if rows.is_empty() {
            return Err(DbError::ArityMismatch {
                table: table.to_string(),
                expected: meta.columns.len(),
                actual: 0,
            });
        }

        let key_index = meta
            .columns
            .iter()
            .position(|c| c.primary_key)
            .ok_or_else(|| DbError::Schema(format!("table '{}' has no primary key", table)))?;

        let validator = self.validator();
        let mut batch_keys = HashSet::new();
        let mut statements = Vec::with_capacity(rows.len());

        for row in rows {
            let values = validator.validate_insert(row, table)?;
            let key = values[key_index].to_string();
            if !batch_keys.insert(key.clone()) {
                return Err(DbError::DuplicateKey {
                    table: table.to_string(),
                    column: meta.primary_key.clone(),
                    value: key,
                });
            }
            statements.push(build_insert(meta, values));
        }

        Ok(statements)
    }

    /// Apply a partial update to the row keyed by `pk`
    pub fn update_entity(
        &self,
        table: &str,
        pk: &str,
        assignments: &[(String, RawValue)],
    ) -> DbResult<usize> {
        let validator = self.validator();
        let resolved = validator
            .validate_update(pk, assignments, table)
            .inspect_err(|e| rejected("update", table, e))?;

        let meta = self.catalog.table(table)?;
        let updated = self
            .store
            .write(&build_update(meta, resolved, SqlValue::Text(pk.trim().to_string())))?;
        info!("Updated {} {}", table, pk.trim());
        Ok(updated)
    }

    /// Delete the row keyed by `pk`, unless another table still references it
    pub fn delete_entity(&self, table: &str, pk: &str) -> DbResult<usize> {
        self.check_delete(table, pk)
            .inspect_err(|e| rejected("delete", table, e))?;

        let meta = self.catalog.table(table)?;
        let deleted = self
            .store
            .write(&build_delete(meta, SqlValue::Text(pk.trim().to_string())))?;
        info!("Deleted {} {}", table, pk.trim());
        Ok(deleted)
    }

    fn check_delete(&self, table: &str, pk: &str) -> DbResult<()> {
        let meta = self.catalog.table(table)?;
        let pk = pk.trim();
        let key = SqlValue::Text(pk.to_string());

        if pk.is_empty() || !self.store.exists(&build_exists(&meta.name, &meta.primary_key, key.clone()))? {
            return Err(DbError::UnknownEntity {
                table: table.to_string(),
                column: meta.primary_key.clone(),
                value: pk.to_string(),
            });
        }

        for (referencing, fk) in self.catalog.referencing(table)? {
            let count = self
                .store
                .count(&build_reference_count(referencing, fk, meta, key.clone()))?;
            if count > 0 {
                return Err(DbError::ReferencedByOtherEntity {
                    table: table.to_string(),
                    value: pk.to_string(),
                    referencing_table: referencing.to_string(),
                    referencing_column: fk.column.clone(),
                });
            }
        }

        Ok(())
    }

    /// Read rows from a table or join view, filtered by column equality
    pub fn query_entity(&self, source: &str, filters: &[(String, String)]) -> DbResult<QueryResult> {
        let source = match (self.catalog.table(source), get_view(source)) {
            (Ok(meta), _) => Source::Table(meta),
            (Err(_), Some(view)) => Source::View(view),
            (Err(_), None) => {
                let known: Vec<&str> = self
                    .catalog
                    .table_names()
                    .chain(ALL_VIEWS.iter().map(|v| v.name))
                    .collect();
                return Err(DbError::Schema(format!(
                    "unknown table or view '{}' (known: {})",
                    source,
                    known.join(", ")
                )));
            }
        };
        self.store.query(&build_select(source, filters)?)
    }

    pub fn statistic(&self, statistic: Statistic) -> DbResult<QueryResult> {
        self.store.query(&statistic.statement())
    }
}

fn rejected(operation: &str, table: &str, err: &DbError) {
    warn!("Rejected {} on {}: {}", operation, table, err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_assignment, parse_row, parse_rows};

    fn db() -> AirlineDb {
        AirlineDb::open_in_memory().unwrap()
    }

    fn count(db: &AirlineDb, table: &str) -> usize {
        db.query_entity(table, &[]).unwrap().len()
    }

    fn filter(name: &str, value: &str) -> Vec<(String, String)> {
        vec![(name.to_string(), value.to_string())]
    }

    #[test]
    fn test_duplicate_pilot_scenario() {
        let mut db = db();
        assert_eq!(db.insert_entity("pilot", &[parse_row("3,smith,john")]).unwrap(), 1);

        let err = db.insert_entity("pilot", &[parse_row("3,jones,anne")]).unwrap_err();
        assert!(matches!(err, DbError::DuplicateKey { .. }));

        let result = db.query_entity("pilot", &filter("staff_id", "3")).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(
            result.rows[0],
            vec![Some("3".to_string()), Some("smith".to_string()), Some("john".to_string())]
        );
    }

    #[test]
    fn test_dangling_aircraft_scenario() {
        let mut db = db();
        let before = count(&db, "flight");
        let err = db
            .insert_entity("flight", &[parse_row("BA1,LHR,JFK,2024-05-01,99,1,")])
            .unwrap_err();
        assert!(matches!(err, DbError::DanglingForeignKey { .. }));
        assert_eq!(count(&db, "flight"), before);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut db = db();
        let rows = parse_rows("3,smith,john; 4,jones,anne; 5,lee,");
        assert!(matches!(
            db.insert_entity("pilot", &rows),
            Err(DbError::MissingRequiredField { .. })
        ));
        assert_eq!(count(&db, "pilot"), 2);

        let rows = parse_rows("3,smith,john; 3,jones,anne");
        assert!(matches!(db.insert_entity("pilot", &rows), Err(DbError::DuplicateKey { .. })));
        assert_eq!(count(&db, "pilot"), 2);

        let rows = parse_rows("3,smith,john; 4,jones,anne");
        assert_eq!(db.insert_entity("pilot", &rows).unwrap(), 2);
        assert_eq!(count(&db, "pilot"), 4);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut db = db();
        assert!(matches!(db.insert_entity("pilot", &[]), Err(DbError::ArityMismatch { .. })));
    }

    #[test]
    fn test_update_leaves_untouched_columns() {
        let mut db = db();
        db.insert_entity("flight", &[parse_row("BA1,LHR,JFK,2024-05-01,1,1,2")])
            .unwrap();

        let assignments = vec![parse_assignment("start_airport=BLN").unwrap()];
        assert_eq!(db.update_entity("flight", "BA1", &assignments).unwrap(), 1);

        let result = db.query_entity("flight", &filter("flight_id", "BA1")).unwrap();
        assert_eq!(result.get(0, "start_airport"), Some("BLN"));
        assert_eq!(result.get(0, "destination_airport"), Some("JFK"));
        assert_eq!(result.get(0, "pilot_2"), Some("2"));
    }

    #[test]
    fn test_update_pilot_2_to_null() {
        let mut db = db();
        db.insert_entity("flight", &[parse_row("BA1,LHR,JFK,2024-05-01,1,1,2")])
            .unwrap();

        let assignments = vec![parse_assignment("pilot_2=").unwrap()];
        db.update_entity("flight", "BA1", &assignments).unwrap();

        let result = db.query_entity("flight", &filter("flight_id", "BA1")).unwrap();
        assert_eq!(result.get(0, "pilot_2"), None);
        assert_eq!(result.get(0, "pilot_1"), Some("1"));
    }

    #[test]
    fn test_update_key_rejected_without_change() {
        let mut db = db();
        db.insert_entity("flight", &[parse_row("BA1,LHR,JFK,2024-05-01,1,1,")])
            .unwrap();
        let assignments = vec![
            parse_assignment("start_airport=BLN").unwrap(),
            parse_assignment("flight_id=BA2").unwrap(),
        ];
        assert!(matches!(
            db.update_entity("flight", "BA1", &assignments),
            Err(DbError::ImmutableKey { .. })
        ));
        let result = db.query_entity("flight", &filter("flight_id", "BA1")).unwrap();
        assert_eq!(result.get(0, "start_airport"), Some("LHR"));
    }

    #[test]
    fn test_delete_referenced_aircraft() {
        let mut db = db();
        db.insert_entity("flight", &[parse_row("BA1,LHR,JFK,2024-05-01,1,1,")])
            .unwrap();

        match db.delete_entity("aircraft", "1").unwrap_err() {
            DbError::ReferencedByOtherEntity {
                referencing_table,
                referencing_column,
                ..
            } => {
                assert_eq!(referencing_table, "flight");
                assert_eq!(referencing_column, "aircraft_id");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(db.query_entity("aircraft", &filter("aircraft_id", "1")).unwrap().len(), 1);

        // the second pilot slot counts as a reference too
        db.insert_entity("flight", &[parse_row("BA2,LHR,CDG,2024-05-02,2,1,2")])
            .unwrap();
        assert!(matches!(
            db.delete_entity("pilot", "2"),
            Err(DbError::ReferencedByOtherEntity { .. })
        ));

        assert_eq!(db.delete_entity("flight", "BA1").unwrap(), 1);
        assert_eq!(db.delete_entity("aircraft", "1").unwrap(), 1);
        assert!(db.query_entity("aircraft", &filter("aircraft_id", "1")).unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_row() {
        let db = db();
        assert!(matches!(
            db.delete_entity("flight", "ZZ9"),
            Err(DbError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_overview_keeps_flights_without_second_pilot() {
        let mut db = db();
        let rows = parse_rows("BA1,LHR,JFK,2024-05-01,1,1,; BA2,LHR,CDG,2024-06-01,2,1,2");
        db.insert_entity("flight", &rows).unwrap();

        let result = db.query_entity("flight_overview", &[]).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get(0, "flight_id"), Some("BA1"));
        assert_eq!(result.get(0, "pilot_2_name"), None);
        assert_eq!(result.get(0, "aircraft_capacity"), Some("420"));
        assert_eq!(result.get(1, "pilot_2_name"), Some("harry kane"));

        let result = db.query_entity("all", &filter("pilot_1_name", "david beckham")).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_query_unknown_source_and_filter() {
        let db = db();
        let err = db.query_entity("crew", &[]).unwrap_err();
        assert!(matches!(err, DbError::Schema(_)));
        assert!(err
            .to_string()
            .contains("known: aircraft, pilot, flight, flight_overview"));
        assert!(matches!(
            db.query_entity("pilot", &filter("age", "3")),
            Err(DbError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_statistics() {
        let mut db = db();
        let rows = parse_rows(
            "BA1,LHR,JFK,2024-05-01,1,1,2; BA2,LHR,JFK,2024-05-09,2,1,; BA3,LHR,CDG,2024-06-01,1,1,",
        );
        db.insert_entity("flight", &rows).unwrap();

        let by_destination = db.statistic(Statistic::FlightsByDestination).unwrap();
        assert_eq!(by_destination.get(0, "destination_airport"), Some("CDG"));
        assert_eq!(by_destination.get(1, "total_flight"), Some("2"));

        let by_month = db.statistic(Statistic::FlightsByMonth).unwrap();
        assert_eq!(by_month.get(0, "month"), Some("05"));
        assert_eq!(by_month.get(0, "total_flight"), Some("2"));

        let duty = db.statistic(Statistic::PilotDuty).unwrap();
        assert_eq!(duty.get(0, "pilot_duty_count"), Some("3"));
        assert_eq!(duty.get(1, "pilot_duty_count"), Some("1"));

        let age = db.statistic(Statistic::AverageAircraftAge).unwrap();
        assert_eq!(age.get(0, "average_age"), Some("7"));
    }
}
