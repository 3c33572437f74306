use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors raised by the catalog, the validators and the store
#[derive(Debug, Error)]
pub enum DbError {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("{table}: expected {expected} values, got {actual}")]
    ArityMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("{table}.{column} is required")]
    MissingRequiredField { table: String, column: String },

    #[error("{table}.{column} = '{value}' already exists")]
    DuplicateKey {
        table: String,
        column: String,
        value: String,
    },

    #[error("{table}.{column} = '{value}' does not exist in {target_table}.{target_column}")]
    DanglingForeignKey {
        table: String,
        column: String,
        value: String,
        target_table: String,
        target_column: String,
    },

    #[error("{table}.{column} = '{value}' is not a date (expected YYYY-MM-DD)")]
    InvalidDateFormat {
        table: String,
        column: String,
        value: String,
    },

    #[error("{table}.{column} = '{value}' is not an integer")]
    InvalidIntegerFormat {
        table: String,
        column: String,
        value: String,
    },

    #[error("{table}: no row with {column} = '{value}'")]
    UnknownEntity {
        table: String,
        column: String,
        value: String,
    },

    #[error("{table}.{column} is the primary key and cannot be changed")]
    ImmutableKey { table: String, column: String },

    #[error("{table} has no attribute '{attribute}'")]
    UnknownAttribute { table: String, attribute: String },

    #[error("{table}: attribute '{attribute}' given more than once")]
    DuplicateAttribute { table: String, attribute: String },

    #[error("invalid assignment '{0}': attribute and value must be separated by '='")]
    MalformedAssignment(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{table} row '{value}' is still referenced by {referencing_table}.{referencing_column}")]
    ReferencedByOtherEntity {
        table: String,
        value: String,
        referencing_table: String,
        referencing_column: String,
    },

    #[error(transparent)]
    Engine(rusqlite::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                DbError::ConstraintViolation(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => DbError::Engine(err),
        }
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_failures_are_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY NOT NULL); INSERT INTO t VALUES (1);")
            .unwrap();
        let err: DbError = conn.execute("INSERT INTO t VALUES (1)", []).unwrap_err().into();
        assert!(matches!(err, DbError::ConstraintViolation(_)));

        let err: DbError = conn.execute("SELECT * FROM missing", []).unwrap_err().into();
        assert!(matches!(err, DbError::Engine(_)));
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = DbError::InvalidDateFormat {
            table: "flight".into(),
            column: "departure_date".into(),
            value: "2024/01/01".into(),
        };
        assert_eq!(
            err.to_string(),
            "flight.departure_date = '2024/01/01' is not a date (expected YYYY-MM-DD)"
        );
    }
}
