use std::fmt;

/// A value exactly as the user supplied it.
///
/// An empty (or all-whitespace) input is `Null`; everything else stays text
/// until the field validator resolves it against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Null,
    Text(String),
}

impl RawValue {
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            RawValue::Null
        } else {
            RawValue::Text(trimmed.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Null => None,
            RawValue::Text(s) => Some(s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::from_input(s)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("NULL"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// A typed value ready to be bound to a statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

impl From<&RawValue> for SqlValue {
    /// Untyped conversion, used for lookups where the column affinity does the coercion
    fn from(raw: &RawValue) -> Self {
        match raw {
            RawValue::Null => SqlValue::Null,
            RawValue::Text(s) => SqlValue::Text(s.clone()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Text(s) => f.write_str(s),
        }
    }
}
