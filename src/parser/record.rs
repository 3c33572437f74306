use crate::error::{DbError, DbResult};

use super::value::RawValue;

/// Separates rows when several are given in one piece of input
pub const ROW_DELIMITER: char = ';';

/// Parse one comma-separated row. Fields are trimmed and empty fields become NULL.
pub fn parse_row(line: &str) -> Vec<RawValue> {
    line.split(',').map(RawValue::from_input).collect()
}

/// Parse a batch of rows separated by `;`. Blank rows are skipped.
pub fn parse_rows(input: &str) -> Vec<Vec<RawValue>> {
    input
        .split(ROW_DELIMITER)
        .filter(|row| !row.trim().is_empty())
        .map(parse_row)
        .collect()
}

/// Parse a `name=value` assignment. An empty value is an explicit NULL.
pub fn parse_assignment(input: &str) -> DbResult<(String, RawValue)> {
    let (name, value) = split_pair(input)?;
    Ok((name, RawValue::from_input(value)))
}

/// Parse a `name=value` equality filter. The value is kept verbatim (trimmed).
pub fn parse_filter(input: &str) -> DbResult<(String, String)> {
    let (name, value) = split_pair(input)?;
    Ok((name, value.trim().to_string()))
}

fn split_pair(input: &str) -> DbResult<(String, &str)> {
    let mut parts = input.splitn(2, '=');
    let name = parts.next().unwrap_or_default().trim();
    match parts.next() {
        Some(value) if !name.is_empty() && !value.contains('=') => Ok((name.to_string(), value)),
        _ => Err(DbError::MalformedAssignment(input.trim().to_string())),
    }
}
