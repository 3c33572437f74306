//! Plain-text table layout

use crate::store::QueryResult;

const NULL_CELL: &str = "NULL";
const GAP: &str = "  ";

/// Lay out a result as a header line followed by one line per row, each
/// column padded to its widest cell
pub fn render_table(result: &QueryResult) -> Vec<String> {
    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &result.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.as_deref().unwrap_or(NULL_CELL).chars().count());
        }
    }

    let mut lines = Vec::with_capacity(result.rows.len() + 1);
    lines.push(render_line(result.columns.iter().map(String::as_str), &widths));
    for row in &result.rows {
        lines.push(render_line(
            row.iter().map(|cell| cell.as_deref().unwrap_or(NULL_CELL)),
            &widths,
        ));
    }
    lines
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    padded.join(GAP).trim_end().to_string()
}
