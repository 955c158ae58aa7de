//! Turning values back into save-file lines

use super::value::{Cell, FieldValue, Table};

/// `key="text"`, the shape of every map row
pub fn row_line(key: &str, text: &str) -> String {
    format!("{}=\"{}\"", key, text)
}

/// `key=value`, quoted only if the field it replaces was quoted
pub fn scalar_line(key: &str, original: Option<&FieldValue>, value: &str) -> String {
    let quoted = original
        .and_then(FieldValue::first_cell)
        .map(|c| c.quoted)
        .unwrap_or(false);
    if quoted {
        row_line(key, value)
    } else {
        format!("{}={}", key, value)
    }
}

pub fn cells_line(key: &str, cells: &[Cell]) -> String {
    let joined: Vec<String> = cells.iter().map(Cell::render).collect();
    format!("{}={}", key, joined.join(","))
}

/// `key={"c1","c2"`, one line per row, then `}`
pub fn table_block(key: &str, table: &Table) -> Vec<String> {
    let header: Vec<String> = table.columns.iter().map(|c| format!("\"{}\"", c)).collect();
    let mut lines = Vec::with_capacity(table.rows.len() + 2);
    lines.push(format!("{}={{{}", key, header.join(",")));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(Cell::render).collect();
        lines.push(cells.join(","));
    }
    lines.push("}".to_string());
    lines
}

/// Lines that re-create a parsed field
pub fn field_lines(key: &str, value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::Row(cells) => vec![cells_line(key, cells)],
        FieldValue::Table(table) => table_block(key, table),
        FieldValue::RawTable(raw) => match raw.split_first() {
            None => vec![format!("{}={{}}", key)],
            Some((first, rest)) => {
                let mut lines = vec![format!("{}={{{}", key, first)];
                lines.extend(rest.iter().cloned());
                lines.push("}".to_string());
                lines
            }
        },
        FieldValue::Code(text) => {
            let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
            if let Some(first) = lines.first_mut() {
                *first = format!("{}=${}", key, first);
            }
            if let Some(last) = lines.last_mut() {
                last.push('$');
            }
            lines
        }
    }
}
