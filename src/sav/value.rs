//! Parsed representation of save-file field values

use serde::{Deserialize, Serialize};

/// One comma-separated cell, remembering whether it was written in quotes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub quoted: bool,
    pub text: String,
}

impl Cell {
    pub fn quoted(text: impl Into<String>) -> Self {
        Self { quoted: true, text: text.into() }
    }

    pub fn bare(text: impl Into<String>) -> Self {
        Self { quoted: false, text: text.into() }
    }

    /// Cell as it appears on a line; empty bare cells are written `""`
    pub fn render(&self) -> String {
        if self.quoted || self.text.is_empty() {
            format!("\"{}\"", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Header plus data rows of a `{ ... }` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Text of every row in one column
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(|c| c.text.as_str()).unwrap_or(""))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Single-line `key=cell,cell,...`
    Row(Vec<Cell>),
    /// `key={header` ... `}` that parsed as a table
    Table(Table),
    /// `key={` block kept as its raw lines because it is not a clean table
    RawTable(Vec<String>),
    /// `key=$` ... `$` verbatim text
    Code(String),
}

impl FieldValue {
    /// First cell of a row value
    pub fn first_cell(&self) -> Option<&Cell> {
        match self {
            FieldValue::Row(cells) => cells.first(),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            FieldValue::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            FieldValue::Code(text) => Some(text),
            _ => None,
        }
    }
}
