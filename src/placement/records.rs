//! Typed access to the unit (`u`) and city (`c`) tables of a player section

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Location;
use crate::sav::render::table_block;
use crate::sav::{Cell, FieldValue, Table};

pub const UNIT_TABLE: &str = "u";
pub const CITY_TABLE: &str = "c";

/// A record table whose rows carry `x` (column) and `y` (row) positions
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    section: String,
    key: String,
    table: Table,
    x: usize,
    y: usize,
    /// Set once a position cell differs from the parsed table
    changed: bool,
}

impl RecordTable {
    pub fn from_value(section: &str, key: &str, value: &FieldValue) -> Result<Self> {
        let layer_error = |reason: &str| ScenarioError::Layer {
            key: format!("{}/{}", section, key),
            reason: reason.to_string(),
        };
        let table = value.as_table().ok_or_else(|| layer_error("not a table"))?;
        let x = table.column_index("x").ok_or_else(|| layer_error("no x column"))?;
        let y = table.column_index("y").ok_or_else(|| layer_error("no y column"))?;
        Ok(Self {
            section: section.to_string(),
            key: key.to_string(),
            table: table.clone(),
            x,
            y,
            changed: false,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn len(&self) -> usize {
        self.table.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }

    fn error(&self, row: usize, reason: String) -> ScenarioError {
        ScenarioError::Layer { key: format!("{}/{}[{}]", self.section, self.key, row), reason }
    }

    /// Cell text of `column` in `row`, if both exist
    pub fn text(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.table.column_index(column)?;
        self.table.rows.get(row)?.get(index).map(|c| c.text.as_str())
    }

    pub fn number(&self, row: usize, column: &str) -> Result<u32> {
        let text = self
            .text(row, column)
            .ok_or_else(|| self.error(row, format!("no `{}` cell", column)))?;
        text.trim()
            .parse()
            .map_err(|_| self.error(row, format!("`{}` is not a number: {:?}", column, text)))
    }

    pub fn location(&self, row: usize) -> Result<Location> {
        let col = self.number(row, "x")?;
        let r = self.number(row, "y")?;
        Ok(Location::new(r as usize, col as usize))
    }

    pub fn locations(&self) -> Result<Vec<Location>> {
        (0..self.len()).map(|row| self.location(row)).collect()
    }

    pub fn set_location(&mut self, row: usize, loc: Location) -> Result<()> {
        let (x, y) = (self.x, self.y);
        let cells = self
            .table
            .rows
            .get_mut(row)
            .ok_or_else(|| ScenarioError::Config(format!("record {} out of range", row)))?;
        for (index, value) in [(x, loc.col), (y, loc.row)] {
            let Some(cell) = cells.get_mut(index) else {
                continue;
            };
            let text = value.to_string();
            if cell.text.trim() != text {
                *cell = Cell::bare(text);
                self.changed = true;
            }
        }
        Ok(())
    }

    pub fn lines(&self) -> Vec<String> {
        table_block(&self.key, &self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sav::SavDocument;

    const UNITS: &str = "[player0]\nu={\"id\",\"x\",\"y\",\"type_by_name\"\n101,4,7,\"Settlers\"\n102,5,7,\"Trireme\"\n}\n";

    fn units() -> RecordTable {
        let doc = SavDocument::parse(UNITS).unwrap();
        let field = doc.field("player0", "u").unwrap();
        RecordTable::from_value("player0", "u", &field.value).unwrap()
    }

    #[test]
    fn test_reads_positions() {
        let table = units();
        assert_eq!(table.len(), 2);
        assert_eq!(table.location(0).unwrap(), Location::new(7, 4));
        assert_eq!(table.text(1, "type_by_name"), Some("Trireme"));
        assert_eq!(table.number(1, "id").unwrap(), 102);
        assert!(table.number(0, "type_by_name").is_err());
    }

    #[test]
    fn test_set_location_rewrites_block() {
        let mut table = units();
        table.set_location(1, Location::new(2, 9)).unwrap();
        assert_eq!(
            table.lines(),
            vec![
                "u={\"id\",\"x\",\"y\",\"type_by_name\"".to_string(),
                "101,4,7,\"Settlers\"".to_string(),
                "102,9,2,\"Trireme\"".to_string(),
                "}".to_string(),
            ]
        );
    }

    #[test]
    fn test_same_location_leaves_table_unchanged() {
        let mut table = units();
        table.set_location(0, Location::new(7, 4)).unwrap();
        assert!(!table.is_changed());
        table.set_location(0, Location::new(7, 5)).unwrap();
        assert!(table.is_changed());
    }

    #[test]
    fn test_row_without_table_rejected() {
        let doc = SavDocument::parse("[player0]\nu=3\n").unwrap();
        let field = doc.field("player0", "u").unwrap();
        assert!(RecordTable::from_value("player0", "u", &field.value).is_err());
    }
}
