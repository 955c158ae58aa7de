//! A player's units and cities as read from its save section

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Location;
use crate::sav::{Overrides, SavDocument};

use super::cluster::ColonyDemand;
use super::records::{RecordTable, CITY_TABLE, UNIT_TABLE};

/// Column naming a unit's type
pub const UNIT_KIND_COLUMN: &str = "type_by_name";
/// Columns that may hold a city's owning player id, in preference order
pub const CITY_OWNER_COLUMNS: [&str; 2] = ["owner", "original"];

#[derive(Debug, Clone, PartialEq)]
pub struct Colony {
    pub section: String,
    /// Number after `player` in the section name
    pub index: usize,
    pub units: Option<RecordTable>,
    pub cities: Option<RecordTable>,
}

impl Colony {
    pub fn from_document(doc: &SavDocument, section: &str) -> Result<Option<Self>> {
        let Some(index) = section.strip_prefix("player").and_then(|n| n.parse().ok()) else {
            return Ok(None);
        };
        let table = |key: &str| -> Result<Option<RecordTable>> {
            doc.field(section, key)
                .map(|f| RecordTable::from_value(section, key, &f.value))
                .transpose()
        };
        Ok(Some(Self {
            section: section.to_string(),
            index,
            units: table(UNIT_TABLE)?,
            cities: table(CITY_TABLE)?,
        }))
    }

    /// Unit type names, in table order
    pub fn unit_kinds(&self) -> Vec<&str> {
        let Some(units) = &self.units else {
            return Vec::new();
        };
        (0..units.len())
            .map(|row| units.text(row, UNIT_KIND_COLUMN).unwrap_or(""))
            .collect()
    }

    pub fn demand(&self) -> ColonyDemand {
        ColonyDemand::from_units(&self.unit_kinds())
    }

    /// `(type, location)` of every unit
    pub fn unit_positions(&self) -> Result<Vec<(String, Location)>> {
        let Some(units) = &self.units else {
            return Ok(Vec::new());
        };
        let kinds = self.unit_kinds();
        units
            .locations()?
            .into_iter()
            .zip(kinds)
            .map(|(loc, kind)| Ok((kind.to_string(), loc)))
            .collect()
    }

    pub fn city_positions(&self) -> Result<Vec<Location>> {
        self.cities.as_ref().map_or(Ok(Vec::new()), RecordTable::locations)
    }

    /// `(owner, city id)` of a city row
    pub fn city_ids(&self, row: usize) -> Result<(u32, u32)> {
        let Some(cities) = &self.cities else {
            return Err(ScenarioError::Layer {
                key: format!("{}/{}", self.section, CITY_TABLE),
                reason: "layer not present".into(),
            });
        };
        let owner_column = CITY_OWNER_COLUMNS
            .iter()
            .find(|c| cities.text(row, c).is_some())
            .copied()
            .unwrap_or(CITY_OWNER_COLUMNS[0]);
        Ok((cities.number(row, owner_column)?, cities.number(row, "id")?))
    }

    /// Replace the unit and city tables that moved a record in `overrides`
    pub fn write_overrides(&self, overrides: &mut Overrides) {
        for table in [&self.units, &self.cities].into_iter().flatten().filter(|t| t.is_changed()) {
            overrides.replace(&self.section, table.key(), table.lines());
        }
    }
}

/// Every player section, in file order
pub fn read_colonies(doc: &SavDocument) -> Result<Vec<Colony>> {
    let mut colonies = Vec::new();
    for section in doc.players() {
        if let Some(colony) = Colony::from_document(doc, section)? {
            colonies.push(colony);
        }
    }
    Ok(colonies)
}
