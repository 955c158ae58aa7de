//! Tile ownership layers
//!
//! `owner` marks tiles belonging to a player, `eowner` the city center of a
//! player, `source` the id tying a tile to the city that claims it and
//! `worked` the city working the tile. Rows are comma-separated ids with
//! `-` for no mark.

use crate::core::error::{Result, ScenarioError};

use super::layer::Grid;

pub const EMPTY_MARK: &str = "-";

pub type OwnerGrid = Grid<Option<u32>>;

#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipLayers {
    pub owner: OwnerGrid,
    pub eowner: OwnerGrid,
    pub source: OwnerGrid,
    pub worked: OwnerGrid,
}

impl OwnershipLayers {
    pub fn empty(rows: usize, cols: usize) -> Self {
        let blank = Grid::new(rows, cols, None);
        Self { owner: blank.clone(), eowner: blank.clone(), source: blank.clone(), worked: blank }
    }
}

pub fn parse_ids(key: &str, text: &str) -> Result<Vec<Option<u32>>> {
    text.split(',')
        .map(|cell| {
            let cell = cell.trim();
            if cell == EMPTY_MARK {
                return Ok(None);
            }
            cell.parse().map(Some).map_err(|_| ScenarioError::Layer {
                key: key.to_string(),
                reason: format!("`{}` is neither an id nor `{}`", cell, EMPTY_MARK),
            })
        })
        .collect()
}

pub fn render_ids(ids: &[Option<u32>]) -> String {
    ids.iter()
        .map(|id| id.map(|v| v.to_string()).unwrap_or_else(|| EMPTY_MARK.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_row_roundtrip() {
        let ids = parse_ids("owner0000", "-,0,12,-").unwrap();
        assert_eq!(ids, vec![None, Some(0), Some(12), None]);
        assert_eq!(render_ids(&ids), "-,0,12,-");
    }

    #[test]
    fn test_bad_id_is_layer_error() {
        assert!(matches!(parse_ids("owner0000", "-,x"), Err(ScenarioError::Layer { .. })));
    }
}
