//! Top-k aggregation of a scope

use crate::core::error::Result;
use crate::core::types::{Fpt, Location, Weight};
use crate::grid::model::MapModel;
use crate::grid::terrain::is_zero_class;
use crate::rules::TileTables;

use super::property::{scope_properties, TileProperty};

/// Sort descending by score; with `keep_ocean` the first `k` productive
/// tiles come first and zero-class tiles are moved behind them
pub fn reorder(mut properties: Vec<TileProperty>, keep_ocean: bool, k: usize) -> Vec<TileProperty> {
    properties.sort_by(|a, b| b.score.total_cmp(&a.score));
    if !keep_ocean {
        return properties;
    }

    let mut head = Vec::with_capacity(k);
    let mut tail = Vec::new();
    let mut rest = properties.into_iter();
    for property in rest.by_ref() {
        if is_zero_class(property.terrain) {
            tail.push(property);
        } else {
            head.push(property);
        }
        if head.len() >= k {
            break;
        }
    }
    tail.extend(rest);
    tail.sort_by(|a, b| b.score.total_cmp(&a.score));
    head.extend(tail);
    head
}

/// Sum of the first `k` tiles (fewer if the scope is smaller)
pub fn topk_fpt(properties: &[TileProperty], k: usize) -> Fpt {
    properties.iter().take(k).map(TileProperty::fpt).sum()
}

#[derive(Debug, Clone)]
pub struct TopK {
    pub fpt: Fpt,
    pub score: f64,
    /// Every scope tile in top-k order
    pub properties: Vec<TileProperty>,
}

impl TopK {
    pub fn top(&self, k: usize) -> &[TileProperty] {
        &self.properties[..k.min(self.properties.len())]
    }
}

pub fn evaluate_topk(
    model: &MapModel,
    tables: &TileTables,
    weight: &Weight,
    scope: &[Location],
    k: usize,
    keep_ocean: bool,
) -> Result<TopK> {
    let properties = reorder(scope_properties(model, tables, weight, scope)?, keep_ocean, k);
    let fpt = topk_fpt(&properties, k);
    Ok(TopK { fpt, score: weight.apply(&fpt), properties })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RulesetTables;

    fn props(terrains: &str) -> Vec<TileProperty> {
        let tables = RulesetTables::classic().resolve().unwrap();
        let weight = Weight::default();
        terrains
            .chars()
            .enumerate()
            .map(|(i, t)| TileProperty::new(Location::new(0, i), t, vec![], &tables, &weight))
            .collect()
    }

    #[test]
    fn test_plain_sort_is_descending_and_stable() {
        let ordered = reorder(props("h fj"), false, 2);
        let terrains: String = ordered.iter().map(|p| p.terrain).collect();
        // forest 1.2, ocean 0.8, hills 0.4, jungle 0.4 (input order kept)
        assert_eq!(terrains, "f hj");
    }

    #[test]
    fn test_keep_ocean_pushes_zero_class_back() {
        let ordered = reorder(props("  hjfd"), true, 3);
        let terrains: String = ordered.iter().map(|p| p.terrain).collect();
        assert_eq!(&terrains[..3], "fhj");
        assert_eq!(topk_fpt(&ordered, 3), Fpt::new(3.0, 2.0, 0.0));
    }

    #[test]
    fn test_keep_ocean_falls_back_to_ocean_when_land_short() {
        let ordered = reorder(props(" :f"), true, 2);
        let terrains: String = ordered.iter().map(|p| p.terrain).collect();
        assert_eq!(terrains, "f :");
    }

    #[test]
    fn test_topk_shorter_than_k() {
        let ordered = reorder(props("gg"), true, 5);
        assert_eq!(topk_fpt(&ordered, 5), Fpt::new(4.0, 0.0, 0.0));
    }
}
