//! Single-tile terrain and resource edits
//!
//! Every edit writes the map model and the tile's cached [`TileProperty`]
//! together, so the converger can keep working on its property list
//! without rereading the scope.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::{round_score, Weight};
use crate::grid::model::MapModel;
use crate::grid::terrain::LAKE;
use crate::rules::TileTables;
use crate::scoring::TileProperty;

/// What one mutation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    TerrainChange,
    ResourceReduce,
    ResourceBoost,
}

/// Share of lake tiles among the scope properties
pub fn lake_share(properties: &[TileProperty]) -> f64 {
    if properties.is_empty() {
        return 0.0;
    }
    let lakes = properties.iter().filter(|p| p.terrain == LAKE).count();
    lakes as f64 / properties.len() as f64
}

/// Random member of a bucket; lakes are passed over when `avoid_lake` is
/// set and the bucket has anything else
pub fn choose_terrain(members: &[char], avoid_lake: bool, rng: &mut ChaCha8Rng) -> Option<char> {
    if avoid_lake && members.contains(&LAKE) {
        let others: Vec<char> = members.iter().copied().filter(|t| *t != LAKE).collect();
        if let Some(terrain) = others.choose(rng) {
            return Some(*terrain);
        }
    }
    members.choose(rng).copied()
}

fn partial_score(property: &TileProperty) -> f64 {
    property.terrain_score + property.resource_score
}

/// Set a tile's terrain and drop the resources the new terrain does not
/// allow; returns the score delta
pub fn change_terrain(
    model: &mut MapModel,
    property: &mut TileProperty,
    terrain: char,
    tables: &TileTables,
    weight: &Weight,
) -> Result<f64> {
    let before = partial_score(property);
    model.terrain.set(property.location, terrain)?;
    property.terrain = terrain;
    property.terrain_fpt = tables.terrain_fpt(terrain);
    remove_inconsistent_resources(model, property, tables)?;
    property.rescore(weight);
    Ok(round_score(partial_score(property) - before))
}

/// Remove resources the tile's current terrain does not permit
pub fn remove_inconsistent_resources(
    model: &mut MapModel,
    property: &mut TileProperty,
    tables: &TileTables,
) -> Result<()> {
    let terrain = property.terrain;
    let (kept, dropped): (Vec<_>, Vec<_>) = property
        .resources
        .iter()
        .copied()
        .partition(|code| tables.permits(terrain, *code));
    for code in &dropped {
        model.clear_resource(property.location, code.layer)?;
        property.resource_fpt -= tables.resource_fpt(*code);
    }
    property.resources = kept;
    Ok(())
}

/// Drop the tile's last resource; `None` when it has none
pub fn remove_resource(
    model: &mut MapModel,
    property: &mut TileProperty,
    tables: &TileTables,
    weight: &Weight,
) -> Result<Option<f64>> {
    let before = partial_score(property);
    let Some(code) = property.resources.pop() else {
        return Ok(None);
    };
    model.clear_resource(property.location, code.layer)?;
    property.resource_fpt -= tables.resource_fpt(code);
    property.rescore(weight);
    Ok(Some(round_score(partial_score(property) - before)))
}

/// Place a random resource the terrain allows; `None` when nothing fits
///
/// Only resources with known productivity on a layer the map carries are
/// candidates. A resource already on the chosen layer is replaced.
pub fn add_resource(
    model: &mut MapModel,
    property: &mut TileProperty,
    tables: &TileTables,
    weight: &Weight,
    rng: &mut ChaCha8Rng,
) -> Result<Option<f64>> {
    let candidates: Vec<_> = tables
        .allowed_resources(property.terrain)
        .iter()
        .copied()
        .filter(|code| tables.has_resource(*code) && model.resources.contains_key(&code.layer))
        .collect();
    let Some(code) = candidates.choose(rng).copied() else {
        return Ok(None);
    };

    let before = partial_score(property);
    if let Some(pos) = property.resources.iter().position(|c| c.layer == code.layer) {
        let replaced = property.resources.remove(pos);
        property.resource_fpt -= tables.resource_fpt(replaced);
    }
    model.set_resource(property.location, code)?;
    property.resources.push(code);
    property.resource_fpt += tables.resource_fpt(code);
    property.rescore(weight);
    Ok(Some(round_score(partial_score(property) - before)))
}

/// Add or remove one resource with even odds
pub fn toggle_resource(
    model: &mut MapModel,
    property: &mut TileProperty,
    tables: &TileTables,
    weight: &Weight,
    rng: &mut ChaCha8Rng,
) -> Result<Option<f64>> {
    if rng.gen::<f64>() < 0.5 {
        add_resource(model, property, tables, weight, rng)
    } else {
        remove_resource(model, property, tables, weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Location;
    use crate::grid::layer::Grid;
    use crate::grid::resource::code_for;
    use crate::rules::RulesetTables;
    use crate::scoring::tile_property;
    use rand::SeedableRng;

    fn setup() -> (MapModel, TileTables) {
        let tables = RulesetTables::classic().resolve().unwrap();
        let model = MapModel::new(Grid::new(3, 3, 'm')).with_resource_layers(1..=8);
        (model, tables)
    }

    #[test]
    fn test_terrain_change_drops_disallowed_resource() {
        let (mut model, tables) = setup();
        let weight = Weight::default();
        let loc = Location::new(1, 1);
        let gold = code_for("gold").unwrap();
        model.set_resource(loc, gold).unwrap();
        let mut prop = tile_property(&model, &tables, &weight, loc).unwrap();
        assert_eq!(prop.score, 1.6);

        let delta = change_terrain(&mut model, &mut prop, 'g', &tables, &weight).unwrap();
        // mountains+gold 0.4+1.2 -> grassland 0.8
        assert_eq!(delta, -0.8);
        assert!(prop.resources.is_empty());
        assert_eq!(model.terrain[loc], 'g');
        assert!(model.tile_resources(loc).unwrap().is_empty());
        assert_eq!(prop, tile_property(&model, &tables, &weight, loc).unwrap());
    }

    #[test]
    fn test_remove_then_add_resource() {
        let (mut model, tables) = setup();
        let weight = Weight::default();
        let loc = Location::new(0, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut prop = tile_property(&model, &tables, &weight, loc).unwrap();
        assert_eq!(remove_resource(&mut model, &mut prop, &tables, &weight).unwrap(), None);

        let delta = add_resource(&mut model, &mut prop, &tables, &weight, &mut rng)
            .unwrap()
            .unwrap();
        assert!(delta > 0.0);
        assert_eq!(prop.resources.len(), 1);
        assert_eq!(prop, tile_property(&model, &tables, &weight, loc).unwrap());

        let back = remove_resource(&mut model, &mut prop, &tables, &weight).unwrap().unwrap();
        assert_eq!(back, -delta);
        assert!(model.tile_resources(loc).unwrap().is_empty());
    }

    #[test]
    fn test_add_resource_skips_missing_layers() {
        let tables = RulesetTables::classic().resolve().unwrap();
        let weight = Weight::default();
        let mut model = MapModel::new(Grid::new(1, 1, 'm'));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut prop = tile_property(&model, &tables, &weight, Location::new(0, 0)).unwrap();
        assert_eq!(add_resource(&mut model, &mut prop, &tables, &weight, &mut rng).unwrap(), None);
    }

    #[test]
    fn test_choose_terrain_avoids_lake() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            assert_eq!(choose_terrain(&['+', 'f'], true, &mut rng), Some('f'));
        }
        assert_eq!(choose_terrain(&['+'], true, &mut rng), Some('+'));
        assert_eq!(choose_terrain(&[], false, &mut rng), None);
    }

    #[test]
    fn test_lake_share() {
        let tables = RulesetTables::classic().resolve().unwrap();
        let weight = Weight::default();
        let props: Vec<_> = "++gg f"
            .chars()
            .enumerate()
            .map(|(i, t)| TileProperty::new(Location::new(0, i), t, vec![], &tables, &weight))
            .collect();
        assert!((lake_share(&props) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(lake_share(&[]), 0.0);
    }
}
