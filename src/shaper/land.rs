//! Coastline erosion and accretion around a fixed land center

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::Result;
use crate::core::types::Location;
use crate::grid::model::MapModel;
use crate::grid::terrain::{is_ocean, is_zero_class, LAND_TERRAINS, OCEAN};

/// Chance mass given to the ocean tiles of a neighbourhood; the land tiles
/// share the rest
const OCEAN_PULL: f64 = 0.4;

/// A tile and its in-bounds 3x3 neighbourhood
fn neighbourhood(model: &MapModel, center: Location) -> Vec<Location> {
    let mut tiles = Vec::with_capacity(9);
    for dy in -1..=1isize {
        for dx in -1..=1isize {
            if let Some(loc) = model.terrain.offset(center.row as isize + dy, center.col as isize + dx) {
                tiles.push(loc);
            }
        }
    }
    tiles
}

/// Reshape the coastline at one random spot
///
/// A tile near the shore is sampled, ocean neighbours weighted 0.4 and the
/// rest 0.6 in total. Water close to `land_center` tends to become land and
/// land far from it tends to flood. A tile whose terrain changed loses all
/// its resources. Returns the changed tile.
pub fn modify_land(model: &mut MapModel, land_center: Location, rng: &mut ChaCha8Rng) -> Result<Option<Location>> {
    let (rows, cols) = (model.rows(), model.cols());
    if rows == 0 || cols == 0 {
        return Ok(None);
    }
    let center = Location::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
    let tiles = neighbourhood(model, center);
    let oceans = tiles.iter().filter(|loc| is_ocean(model.terrain[**loc])).count();
    if oceans == 0 {
        return Ok(None);
    }

    let others = tiles.len() - oceans;
    let weights: Vec<f64> = tiles
        .iter()
        .map(|loc| {
            if is_ocean(model.terrain[*loc]) {
                OCEAN_PULL / oceans as f64
            } else {
                (1.0 - OCEAN_PULL) / others as f64
            }
        })
        .collect();
    let Ok(dist) = WeightedIndex::new(&weights) else {
        return Ok(None);
    };
    let target = tiles[dist.sample(rng)];

    let reach = target.manhattan(&land_center) as f64 / (rows + cols) as f64;
    let current = model.terrain[target];
    let replacement = if is_zero_class(current) {
        (rng.gen::<f64>() > 1.5 * reach).then(|| LAND_TERRAINS[rng.gen_range(0..LAND_TERRAINS.len())])
    } else {
        (rng.gen::<f64>() < reach).then_some(OCEAN)
    };

    let Some(terrain) = replacement else {
        return Ok(None);
    };
    model.terrain.set(target, terrain)?;
    model.clear_resources(target)?;
    tracing::trace!(%target, from = %current, to = %terrain, "Reshaped coastline");
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layer::Grid;
    use crate::grid::resource::code_for;
    use crate::grid::terrain::is_land;
    use rand::SeedableRng;

    #[test]
    fn test_all_land_map_never_changes() {
        let mut model = MapModel::new(Grid::new(6, 6, 'g'));
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(modify_land(&mut model, Location::new(3, 3), &mut rng).unwrap(), None);
        }
    }

    #[test]
    fn test_changes_clear_resources() {
        let mut terrain = Grid::new(8, 8, ' ');
        for loc in terrain.iter_locations().collect::<Vec<_>>() {
            if loc.col < 4 {
                terrain[loc] = 'g';
            }
        }
        let mut model = MapModel::new(terrain).with_resource_layers(1..=8);
        let bonus = code_for("resources").unwrap();
        for loc in model.terrain.iter_locations().collect::<Vec<_>>() {
            if model.terrain[loc] == 'g' {
                model.set_resource(loc, bonus).unwrap();
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut changed = 0;
        for _ in 0..300 {
            if let Some(loc) = modify_land(&mut model, Location::new(4, 0), &mut rng).unwrap() {
                changed += 1;
                let tile = model.terrain[loc];
                assert!(tile == OCEAN || is_land(tile));
                assert!(model.tile_resources(loc).unwrap().is_empty());
            }
        }
        assert!(changed > 0);
    }
}
