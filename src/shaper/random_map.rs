//! Uniformly random terrain and resources

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, ScenarioError};
use crate::grid::model::MapModel;
use crate::grid::terrain::INACCESSIBLE;
use crate::rules::TileTables;

/// Replace every tile with random terrain and at most one random resource
///
/// The first and last rows keep their terrain. Each tile gains a resource
/// its terrain allows with probability `resource_prob`.
pub fn random_map(
    model: &mut MapModel,
    tables: &TileTables,
    resource_prob: f64,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let terrains: Vec<char> = tables.terrains().iter().copied().filter(|t| *t != INACCESSIBLE).collect();
    if terrains.is_empty() {
        return Err(ScenarioError::Config("ruleset has no placeable terrain".into()));
    }

    let rows = model.rows();
    let locations: Vec<_> = model.terrain.iter_locations().collect();
    for loc in locations {
        if loc.row > 0 && loc.row + 1 < rows {
            model.terrain[loc] = terrains[rng.gen_range(0..terrains.len())];
        }

        model.clear_resources(loc)?;
        let terrain = model.terrain[loc];
        if terrain == INACCESSIBLE || rng.gen::<f64>() >= resource_prob {
            continue;
        }
        let allowed: Vec<_> = tables
            .allowed_resources(terrain)
            .iter()
            .copied()
            .filter(|code| model.resources.contains_key(&code.layer))
            .collect();
        if let Some(code) = allowed.choose(rng) {
            model.set_resource(loc, *code)?;
        }
    }

    tracing::info!(rows, cols = model.cols(), "Generated random map");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layer::Grid;
    use crate::rules::RulesetTables;
    use rand::SeedableRng;

    #[test]
    fn test_edges_kept_and_resources_allowed() {
        let tables = RulesetTables::classic().resolve().unwrap();
        let mut model = MapModel::new(Grid::new(10, 12, 'a')).with_resource_layers(1..=8);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        random_map(&mut model, &tables, 0.5, &mut rng).unwrap();

        assert!(model.terrain.row(0).iter().all(|t| *t == 'a'));
        assert!(model.terrain.row(9).iter().all(|t| *t == 'a'));
        assert!(model.terrain.iter().all(|(_, t)| *t != INACCESSIBLE));
        let mut with_resource = 0;
        for loc in model.terrain.iter_locations() {
            let codes = model.tile_resources(loc).unwrap();
            assert!(codes.len() <= 1);
            for code in codes {
                assert!(tables.permits(model.terrain[loc], code));
                with_resource += 1;
            }
        }
        assert!(with_resource > 0);
    }

    #[test]
    fn test_zero_probability_clears_resources() {
        let tables = RulesetTables::classic().resolve().unwrap();
        let mut model = MapModel::new(Grid::new(4, 4, 'm')).with_resource_layers(1..=8);
        let gold = crate::grid::resource::code_for("gold").unwrap();
        model.set_resource(crate::core::types::Location::new(0, 0), gold).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        random_map(&mut model, &tables, 0.0, &mut rng).unwrap();
        assert!(model.tile_resources(crate::core::types::Location::new(0, 0)).unwrap().is_empty());
    }
}
