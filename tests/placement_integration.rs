//! Integration tests for clustering, unit and city seeding, ownership and
//! visibility over the fixture save

use ahash::AHashSet;
use civ_scenario::core::config::GenerationConfig;
use civ_scenario::core::types::Location;
use civ_scenario::grid::model::LayerKey;
use civ_scenario::grid::terrain::{is_blocked, is_ocean, UNKNOWN};
use civ_scenario::grid::{MapModel, OwnershipLayers};
use civ_scenario::placement::{misaligned_tiles, place_cities, read_colonies};
use civ_scenario::rules::units::is_ocean_unit;
use civ_scenario::rules::RulesetTables;
use civ_scenario::sav::SavDocument;
use civ_scenario::scenario::Scenario;
use civ_scenario::scoring::{city_scope, ScopeMode};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SMALL: &str = include_str!("fixtures/small.sav");

fn regenerated(seed: u64) -> (Scenario, civ_scenario::scenario::RegenReport) {
    let scenario = Scenario::from_document(SavDocument::parse(SMALL).unwrap()).unwrap();
    let tables = scenario.tables(RulesetTables::classic()).unwrap();
    let config = GenerationConfig { max_steps: 6, ..Default::default() };
    scenario.regenerate(&tables, &config, seed, 20).unwrap()
}

fn marked(grid: &civ_scenario::grid::Grid<Option<u32>>, id: u32) -> Vec<Location> {
    grid.iter().filter(|(_, v)| **v == Some(id)).map(|(l, _)| l).collect()
}

// ============================================================================
// Full regeneration
// ============================================================================

#[test]
fn test_units_stand_on_matching_terrain_in_their_cluster() {
    let (scenario, report) = regenerated(1);
    assert_eq!(report.clusters.len(), 2);

    for (colony, cluster) in scenario.colonies.iter().zip(&report.clusters) {
        for (kind, loc) in colony.unit_positions().unwrap() {
            let terrain = scenario.model.terrain[loc];
            if is_ocean_unit(&kind) {
                assert!(cluster.ocean.contains(&loc));
                assert!(is_ocean(terrain));
            } else {
                assert!(cluster.land.contains(&loc));
                assert!(!is_blocked(terrain));
            }
        }
    }
}

#[test]
fn test_cities_move_with_their_ownership() {
    let (scenario, report) = regenerated(2);
    assert_eq!(report.cities_placed, 2);
    let own = scenario.model.ownership.as_ref().unwrap();

    for (player, colony) in scenario.colonies.iter().enumerate() {
        let center = colony.city_positions().unwrap()[0];
        let (owner, city) = colony.city_ids(0).unwrap();
        assert_eq!(owner, player as u32);
        assert_eq!(marked(&own.eowner, owner), vec![center]);

        let scope = city_scope(&own.worked, center, ScopeMode::HalfLoop).unwrap();
        let worked = marked(&own.worked, city);
        assert_eq!(worked.len(), 2);
        assert!(worked.contains(&center));
        assert!(worked.iter().all(|l| scope.contains(l)));
        assert!(marked(&own.owner, owner).iter().all(|l| scope.contains(l)));
    }
}

/// The fixture save without its owner/eowner/source/worked rows
fn unowned_save() -> String {
    SMALL
        .lines()
        .filter(|line| !["owner", "eowner", "source", "worked"].iter().any(|k| {
            line.strip_prefix(k).is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        }))
        .map(|line| format!("{line}\n"))
        .collect()
}

#[test]
fn test_cities_move_without_ownership_layers() {
    let scenario = Scenario::from_document(SavDocument::parse(&unowned_save()).unwrap()).unwrap();
    assert!(scenario.model.ownership.is_none());
    let tables = scenario.tables(RulesetTables::classic()).unwrap();
    let config = GenerationConfig { max_steps: 6, ..Default::default() };
    let (regenerated, report) = scenario.regenerate(&tables, &config, 2, 20).unwrap();

    assert_eq!(report.cities_placed, 2);
    assert!(regenerated.model.ownership.is_none());
    for (colony, cluster) in regenerated.colonies.iter().zip(&report.clusters) {
        let center = colony.city_positions().unwrap()[0];
        assert!(cluster.land.contains(&center));
        assert!(!is_blocked(regenerated.model.terrain[center]));
    }

    let doc = SavDocument::parse(&regenerated.render().unwrap()).unwrap();
    let colonies = read_colonies(&doc).unwrap();
    for (read, moved) in colonies.iter().zip(&regenerated.colonies) {
        assert_eq!(read.city_positions().unwrap(), moved.city_positions().unwrap());
    }
}

#[test]
fn test_visibility_follows_new_positions() {
    let (scenario, _) = regenerated(3);
    let model = &scenario.model;
    let seen = model.char_layer(LayerKey::Seen).unwrap();

    for colony in &scenario.colonies {
        let player = model.player(colony.index).unwrap();
        let known = player.terrain.as_ref().unwrap();
        let center = colony.city_positions().unwrap()[0];
        assert_eq!(known[center], model.terrain[center]);
        assert!(misaligned_tiles(model, colony.index).is_empty());
    }

    // a seen mark names a player that knows the tile
    for (loc, mark) in seen.iter() {
        match mark.to_digit(36) {
            Some(0) => {}
            Some(n) => {
                let known = model.player(n as usize - 1).unwrap().terrain.as_ref().unwrap();
                assert_ne!(known[loc], UNKNOWN);
            }
            None => panic!("bad seen mark {mark}"),
        }
    }
}

#[test]
fn test_rendered_save_reads_back() {
    let (scenario, report) = regenerated(4);
    let text = scenario.render().unwrap();
    let doc = SavDocument::parse(&text).unwrap();
    let model = MapModel::from_document(&doc).unwrap();
    assert_eq!(model.terrain, scenario.model.terrain);
    assert_eq!(model.ownership, scenario.model.ownership);

    let colonies = read_colonies(&doc).unwrap();
    let settlers = colonies[1].unit_positions().unwrap()[0].1;
    assert!(report.clusters[1].land.contains(&settlers));

    // untouched sections replay verbatim
    assert!(text.contains("code=$-- scenario hooks\nfunction turn_begin()\nend$\n"));
    assert!(text.contains("[game]\nturn=12\nname=\"Small Test World\"\n"));
    assert_eq!(text.lines().count(), SMALL.lines().count());
}

#[test]
fn test_same_seed_same_scenario() {
    let (a, report_a) = regenerated(8);
    let (b, report_b) = regenerated(8);
    assert_eq!(a.render().unwrap(), b.render().unwrap());
    assert_eq!(report_a.seed, report_b.seed);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// No tile is worked twice and every worked tile lies in its city's scope
    #[test]
    fn prop_ownership_exclusivity(
        centers in prop::collection::btree_set((0usize..16, 0usize..16), 1..5),
        workers in prop::collection::vec(0usize..8, 5),
        seed in any::<u64>(),
    ) {
        let mut own = OwnershipLayers::empty(16, 16);
        let mut tiles = (0..16).flat_map(|r| (0..16).map(move |c| Location::new(r, c)));
        let cities: Vec<(u32, Location)> = centers
            .iter()
            .enumerate()
            .map(|(i, (r, c))| (i as u32 + 1, Location::new(*r, *c)))
            .collect();
        for (i, (city, _)) in cities.iter().enumerate() {
            for _ in 0..workers[i] {
                if let Some(loc) = tiles.next() {
                    own.worked[loc] = Some(*city);
                }
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        place_cities(&mut own, 7, &cities, &mut rng).unwrap();

        let mut seen = AHashSet::new();
        for (city, center) in &cities {
            let scope = city_scope(&own.worked, *center, ScopeMode::HalfLoop).unwrap();
            for loc in marked(&own.worked, *city) {
                prop_assert!(scope.contains(&loc));
                prop_assert!(seen.insert(loc));
            }
            prop_assert_eq!(own.eowner[*center], Some(7));
        }
        prop_assert_eq!(marked(&own.eowner, 7).len(), cities.len());
    }
}
