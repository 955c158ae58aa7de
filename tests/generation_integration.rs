//! Integration tests for scoring and the stochastic map shaper
//!
//! Covers the scope geometry and scoring properties, connectivity, and
//! full shaping passes over the fixture save.

use civ_scenario::core::config::GenerationConfig;
use civ_scenario::core::types::{Fpt, Location, ScoreBound, Weight};
use civ_scenario::grid::terrain::is_zero_class;
use civ_scenario::grid::{Grid, MapModel};
use civ_scenario::rules::{RulesetTables, TileTables};
use civ_scenario::sav::SavDocument;
use civ_scenario::scoring::{
    city_scope, connectivity, evaluate_topk, map_summary, reorder, scope, score_map, ScopeMode, TileProperty,
};
use civ_scenario::shaper::{converge, random_map, shape_map, ShapeContext};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SMALL: &str = include_str!("fixtures/small.sav");

fn fixture() -> (MapModel, TileTables) {
    let doc = SavDocument::parse(SMALL).unwrap();
    let model = MapModel::from_document(&doc).unwrap();
    let tables = RulesetTables::classic().with_idents(&doc.terrain_idents()).resolve().unwrap();
    (model, tables)
}

// ============================================================================
// Connectivity
// ============================================================================

#[test]
fn test_two_blob_connectivity() {
    let terrain = Grid::from_text_rows("t", &["gg g", "g  g", "   g", "  gg"]).unwrap();
    let result = connectivity(&terrain);
    assert_eq!(result.component_count, 2);
    assert_eq!(result.largest_component_size, 5);
    assert!(result.largest_component_tiles.contains(&Location::new(0, 3)));
}

// ============================================================================
// Shaping passes
// ============================================================================

#[test]
fn test_shaping_is_deterministic_per_seed() {
    let (model, tables) = fixture();
    let config = GenerationConfig { max_steps: 6, ..Default::default() };

    let run = |seed| {
        let mut shaped = model.clone();
        let report = shape_map(&mut shaped, &tables, &config, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        (shaped, report)
    };
    let (a, report_a) = run(42);
    let (b, report_b) = run(42);
    assert_eq!(a, b);
    assert_eq!(report_a, report_b);
    assert_eq!(report_a.mutations.len(), 6);
}

#[test]
fn test_shaping_writes_only_ruleset_terrain() {
    let (mut model, tables) = fixture();
    let config = GenerationConfig { max_steps: 10, ..Default::default() };
    shape_map(&mut model, &tables, &config, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    assert!(model.terrain.iter().all(|(_, t)| tables.has_terrain(*t)));
    assert_eq!((model.rows(), model.cols()), (14, 20));
}

#[test]
fn test_band_containing_score_needs_no_mutation() {
    let (mut model, tables) = fixture();
    let config = GenerationConfig::default();
    let ctx = ShapeContext::new(&tables, &config);
    let scope = city_scope(&model.terrain, Location::new(6, 8), ScopeMode::Raw).unwrap();
    let topk = evaluate_topk(&model, &tables, &config.weight, &scope, config.topk, config.keep_ocean).unwrap();
    let before = model.clone();

    let mut properties = topk.properties;
    let bound = ScoreBound::new(topk.score, topk.score);
    let applied = converge(&ctx, &mut model, &mut properties, bound, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
    assert!(applied.is_empty());
    assert_eq!(model, before);
}

#[test]
fn test_wide_bound_shaping_applies_no_convergence() {
    let (mut model, tables) = fixture();
    let config = GenerationConfig {
        max_steps: 4,
        score_bound: Some(ScoreBound::new(0.0, 1000.0)),
        ..Default::default()
    };
    let report = shape_map(&mut model, &tables, &config, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
    assert_eq!(report.total_mutations(), 0);
}

#[test]
fn test_random_map_then_score_surface() {
    let (mut model, tables) = fixture();
    random_map(&mut model, &tables, 0.3, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
    assert!(model.terrain.iter().all(|(_, t)| *t != 'i'));
    assert_eq!(model.terrain.row_text(0), "a".repeat(20));

    let config = GenerationConfig::default();
    let scores = score_map(&model, &tables, &config.weight, config.topk, config.keep_ocean).unwrap();
    assert_eq!((scores.rows, scores.cols), (14, 20));
    let summary = map_summary(&scores).unwrap();
    assert_eq!(summary.count, 280);
    let median = summary.percentile(50).unwrap();
    assert!(summary.min <= median && median <= summary.max);
}

// ============================================================================
// Properties
// ============================================================================

const MIX: [char; 8] = [' ', ':', 'a', 'd', 'g', 'h', 'f', 'p'];

fn classic() -> TileTables {
    RulesetTables::classic().resolve().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Looped scopes have one size everywhere; half-looped scopes stay on the map
    #[test]
    fn prop_scope_symmetry(rows in 5usize..30, cols in 5usize..30, r in 0usize..30, c in 0usize..30, depth in 1usize..4) {
        let grid = Grid::new(rows, cols, 'g');
        let center = Location::new(r % rows, c % cols);
        let expected = (2 * depth + 1).pow(2) - 4;
        prop_assert_eq!(scope(&grid, center, depth, ScopeMode::Loop).unwrap().len(), expected);

        let half = scope(&grid, center, depth, ScopeMode::HalfLoop).unwrap();
        prop_assert!(half.len() <= expected);
        prop_assert!(half.iter().all(|loc| loc.row < rows && loc.col < cols));
    }

    /// Raising one weight never lowers the score of a tile producing that output
    #[test]
    fn prop_weight_monotonicity(
        food in 0u8..6, shield in 0u8..6, trade in 0u8..6,
        w in (0.0f64..2.0, 0.0f64..2.0, 0.0f64..2.0),
        component in 0usize..3, bump in 0.0f64..2.0,
    ) {
        let fpt = Fpt::new(food as f64, shield as f64, trade as f64);
        let base = Weight::new(w.0, w.1, w.2);
        let mut raised = base;
        match component {
            0 => raised.food += bump,
            1 => raised.shield += bump,
            _ => raised.trade += bump,
        }
        prop_assert!(raised.score(&fpt) >= base.score(&fpt));
    }

    /// With enough productive tiles, keep-ocean leaves zero-class tiles out of the top k
    #[test]
    fn prop_topk_ocean_policy(picks in prop::collection::vec(0usize..MIX.len(), 1..30), k in 1usize..10) {
        let tables = classic();
        let weight = Weight::default();
        let properties: Vec<TileProperty> = picks
            .iter()
            .enumerate()
            .map(|(i, p)| TileProperty::new(Location::new(0, i), MIX[*p], vec![], &tables, &weight))
            .collect();
        let productive = properties.iter().filter(|p| !is_zero_class(p.terrain)).count();
        prop_assume!(productive >= k);

        let ranked = reorder(properties, true, k);
        prop_assert!(ranked.iter().take(k).all(|p| !is_zero_class(p.terrain)));
    }
}
