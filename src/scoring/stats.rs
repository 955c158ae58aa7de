//! Whole-map score surfaces and summary statistics

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::{round_score, Location, Weight};
use crate::grid::layer::Grid;
use crate::grid::model::MapModel;
use crate::grid::terrain::{is_blocked, is_zero_class};
use crate::rules::TileTables;

use super::scope::{city_scope, max_turns_scope, ScopeMode};
use super::topk::evaluate_topk;

pub const PERCENTILES: [u8; 11] = [5, 10, 20, 30, 40, 50, 60, 70, 80, 90, 95];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    /// `(percentile, value)` for each of [`PERCENTILES`]
    pub percentiles: Vec<(u8, f64)>,
}

impl ScoreSummary {
    /// Population statistics, every value at comparison precision;
    /// `None` for an empty sample
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            count: sorted.len(),
            min: round_score(sorted[0]),
            max: round_score(sorted[sorted.len() - 1]),
            mean: round_score(mean),
            std: round_score(variance.sqrt()),
            percentiles: PERCENTILES
                .iter()
                .map(|&p| (p, round_score(interpolate(&sorted, p as f64))))
                .collect(),
        })
    }

    pub fn percentile(&self, p: u8) -> Option<f64> {
        self.percentiles.iter().find(|(q, _)| *q == p).map(|(_, v)| *v)
    }
}

/// Linear interpolation between closest ranks
fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let pos = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Top-k score of a city founded on every tile (looped scope)
pub fn score_map(
    model: &MapModel,
    tables: &TileTables,
    weight: &Weight,
    topk: usize,
    keep_ocean: bool,
) -> Result<Grid<f64>> {
    let terrain = &model.terrain;
    let rows = (0..terrain.rows)
        .into_par_iter()
        .map(|row| {
            (0..terrain.cols)
                .map(|col| {
                    let scope = city_scope(terrain, Location::new(row, col), ScopeMode::Loop)?;
                    Ok(evaluate_topk(model, tables, weight, &scope, topk, keep_ocean)?.score)
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;
    Grid::from_rows("score", rows)
}

/// Summary over the whole score surface
pub fn map_summary(scores: &Grid<f64>) -> Option<ScoreSummary> {
    let values: Vec<f64> = scores.iter().map(|(_, s)| *s).collect();
    ScoreSummary::from_scores(&values)
}

/// Summary over productive tiles a unit can reach within `max_turns`
pub fn unit_summary(
    model: &MapModel,
    scores: &Grid<f64>,
    unit: Location,
    max_turns: usize,
) -> Option<ScoreSummary> {
    let values: Vec<f64> = max_turns_scope(scores, unit, max_turns)
        .into_iter()
        .filter(|loc| !is_zero_class(model.terrain[*loc]))
        .map(|loc| scores[loc])
        .collect();
    ScoreSummary::from_scores(&values)
}

/// Tiles scoring strictly above `threshold`, optionally within a set
pub fn optimal_locations(
    scores: &Grid<f64>,
    threshold: f64,
    within: Option<&[Location]>,
) -> Vec<Location> {
    scores
        .iter()
        .filter(|(loc, score)| {
            **score > threshold && within.map_or(true, |tiles| tiles.contains(loc))
        })
        .map(|(loc, _)| loc)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScopeStatistics {
    pub terrain: BTreeMap<char, usize>,
    /// Keyed by resource code (`e03_4`)
    pub resources: BTreeMap<String, usize>,
}

/// Terrain and resource histograms over the half-looped city scopes of
/// every tile a city could stand on
pub fn scope_statistics(model: &MapModel) -> Result<ScopeStatistics> {
    let terrain = &model.terrain;
    let mut stats = ScopeStatistics::default();
    for center in terrain.iter_locations() {
        let inside = center.row >= 1
            && center.col >= 1
            && center.row + 1 < terrain.rows
            && center.col + 1 < terrain.cols;
        if !inside || is_blocked(terrain[center]) {
            continue;
        }
        for loc in city_scope(terrain, center, ScopeMode::HalfLoop)? {
            *stats.terrain.entry(terrain[loc]).or_insert(0) += 1;
            for code in model.tile_resources(loc)? {
                *stats.resources.entry(code.to_string()).or_insert(0) += 1;
            }
        }
    }
    Ok(stats)
}
