//! Terrains grouped by weighted score
//!
//! Shifting a tile one bucket up or down is the coarse step the converger
//! uses to move a scope score; picking inside the same bucket changes the
//! look of the map without changing its score.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::core::types::Weight;
use crate::grid::terrain::is_zero_class;
use crate::rules::TileTables;

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainBuckets {
    buckets: BTreeMap<OrderedFloat<f64>, Vec<char>>,
}

impl TerrainBuckets {
    /// Zero-score terrains never form a bucket; with `keep_ocean` the
    /// zero-class terrains are left out as well
    pub fn new(tables: &TileTables, weight: &Weight, keep_ocean: bool) -> Self {
        let mut buckets: BTreeMap<OrderedFloat<f64>, Vec<char>> = BTreeMap::new();
        for &terrain in tables.terrains() {
            if keep_ocean && is_zero_class(terrain) {
                continue;
            }
            let score = weight.score(&tables.terrain_fpt(terrain));
            if score == 0.0 {
                continue;
            }
            buckets.entry(OrderedFloat(score)).or_default().push(terrain);
        }
        tracing::debug!(buckets = buckets.len(), "Grouped terrains by score");
        Self { buckets }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket scores, ascending
    pub fn keys(&self) -> Vec<f64> {
        self.buckets.keys().map(|k| k.0).collect()
    }

    pub fn lowest(&self) -> Option<f64> {
        self.buckets.keys().next().map(|k| k.0)
    }

    pub fn highest(&self) -> Option<f64> {
        self.buckets.keys().next_back().map(|k| k.0)
    }

    pub fn members(&self, score: f64) -> Option<&[char]> {
        self.buckets.get(&OrderedFloat(score)).map(Vec::as_slice)
    }

    /// The bucket adjacent to `score` in direction `step` (+1 up, -1 down);
    /// `None` past either end or when `score` is not a bucket
    pub fn neighbour(&self, score: f64, step: isize) -> Option<(f64, &[char])> {
        let key = OrderedFloat(score);
        if !self.buckets.contains_key(&key) {
            return None;
        }
        let found = if step >= 0 {
            self.buckets.range((std::ops::Bound::Excluded(key), std::ops::Bound::Unbounded)).next()
        } else {
            self.buckets.range(..key).next_back()
        };
        found.map(|(k, v)| (k.0, v.as_slice()))
    }

    /// Whether a tile of this terrain score can move in direction `step`
    pub fn can_shift(&self, score: f64, step: isize) -> bool {
        self.neighbour(score, step).is_some()
    }
}
