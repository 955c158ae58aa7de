//! Disjoint starting clusters, one per colony with units

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Location;
use crate::rules::units::is_ocean_unit;

/// A colony never asks for more than this many land or ocean tiles
const DEMAND_CAP: usize = 3;

/// Units a colony brings, split by where they can stand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyDemand {
    pub land: usize,
    pub ocean: usize,
}

impl ColonyDemand {
    pub fn from_units<S: AsRef<str>>(units: &[S]) -> Self {
        let ocean = units.iter().filter(|u| is_ocean_unit(u.as_ref())).count();
        Self { land: units.len() - ocean, ocean }
    }

    pub fn total(&self) -> usize {
        self.land + self.ocean
    }
}

/// Shape of the clusters to find
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Per-axis reach of a cluster around its center
    pub radius: usize,
    /// Allowed per-axis distance between two centers, inclusive
    pub min_distance: usize,
    pub max_distance: usize,
    /// Land tiles wanted beyond the land unit count
    pub extra: usize,
    pub attempts: usize,
}

impl Default for ClusterSpec {
    fn default() -> Self {
        Self { radius: 2, min_distance: 5, max_distance: 20, extra: 0, attempts: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub center: Location,
    pub land: Vec<Location>,
    pub ocean: Vec<Location>,
}

/// Per-axis distance on a map that wraps both ways
pub fn looped_distance(a: Location, b: Location, rows: usize, cols: usize) -> (usize, usize) {
    let dy = a.row.abs_diff(b.row);
    let dx = a.col.abs_diff(b.col);
    (dy.min(rows.saturating_sub(dy)), dx.min(cols.saturating_sub(dx)))
}

fn within_band(center: Location, accepted: &[Cluster], spec: &ClusterSpec, rows: usize, cols: usize) -> bool {
    let band = spec.min_distance..=spec.max_distance;
    accepted.iter().all(|c| {
        let (dy, dx) = looped_distance(center, c.center, rows, cols);
        band.contains(&dy) && band.contains(&dx)
    })
}

/// Sample clusters, one for each demand with at least one unit, in order
///
/// An accepted cluster claims its tiles; later clusters skip them. The list is
/// short when the attempt budget runs out; see [`require_clusters`].
pub fn find_clusters(
    land: &[Location],
    ocean: &[Location],
    demands: &[ColonyDemand],
    spec: &ClusterSpec,
    rows: usize,
    cols: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<Cluster> {
    let wanted: Vec<&ColonyDemand> = demands.iter().filter(|d| d.total() > 0).collect();
    let pool: Vec<Location> = land.iter().chain(ocean.iter()).copied().collect();
    let mut claimed: AHashSet<Location> = AHashSet::new();
    let mut clusters: Vec<Cluster> = Vec::with_capacity(wanted.len());

    for _ in 0..spec.attempts {
        let Some(demand) = wanted.get(clusters.len()) else {
            break;
        };
        let Some(&center) = pool.choose(rng) else {
            break;
        };

        let near = |loc: &&Location| {
            let (dy, dx) = looped_distance(center, **loc, rows, cols);
            dy <= spec.radius && dx <= spec.radius && !claimed.contains(*loc)
        };
        let land_near: Vec<Location> = land.iter().filter(near).copied().collect();
        let ocean_near: Vec<Location> = ocean.iter().filter(near).copied().collect();

        let fits = land_near.len() >= (demand.land + spec.extra).min(DEMAND_CAP)
            && ocean_near.len() >= demand.ocean.min(DEMAND_CAP)
            && clusters.iter().all(|c| c.center != center)
            && within_band(center, &clusters, spec, rows, cols);
        if fits {
            claimed.extend(land_near.iter().chain(ocean_near.iter()).copied());
            clusters.push(Cluster { center, land: land_near, ocean: ocean_near });
        }
    }

    if clusters.len() < wanted.len() {
        tracing::warn!(found = clusters.len(), required = wanted.len(), "Cluster search came up short");
    } else {
        tracing::debug!(clusters = clusters.len(), "Found clusters");
    }
    clusters
}

/// Fail unless one cluster exists per colony with units
pub fn require_clusters(clusters: &[Cluster], demands: &[ColonyDemand]) -> Result<()> {
    let required = demands.iter().filter(|d| d.total() > 0).count();
    if clusters.len() < required {
        return Err(ScenarioError::InsufficientClusters { found: clusters.len(), required });
    }
    Ok(())
}
