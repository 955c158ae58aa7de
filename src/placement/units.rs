//! Moving each colony's units into its cluster

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, ScenarioError};
use crate::rules::units::is_ocean_unit;

use super::cluster::{require_clusters, Cluster};
use super::colony::Colony;

/// Pair colonies that have units with clusters, in order
pub fn colony_clusters<'c>(colonies: &[Colony], clusters: &'c [Cluster]) -> Result<Vec<Option<&'c Cluster>>> {
    let demands: Vec<_> = colonies.iter().map(Colony::demand).collect();
    require_clusters(clusters, &demands)?;
    let mut next = clusters.iter();
    Ok(demands
        .iter()
        .map(|d| if d.total() > 0 { next.next() } else { None })
        .collect())
}

/// Put every unit on a random tile of its colony's cluster: ocean units on
/// ocean tiles, the rest on land
pub fn assign_units(colonies: &mut [Colony], clusters: &[Cluster], rng: &mut ChaCha8Rng) -> Result<()> {
    let pairing = colony_clusters(colonies, clusters)?;
    for (colony, cluster) in colonies.iter_mut().zip(pairing) {
        let Some(cluster) = cluster else {
            continue;
        };
        let kinds: Vec<String> = colony.unit_kinds().into_iter().map(str::to_string).collect();
        let Some(units) = colony.units.as_mut() else {
            continue;
        };
        for (row, kind) in kinds.iter().enumerate() {
            let tiles = if is_ocean_unit(kind) { &cluster.ocean } else { &cluster.land };
            let &loc = tiles.choose(rng).ok_or(ScenarioError::NoAccessibleLocation)?;
            units.set_location(row, loc)?;
        }
        tracing::debug!(colony = %colony.section, units = kinds.len(), center = %cluster.center, "Placed units");
    }
    Ok(())
}
