//! City placement and the tile ownership it implies
//!
//! A city's marks live in four id grids: `eowner` holds the owning player
//! on the city center, `owner` and `source` cover the city scope, and
//! `worked` names the city on every tile it works. Moving a city clears its
//! old marks by id before writing the new ones.

use std::collections::BTreeMap;

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Location;
use crate::grid::ownership::OwnershipLayers;
use crate::scoring::{city_scope, ScopeMode};

use super::cluster::Cluster;
use super::colony::Colony;
use super::units::colony_clusters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityPlacement {
    pub city: u32,
    pub center: Location,
    /// Tiles the city works, center included
    pub worked: usize,
}

/// Mark `count - 1` random scope tiles as worked by `city`, skipping the
/// center and anything in `used`
fn work_tiles(
    own: &mut OwnershipLayers,
    city: u32,
    center: Location,
    scope: &[Location],
    count: usize,
    used: &mut AHashSet<Location>,
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut candidates: Vec<Location> = scope
        .iter()
        .copied()
        .filter(|loc| *loc != center && !used.contains(loc))
        .collect();
    candidates.shuffle(rng);
    let extra: Vec<Location> = candidates.into_iter().take(count.saturating_sub(1)).collect();
    for loc in &extra {
        own.worked[*loc] = Some(city);
        used.insert(*loc);
    }
    extra.len() + 1
}

fn write_scope(own: &mut OwnershipLayers, owner: u32, source: Option<u32>, center: Location, scope: &[Location]) {
    if let Some(source) = source {
        for mark in own.source.iter_locations().collect::<Vec<_>>() {
            if own.source[mark] == Some(source) {
                own.source[mark] = None;
            }
        }
    }
    own.eowner[center] = Some(owner);
    for loc in scope {
        own.owner[*loc] = Some(owner);
        if source.is_some() {
            own.source[*loc] = source;
        }
    }
}

/// Move one city of `owner` to `center` (scope wrapped on both axes)
///
/// Clears the owner's `eowner` and `owner` marks and the city's `worked`
/// marks, then works as many tiles as the city worked before, center first.
pub fn place_city(
    own: &mut OwnershipLayers,
    owner: u32,
    city: u32,
    center: Location,
    rng: &mut ChaCha8Rng,
) -> Result<CityPlacement> {
    own.eowner.get(center)?;
    let scope = city_scope(&own.eowner, center, ScopeMode::Loop)?;

    let mut source = None;
    let mut previously_worked = 0;
    for loc in own.eowner.iter_locations().collect::<Vec<_>>() {
        if own.eowner[loc] == Some(owner) {
            own.eowner[loc] = None;
            source = own.source[loc];
        }
        if own.owner[loc] == Some(owner) {
            own.owner[loc] = None;
        }
        if own.worked[loc] == Some(city) {
            own.worked[loc] = None;
            previously_worked += 1;
        }
    }

    write_scope(own, owner, source, center, &scope);
    own.worked[center] = Some(city);
    let mut used = AHashSet::from_iter([center]);
    let worked = work_tiles(own, city, center, &scope, previously_worked, &mut used, rng);
    tracing::debug!(owner, city, %center, worked, "Placed city");
    Ok(CityPlacement { city, center, worked })
}

/// A city to (re)place: owning player, city id and new center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitySite {
    pub owner: u32,
    pub city: u32,
    pub center: Location,
}

/// Move several cities of one owner at once (scopes wrap columns only)
///
/// No tile is worked by two of these cities, and no city works another's
/// center.
pub fn place_cities(
    own: &mut OwnershipLayers,
    owner: u32,
    cities: &[(u32, Location)],
    rng: &mut ChaCha8Rng,
) -> Result<Vec<CityPlacement>> {
    let sites: Vec<CitySite> = cities
        .iter()
        .map(|&(city, center)| CitySite { owner, city, center })
        .collect();
    place_sites(own, &sites, rng)
}

/// [`place_cities`] for cities of any owners in one exclusive pass
pub fn place_sites(own: &mut OwnershipLayers, sites: &[CitySite], rng: &mut ChaCha8Rng) -> Result<Vec<CityPlacement>> {
    for site in sites {
        own.eowner.get(site.center)?;
    }

    let mut sources: BTreeMap<u32, u32> = BTreeMap::new();
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    let locations: Vec<Location> = own.eowner.iter_locations().collect();
    for site in sites {
        for &loc in &locations {
            if own.eowner[loc] == Some(site.owner) {
                own.eowner[loc] = None;
            }
            if own.worked[loc] == Some(site.city) {
                if let Some(source) = own.source[loc] {
                    sources.insert(site.city, source);
                }
                own.worked[loc] = None;
                *counts.entry(site.city).or_insert(0) += 1;
            }
            if own.owner[loc] == Some(site.owner) {
                own.owner[loc] = None;
            }
        }
    }

    let mut used: AHashSet<Location> = sites.iter().map(|s| s.center).collect();
    let mut placed = Vec::with_capacity(sites.len());
    for site in sites {
        let scope = city_scope(&own.eowner, site.center, ScopeMode::HalfLoop)?;
        write_scope(own, site.owner, sources.get(&site.city).copied(), site.center, &scope);
        own.worked[site.center] = Some(site.city);
        let count = counts.get(&site.city).copied().unwrap_or(0);
        let worked = work_tiles(own, site.city, site.center, &scope, count, &mut used, rng);
        placed.push(CityPlacement { city: site.city, center: site.center, worked });
    }
    tracing::debug!(cities = placed.len(), "Placed cities");
    Ok(placed)
}

/// Move each colony's cities onto land tiles of its cluster, taken from the
/// end of the cluster's land list
fn choose_city_sites(colonies: &mut [Colony], clusters: &[Cluster]) -> Result<Vec<CitySite>> {
    let pairing = colony_clusters(colonies, clusters)?;
    let mut sites = Vec::new();
    for (colony, cluster) in colonies.iter_mut().zip(pairing) {
        let Some(cluster) = cluster else {
            continue;
        };
        let rows = colony.cities.as_ref().map_or(0, |c| c.len());
        let mut land = cluster.land.clone();
        for row in 0..rows {
            let (owner, city) = colony.city_ids(row)?;
            let center = land.pop().ok_or(ScenarioError::NoAccessibleLocation)?;
            if let Some(table) = colony.cities.as_mut() {
                table.set_location(row, center)?;
            }
            sites.push(CitySite { owner, city, center });
        }
    }
    Ok(sites)
}

/// Move each colony's cities into its cluster and, when the map carries
/// ownership layers, rewrite their marks in one exclusive [`place_sites`]
/// pass
///
/// City rows move whether or not `own` is present; the returned sites are
/// the new centers.
pub fn assign_cities(
    colonies: &mut [Colony],
    clusters: &[Cluster],
    own: Option<&mut OwnershipLayers>,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<CitySite>> {
    let sites = choose_city_sites(colonies, clusters)?;
    match own {
        Some(own) => {
            place_sites(own, &sites, rng)?;
        }
        None => tracing::debug!(cities = sites.len(), "Moved cities without ownership layers"),
    }
    Ok(sites)
}
