//! Accessibility and the random walk between city sites

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Location;
use crate::grid::layer::Grid;
use crate::grid::terrain::{is_blocked, is_ocean};
use crate::scoring::{connectivity, CITY_SCOPE_DEPTH};

/// The eight neighbour directions `(dy, dx)`
pub const WALK_DIRECTIONS: [(isize, isize); 8] =
    [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];

/// Inside the margin on both axes and standable: a land tile, or an ocean
/// tile in ocean mode
pub fn is_accessible(terrain: &Grid<char>, row: isize, col: isize, margin: usize, ocean: bool) -> bool {
    let m = margin as isize;
    let inside = row >= m
        && col >= m
        && row <= terrain.rows as isize - m - 1
        && col <= terrain.cols as isize - m - 1;
    if !inside {
        return false;
    }
    let tile = terrain[Location::new(row as usize, col as usize)];
    if ocean {
        is_ocean(tile)
    } else {
        !is_blocked(tile)
    }
}

/// One stride in a random direction; `None` when every direction is blocked
pub fn walk_step(
    terrain: &Grid<char>,
    from: Location,
    stride: usize,
    margin: usize,
    rng: &mut ChaCha8Rng,
) -> Option<Location> {
    let mut directions = WALK_DIRECTIONS;
    directions.shuffle(rng);
    let s = stride as isize;
    directions.iter().find_map(|(dy, dx)| {
        let row = from.row as isize + dy * s;
        let col = from.col as isize + dx * s;
        is_accessible(terrain, row, col, margin, false).then(|| Location::new(row as usize, col as usize))
    })
}

/// Interior tiles a city may be founded on
pub fn city_locations(terrain: &Grid<char>) -> Vec<Location> {
    interior(terrain)
        .filter(|loc| is_accessible(terrain, loc.row as isize, loc.col as isize, 1, false))
        .collect()
}

/// A random city site
pub fn city_location(terrain: &Grid<char>, rng: &mut ChaCha8Rng) -> Result<Location> {
    city_locations(terrain)
        .choose(rng)
        .copied()
        .ok_or(ScenarioError::NoAccessibleLocation)
}

/// Interior tiles a unit may start on; land units can be restricted to the
/// largest land mass
pub fn unit_accessible_locations(terrain: &Grid<char>, ocean: bool, largest_only: bool) -> Vec<Location> {
    let largest = largest_only.then(|| connectivity(terrain).largest_component_tiles);
    interior(terrain)
        .filter(|loc| is_accessible(terrain, loc.row as isize, loc.col as isize, 1, ocean))
        .filter(|loc| largest.as_ref().map_or(true, |tiles| tiles.contains(loc)))
        .collect()
}

/// Tiles at least a city scope away from every edge
fn interior(terrain: &Grid<char>) -> impl Iterator<Item = Location> + '_ {
    let d = CITY_SCOPE_DEPTH;
    let rows = d..terrain.rows.saturating_sub(d);
    rows.flat_map(move |r| (d..terrain.cols.saturating_sub(d)).map(move |c| Location::new(r, c)))
}
