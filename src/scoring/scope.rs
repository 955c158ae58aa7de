//! Scope geometry: the tiles a city works or a unit sees around its center
//!
//! A scope of depth `d` is the `(2d+1)²` square of offsets minus the four
//! offsets at taxicab distance exactly `2d` (the corners).

use crate::core::error::Result;
use crate::core::types::Location;
use crate::grid::layer::Grid;
use crate::rules::units::vision_range;

pub const CITY_SCOPE_DEPTH: usize = 2;

/// How offsets that leave the grid are addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// No wrapping; leaving the grid is a position error
    Raw,
    /// Wrap both axes
    Loop,
    /// Wrap columns, drop rows outside the grid
    HalfLoop,
}

/// `(dy, dx)` offsets, rows outer and columns inner
pub fn scope_offsets(depth: usize) -> Vec<(isize, isize)> {
    let d = depth as isize;
    let mut offsets = Vec::with_capacity(((2 * d + 1) * (2 * d + 1)) as usize);
    for dy in -d..=d {
        for dx in -d..=d {
            if dy.abs() + dx.abs() != 2 * d {
                offsets.push((dy, dx));
            }
        }
    }
    offsets
}

pub fn scope<T>(grid: &Grid<T>, center: Location, depth: usize, mode: ScopeMode) -> Result<Vec<Location>> {
    let (row, col) = (center.row as isize, center.col as isize);
    let offsets = scope_offsets(depth);
    match mode {
        ScopeMode::Raw => offsets
            .into_iter()
            .map(|(dy, dx)| grid.locate(row + dy, col + dx))
            .collect(),
        ScopeMode::Loop => Ok(offsets
            .into_iter()
            .map(|(dy, dx)| grid.wrap(row + dy, col + dx))
            .collect()),
        ScopeMode::HalfLoop => Ok(offsets
            .into_iter()
            .filter_map(|(dy, dx)| grid.wrap_col(row + dy, col + dx))
            .collect()),
    }
}

pub fn city_scope<T>(grid: &Grid<T>, center: Location, mode: ScopeMode) -> Result<Vec<Location>> {
    scope(grid, center, CITY_SCOPE_DEPTH, mode)
}

/// Scope depth for a unit's vision range; unknown ranges see like a city
pub fn unit_depth(unit: &str) -> usize {
    match vision_range(unit) {
        Some(8) => 3,
        _ => CITY_SCOPE_DEPTH,
    }
}

/// Tiles a unit sees, wrapped on both axes
pub fn unit_scope<T>(grid: &Grid<T>, unit: &str, center: Location) -> Vec<Location> {
    let (row, col) = (center.row as isize, center.col as isize);
    scope_offsets(unit_depth(unit))
        .into_iter()
        .map(|(dy, dx)| grid.wrap(row + dy, col + dx))
        .collect()
}

/// The `(2t+1)²` square a unit may reach in `turns` turns, clipped to the grid
pub fn max_turns_scope<T>(grid: &Grid<T>, center: Location, turns: usize) -> Vec<Location> {
    let t = turns as isize;
    let (row, col) = (center.row as isize, center.col as isize);
    let mut tiles = Vec::new();
    for dy in -t..=t {
        for dx in -t..=t {
            if let Some(loc) = grid.offset(row + dy, col + dx) {
                tiles.push(loc);
            }
        }
    }
    tiles
}
