//! Land connectivity by 4-neighbour flood fill (no wraparound)

use ahash::AHashSet;

use crate::core::types::Location;
use crate::grid::layer::Grid;
use crate::grid::terrain::is_blocked;

#[derive(Debug, Clone)]
pub struct Connectivity {
    /// Component id per tile; 0 for water and inaccessible tiles
    pub labels: Grid<u32>,
    pub component_count: usize,
    /// 0 when the map has no land
    pub largest_component_id: u32,
    pub largest_component_size: usize,
    pub largest_component_tiles: AHashSet<Location>,
}

const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

pub fn connectivity(terrain: &Grid<char>) -> Connectivity {
    let mut labels = Grid::new(terrain.rows, terrain.cols, 0u32);
    let mut count = 0u32;
    let mut largest_id = 0u32;
    let mut largest_tiles: Vec<Location> = Vec::new();

    for start in terrain.iter_locations() {
        if is_blocked(terrain[start]) || labels[start] != 0 {
            continue;
        }
        count += 1;
        labels[start] = count;
        let mut members = vec![start];
        let mut stack = vec![start];
        while let Some(loc) = stack.pop() {
            for (dy, dx) in DIRECTIONS {
                let Some(next) = terrain.offset(loc.row as isize + dy, loc.col as isize + dx) else {
                    continue;
                };
                if !is_blocked(terrain[next]) && labels[next] == 0 {
                    labels[next] = count;
                    members.push(next);
                    stack.push(next);
                }
            }
        }
        if members.len() > largest_tiles.len() {
            largest_id = count;
            largest_tiles = members;
        }
    }

    tracing::debug!(
        components = count,
        largest = largest_tiles.len(),
        "Labelled land components"
    );

    Connectivity {
        labels,
        component_count: count as usize,
        largest_component_id: largest_id,
        largest_component_size: largest_tiles.len(),
        largest_component_tiles: largest_tiles.into_iter().collect(),
    }
}
