//! Player map knowledge derived from where units and cities stand

use ahash::AHashSet;

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Location;
use crate::grid::layer::Grid;
use crate::grid::model::MapModel;
use crate::grid::resource::EMPTY_DIGIT;
use crate::grid::terrain::UNKNOWN;
use crate::scoring::{city_scope, unit_scope, ScopeMode};

use super::colony::Colony;

/// Everything one player has standing on the map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sighting {
    pub player: usize,
    pub units: Vec<(String, Location)>,
    pub cities: Vec<Location>,
}

impl Sighting {
    /// Tiles covered by unit vision and city scopes
    pub fn seen_tiles<T>(&self, grid: &Grid<T>) -> Result<AHashSet<Location>> {
        let mut seen = AHashSet::new();
        for (kind, loc) in &self.units {
            seen.extend(unit_scope(grid, kind, *loc));
        }
        for center in &self.cities {
            seen.extend(city_scope(grid, *center, ScopeMode::Loop)?);
        }
        Ok(seen)
    }
}

pub fn sightings(colonies: &[Colony]) -> Result<Vec<Sighting>> {
    colonies
        .iter()
        .map(|colony| {
            Ok(Sighting {
                player: colony.index,
                units: colony.unit_positions()?,
                cities: colony.city_positions()?,
            })
        })
        .collect()
}

fn seen_mark(player: usize) -> Result<char> {
    u32::try_from(player + 1)
        .ok()
        .and_then(|n| char::from_digit(n, 36))
        .ok_or_else(|| ScenarioError::Layer {
            key: "seen".into(),
            reason: format!("player {} has no single-digit mark", player),
        })
}

/// Rebuild every player's known terrain and resources, and the global seen
/// layer, from the given sightings
///
/// Players without a sighting end up knowing nothing. A seen tile is marked
/// with the first (lowest) player index that sees it, counted from 1.
pub fn refresh_visibility(model: &mut MapModel, sightings: &[Sighting]) -> Result<()> {
    let mut seen_by: Vec<(usize, AHashSet<Location>)> = sightings
        .iter()
        .map(|s| Ok((s.player, s.seen_tiles(&model.terrain)?)))
        .collect::<Result<_>>()?;
    seen_by.sort_by_key(|(player, _)| *player);

    let terrain = &model.terrain;
    let resources = &model.resources;
    let nothing = AHashSet::new();
    for player in model.players.iter_mut() {
        let seen = seen_by
            .iter()
            .find(|(p, _)| *p == player.index)
            .map_or(&nothing, |(_, tiles)| tiles);
        if let Some(known) = player.terrain.as_mut() {
            for loc in terrain.iter_locations() {
                known[loc] = if seen.contains(&loc) { terrain[loc] } else { UNKNOWN };
            }
        }
        for (layer, known) in player.resources.iter_mut() {
            let global = resources.get(layer);
            for loc in terrain.iter_locations() {
                known[loc] = match global {
                    Some(grid) if seen.contains(&loc) => grid[loc],
                    _ => EMPTY_DIGIT,
                };
            }
        }
        tracing::debug!(player = player.index, seen = seen.len(), "Refreshed player map");
    }

    if let Some(marks) = model.seen.as_mut() {
        marks.fill(EMPTY_DIGIT);
        for (player, tiles) in &seen_by {
            let mark = seen_mark(*player)?;
            for loc in tiles {
                if marks[*loc] == EMPTY_DIGIT {
                    marks[*loc] = mark;
                }
            }
        }
    }
    Ok(())
}

/// Known player tiles that disagree with the global layers
pub fn misaligned_tiles(model: &MapModel, player: usize) -> Vec<Location> {
    let Some(layers) = model.player(player) else {
        return Vec::new();
    };
    let mut tiles: Vec<Location> = Vec::new();
    if let Some(known) = &layers.terrain {
        tiles.extend(
            known
                .iter()
                .filter(|(loc, t)| **t != UNKNOWN && model.terrain.get(*loc).is_ok_and(|g| g != *t))
                .map(|(loc, _)| loc),
        );
    }
    for (layer, known) in &layers.resources {
        let global = model.resources.get(layer);
        for (loc, digit) in known.iter() {
            let expected = global.and_then(|g| g.get(loc).ok()).copied().unwrap_or(EMPTY_DIGIT);
            if *digit != EMPTY_DIGIT && *digit != expected && !tiles.contains(&loc) {
                tiles.push(loc);
            }
        }
    }
    tiles.sort();
    tiles
}

/// Overwrite known player tiles with the global values; returns how many
/// cells changed
pub fn align_player_layers(model: &mut MapModel) -> usize {
    let terrain = &model.terrain;
    let resources = &model.resources;
    let mut changed = 0;
    for player in model.players.iter_mut() {
        if let Some(known) = player.terrain.as_mut() {
            for loc in terrain.iter_locations() {
                if known[loc] != UNKNOWN && known[loc] != terrain[loc] {
                    known[loc] = terrain[loc];
                    changed += 1;
                }
            }
        }
        for (layer, known) in player.resources.iter_mut() {
            let global = resources.get(layer);
            for loc in terrain.iter_locations() {
                let expected = global.map_or(EMPTY_DIGIT, |g| g[loc]);
                if known[loc] != EMPTY_DIGIT && known[loc] != expected {
                    known[loc] = expected;
                    changed += 1;
                }
            }
        }
    }
    if changed > 0 {
        tracing::info!(changed, "Aligned player maps with the global map");
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::model::PlayerLayers;
    use std::collections::BTreeMap;

    fn model() -> MapModel {
        let rows = ["gggggggggg"; 10];
        let mut model = MapModel::new(Grid::from_text_rows("t", &rows).unwrap()).with_resource_layers([5]);
        model.resources.get_mut(&5).unwrap()[Location::new(1, 1)] = '8';
        model.seen = Some(Grid::new(10, 10, '0'));
        for index in [0, 1] {
            model.players.push(PlayerLayers {
                index,
                section: format!("player{}", index),
                terrain: Some(Grid::new(10, 10, 'd')),
                resources: BTreeMap::from([(5, Grid::new(10, 10, '0'))]),
            });
        }
        model
    }

    #[test]
    fn test_refresh_copies_seen_tiles_only() {
        let mut model = model();
        let sight = Sighting { player: 0, units: vec![], cities: vec![Location::new(1, 1)] };
        refresh_visibility(&mut model, &[sight]).unwrap();

        let p0 = model.player(0).unwrap();
        let known = p0.terrain.as_ref().unwrap();
        assert_eq!(known[Location::new(1, 1)], 'g');
        // looped scope reaches the last row
        assert_eq!(known[Location::new(9, 1)], 'g');
        assert_eq!(known[Location::new(5, 5)], UNKNOWN);
        assert_eq!(p0.resources[&5][Location::new(1, 1)], '8');

        let p1 = model.player(1).unwrap();
        assert!(p1.terrain.as_ref().unwrap().iter().all(|(_, t)| *t == UNKNOWN));

        let seen = model.seen.as_ref().unwrap();
        assert_eq!(seen[Location::new(1, 1)], '1');
        assert_eq!(seen[Location::new(5, 5)], '0');
        assert_eq!(seen.iter().filter(|(_, m)| **m == '1').count(), 21);
    }

    #[test]
    fn test_first_player_marks_shared_tiles() {
        let mut model = model();
        let late = Sighting {
            player: 1,
            units: vec![("Warriors".into(), Location::new(5, 5))],
            cities: vec![],
        };
        let early = Sighting { player: 0, units: vec![], cities: vec![Location::new(5, 6)] };
        refresh_visibility(&mut model, &[late, early]).unwrap();
        let seen = model.seen.as_ref().unwrap();
        assert_eq!(seen[Location::new(5, 5)], '1');
        assert_eq!(seen[Location::new(5, 3)], '2');
    }

    #[test]
    fn test_align_fixes_known_tiles() {
        let mut model = model();
        model.players[0].terrain.as_mut().unwrap()[Location::new(0, 0)] = UNKNOWN;
        model.players[0].resources.get_mut(&5).unwrap()[Location::new(2, 2)] = '3';
        assert_eq!(misaligned_tiles(&model, 0).len(), 99);

        let changed = align_player_layers(&mut model);
        assert_eq!(changed, 99 + 1 + 100);
        assert!(misaligned_tiles(&model, 0).is_empty());
        assert_eq!(model.players[0].terrain.as_ref().unwrap()[Location::new(0, 0)], UNKNOWN);
        assert_eq!(model.players[0].resources[&5][Location::new(2, 2)], '0');
    }
}
