//! Typed map state read from, and written back to, a save document

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ahash::AHashMap;

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Location;
use crate::sav::render::row_line;
use crate::sav::tokenizer::series_key;
use crate::sav::{Overrides, SavDocument};

use super::layer::Grid;
use super::ownership::{parse_ids, render_ids, OwnerGrid, OwnershipLayers};
use super::resource::{layer_prefix, parse_layer_prefix, ResourceCode, EMPTY_DIGIT};

pub const MAP_SECTION: &str = "map";
pub const TERRAIN_SERIES: &str = "t";
pub const SEEN_SERIES: &str = "k00";
pub const PLAYER_TERRAIN_SERIES: &str = "map_t";
const PLAYER_SERIES_HEAD: &str = "map_";

/// Identifies one grid layer of the map model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKey {
    Terrain,
    Seen,
    Resource(u8),
    Owner,
    EOwner,
    Source,
    Worked,
    PlayerTerrain(usize),
    PlayerResource(usize, u8),
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKey::Terrain => write!(f, "terrain"),
            LayerKey::Seen => write!(f, "seen"),
            LayerKey::Resource(layer) => write!(f, "{}", layer_prefix(*layer)),
            LayerKey::Owner => write!(f, "owner"),
            LayerKey::EOwner => write!(f, "eowner"),
            LayerKey::Source => write!(f, "source"),
            LayerKey::Worked => write!(f, "worked"),
            LayerKey::PlayerTerrain(p) => write!(f, "player{}/map_t", p),
            LayerKey::PlayerResource(p, layer) => write!(f, "player{}/map_{}", p, layer_prefix(*layer)),
        }
    }
}

/// Section and row keys a layer was read from
#[derive(Debug, Clone, PartialEq)]
struct LayerOrigin {
    section: String,
    keys: Vec<String>,
}

/// What one player knows of the map
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLayers {
    pub index: usize,
    pub section: String,
    pub terrain: Option<Grid<char>>,
    pub resources: BTreeMap<u8, Grid<char>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapModel {
    pub terrain: Grid<char>,
    pub resources: BTreeMap<u8, Grid<char>>,
    pub seen: Option<Grid<char>>,
    pub ownership: Option<OwnershipLayers>,
    pub players: Vec<PlayerLayers>,
    origins: AHashMap<LayerKey, LayerOrigin>,
}

impl MapModel {
    /// A model with only a terrain layer and no save-file origin
    pub fn new(terrain: Grid<char>) -> Self {
        Self {
            terrain,
            resources: BTreeMap::new(),
            seen: None,
            ownership: None,
            players: Vec::new(),
            origins: AHashMap::new(),
        }
    }

    /// Add empty resource layers (all tiles `0`)
    pub fn with_resource_layers(mut self, layers: impl IntoIterator<Item = u8>) -> Self {
        for layer in layers {
            self.resources
                .entry(layer)
                .or_insert_with(|| Grid::new(self.terrain.rows, self.terrain.cols, EMPTY_DIGIT));
        }
        self
    }

    pub fn from_document(doc: &SavDocument) -> Result<Self> {
        let mut origins = AHashMap::new();

        let terrain = read_char_layer(doc, MAP_SECTION, TERRAIN_SERIES, LayerKey::Terrain, &mut origins)?
            .ok_or_else(|| ScenarioError::Layer {
                key: LayerKey::Terrain.to_string(),
                reason: "no t#### rows in [map]".into(),
            })?;
        let seen = read_char_layer(doc, MAP_SECTION, SEEN_SERIES, LayerKey::Seen, &mut origins)?;

        let mut resources = BTreeMap::new();
        for layer in resource_layers(doc, MAP_SECTION, "") {
            let key = LayerKey::Resource(layer);
            if let Some(grid) = read_char_layer(doc, MAP_SECTION, &layer_prefix(layer), key, &mut origins)? {
                resources.insert(layer, grid);
            }
        }

        let ownership = read_ownership(doc, &mut origins)?;

        let mut players = Vec::new();
        for section in doc.players() {
            let Some(index) = section.strip_prefix("player").and_then(|n| n.parse().ok()) else {
                continue;
            };
            let terrain = read_char_layer(
                doc,
                section,
                PLAYER_TERRAIN_SERIES,
                LayerKey::PlayerTerrain(index),
                &mut origins,
            )?;
            let mut player_resources = BTreeMap::new();
            for layer in resource_layers(doc, section, PLAYER_SERIES_HEAD) {
                let series = format!("{}{}", PLAYER_SERIES_HEAD, layer_prefix(layer));
                let key = LayerKey::PlayerResource(index, layer);
                if let Some(grid) = read_char_layer(doc, section, &series, key, &mut origins)? {
                    player_resources.insert(layer, grid);
                }
            }
            players.push(PlayerLayers {
                index,
                section: section.clone(),
                terrain,
                resources: player_resources,
            });
        }

        let model = Self { terrain, resources, seen, ownership, players, origins };
        model.check_shapes()?;
        tracing::debug!(
            rows = model.rows(),
            cols = model.cols(),
            resource_layers = model.resources.len(),
            players = model.players.len(),
            "Built map model"
        );
        Ok(model)
    }

    fn check_shapes(&self) -> Result<()> {
        let mut shapes: Vec<(LayerKey, usize, usize)> = Vec::new();
        shapes.push((LayerKey::Terrain, self.terrain.rows, self.terrain.cols));
        if let Some(seen) = &self.seen {
            shapes.push((LayerKey::Seen, seen.rows, seen.cols));
        }
        for (layer, grid) in &self.resources {
            shapes.push((LayerKey::Resource(*layer), grid.rows, grid.cols));
        }
        if let Some(own) = &self.ownership {
            for (key, grid) in [
                (LayerKey::Owner, &own.owner),
                (LayerKey::EOwner, &own.eowner),
                (LayerKey::Source, &own.source),
                (LayerKey::Worked, &own.worked),
            ] {
                shapes.push((key, grid.rows, grid.cols));
            }
        }
        for player in &self.players {
            if let Some(grid) = &player.terrain {
                shapes.push((LayerKey::PlayerTerrain(player.index), grid.rows, grid.cols));
            }
            for (layer, grid) in &player.resources {
                shapes.push((LayerKey::PlayerResource(player.index, *layer), grid.rows, grid.cols));
            }
        }

        for (key, rows, cols) in shapes {
            if rows != self.rows() || cols != self.cols() {
                return Err(ScenarioError::Layer {
                    key: key.to_string(),
                    reason: format!(
                        "layer is {}x{}, terrain is {}x{}",
                        rows,
                        cols,
                        self.rows(),
                        self.cols()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.terrain.rows
    }

    pub fn cols(&self) -> usize {
        self.terrain.cols
    }

    fn missing(key: LayerKey) -> ScenarioError {
        ScenarioError::Layer { key: key.to_string(), reason: "layer not present".into() }
    }

    pub fn char_layer(&self, key: LayerKey) -> Result<&Grid<char>> {
        let grid = match key {
            LayerKey::Terrain => Some(&self.terrain),
            LayerKey::Seen => self.seen.as_ref(),
            LayerKey::Resource(layer) => self.resources.get(&layer),
            LayerKey::PlayerTerrain(p) => self.player(p).and_then(|pl| pl.terrain.as_ref()),
            LayerKey::PlayerResource(p, layer) => {
                self.player(p).and_then(|pl| pl.resources.get(&layer))
            }
            _ => None,
        };
        grid.ok_or_else(|| Self::missing(key))
    }

    pub fn id_layer(&self, key: LayerKey) -> Result<&OwnerGrid> {
        let own = self.ownership.as_ref().ok_or_else(|| Self::missing(key))?;
        match key {
            LayerKey::Owner => Ok(&own.owner),
            LayerKey::EOwner => Ok(&own.eowner),
            LayerKey::Source => Ok(&own.source),
            LayerKey::Worked => Ok(&own.worked),
            _ => Err(Self::missing(key)),
        }
    }

    pub fn ownership_mut(&mut self) -> Result<&mut OwnershipLayers> {
        self.ownership
            .as_mut()
            .ok_or_else(|| Self::missing(LayerKey::Owner))
    }

    pub fn player(&self, index: usize) -> Option<&PlayerLayers> {
        self.players.iter().find(|p| p.index == index)
    }

    pub fn terrain_at(&self, loc: Location) -> Result<char> {
        self.terrain.get(loc).copied()
    }

    /// Non-empty resource codes on a tile, ordered by layer
    pub fn tile_resources(&self, loc: Location) -> Result<Vec<ResourceCode>> {
        let mut codes = Vec::new();
        for (layer, grid) in &self.resources {
            let digit = *grid.get(loc)?;
            if digit != EMPTY_DIGIT {
                codes.push(ResourceCode::new(*layer, digit));
            }
        }
        Ok(codes)
    }

    pub fn set_resource(&mut self, loc: Location, code: ResourceCode) -> Result<()> {
        self.resources
            .get_mut(&code.layer)
            .ok_or_else(|| Self::missing(LayerKey::Resource(code.layer)))?
            .set(loc, code.digit)
    }

    pub fn clear_resource(&mut self, loc: Location, layer: u8) -> Result<()> {
        self.set_resource(loc, ResourceCode::new(layer, EMPTY_DIGIT))
    }

    pub fn clear_resources(&mut self, loc: Location) -> Result<()> {
        for grid in self.resources.values_mut() {
            grid.set(loc, EMPTY_DIGIT)?;
        }
        Ok(())
    }

    fn layer_rows(&self, key: LayerKey) -> Result<Vec<String>> {
        match key {
            LayerKey::Owner | LayerKey::EOwner | LayerKey::Source | LayerKey::Worked => {
                let grid = self.id_layer(key)?;
                Ok((0..grid.rows).map(|r| render_ids(grid.row(r))).collect())
            }
            _ => {
                let grid = self.char_layer(key)?;
                Ok((0..grid.rows).map(|r| grid.row_text(r)).collect())
            }
        }
    }

    /// Field overrides re-emitting every layer under its original row keys
    pub fn to_overrides(&self) -> Result<Overrides> {
        let mut overrides = Overrides::new();
        let mut keys: Vec<&LayerKey> = self.origins.keys().collect();
        keys.sort();
        for key in keys {
            let origin = &self.origins[key];
            let rows = self.layer_rows(*key)?;
            for (row_key, text) in origin.keys.iter().zip(rows.iter()) {
                overrides.replace_line(&origin.section, row_key, row_line(row_key, text));
            }
        }
        Ok(overrides)
    }
}

/// Layer ids of every `{head}e0N` series found in a section
fn resource_layers(doc: &SavDocument, section: &str, head: &str) -> BTreeSet<u8> {
    let Some(section) = doc.section(section) else {
        return BTreeSet::new();
    };
    section
        .fields()
        .iter()
        .filter_map(|f| series_key(&f.name))
        .filter_map(|(series, _)| series.strip_prefix(head))
        .filter_map(parse_layer_prefix)
        .collect()
}

fn read_char_layer(
    doc: &SavDocument,
    section: &str,
    series: &str,
    key: LayerKey,
    origins: &mut AHashMap<LayerKey, LayerOrigin>,
) -> Result<Option<Grid<char>>> {
    let rows = doc.rows_with_prefix(section, series);
    if rows.is_empty() {
        return Ok(None);
    }
    let texts: Vec<&str> = rows.iter().map(|r| r.1).collect();
    let grid = Grid::from_text_rows(&key.to_string(), &texts)?;
    origins.insert(
        key,
        LayerOrigin {
            section: section.to_string(),
            keys: rows.iter().map(|r| r.0.to_string()).collect(),
        },
    );
    Ok(Some(grid))
}

fn read_id_layer(
    doc: &SavDocument,
    key: LayerKey,
    origins: &mut AHashMap<LayerKey, LayerOrigin>,
) -> Result<Option<OwnerGrid>> {
    let series = key.to_string();
    let rows = doc.rows_with_prefix(MAP_SECTION, &series);
    if rows.is_empty() {
        return Ok(None);
    }
    let parsed = rows
        .iter()
        .map(|(row_key, text)| parse_ids(row_key, text))
        .collect::<Result<Vec<_>>>()?;
    let grid = Grid::from_rows(&series, parsed)?;
    origins.insert(
        key,
        LayerOrigin {
            section: MAP_SECTION.to_string(),
            keys: rows.iter().map(|r| r.0.to_string()).collect(),
        },
    );
    Ok(Some(grid))
}

fn read_ownership(
    doc: &SavDocument,
    origins: &mut AHashMap<LayerKey, LayerOrigin>,
) -> Result<Option<OwnershipLayers>> {
    let owner = read_id_layer(doc, LayerKey::Owner, origins)?;
    let eowner = read_id_layer(doc, LayerKey::EOwner, origins)?;
    let source = read_id_layer(doc, LayerKey::Source, origins)?;
    let worked = read_id_layer(doc, LayerKey::Worked, origins)?;
    match (owner, eowner, source, worked) {
        (Some(owner), Some(eowner), Some(source), Some(worked)) => {
            Ok(Some(OwnershipLayers { owner, eowner, source, worked }))
        }
        (None, None, None, None) => Ok(None),
        _ => Err(ScenarioError::Layer {
            key: "ownership".into(),
            reason: "owner, eowner, source and worked rows must all be present".into(),
        }),
    }
}
