//! Per-tile productivity

use crate::core::error::Result;
use crate::core::types::{round_score, Fpt, Location, Weight};
use crate::grid::model::MapModel;
use crate::grid::resource::ResourceCode;
use crate::rules::TileTables;

/// Scored productivity of one tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileProperty {
    pub location: Location,
    pub terrain: char,
    pub resources: Vec<ResourceCode>,
    pub terrain_fpt: Fpt,
    pub resource_fpt: Fpt,
    /// Weighted total at comparison precision
    pub score: f64,
    pub terrain_score: f64,
    pub resource_score: f64,
}

impl TileProperty {
    pub fn new(
        location: Location,
        terrain: char,
        resources: Vec<ResourceCode>,
        tables: &TileTables,
        weight: &Weight,
    ) -> Self {
        let terrain_fpt = tables.terrain_fpt(terrain);
        let resource_fpt = resources.iter().map(|c| tables.resource_fpt(*c)).sum();
        let mut property = Self {
            location,
            terrain,
            resources,
            terrain_fpt,
            resource_fpt,
            score: 0.0,
            terrain_score: 0.0,
            resource_score: 0.0,
        };
        property.rescore(weight);
        property
    }

    pub fn fpt(&self) -> Fpt {
        self.terrain_fpt + self.resource_fpt
    }

    /// Recompute the three scores after the fpt parts changed
    pub fn rescore(&mut self, weight: &Weight) {
        self.terrain_score = weight.score(&self.terrain_fpt);
        self.resource_score = weight.score(&self.resource_fpt);
        self.score = weight.score(&self.fpt());
    }

    pub fn has_resources(&self) -> bool {
        !self.resources.is_empty()
    }
}

pub fn tile_property(
    model: &MapModel,
    tables: &TileTables,
    weight: &Weight,
    loc: Location,
) -> Result<TileProperty> {
    let terrain = model.terrain_at(loc)?;
    let resources = model.tile_resources(loc)?;
    Ok(TileProperty::new(loc, terrain, resources, tables, weight))
}

pub fn scope_properties(
    model: &MapModel,
    tables: &TileTables,
    weight: &Weight,
    scope: &[Location],
) -> Result<Vec<TileProperty>> {
    scope
        .iter()
        .map(|loc| tile_property(model, tables, weight, *loc))
        .collect()
}

/// Weighted score of a sum of tiles, at comparison precision
pub fn total_score(properties: &[TileProperty], weight: &Weight) -> f64 {
    let total: Fpt = properties.iter().map(TileProperty::fpt).sum();
    round_score(weight.apply(&total))
}
