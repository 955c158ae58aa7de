//! Terrain and resource productivity tables
//!
//! The tables are a read-only lookup keyed by lower-cased names. They come
//! either from a TOML file or from the built-in classic values.

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Fpt;
use crate::grid::resource::code_for;
use crate::grid::terrain::CLASSIC_IDENTS;

use super::tables::TileTables;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainEntry {
    pub name: String,
    /// Map character of the terrain
    pub ident: char,
    #[serde(default)]
    pub food: f64,
    #[serde(default)]
    pub shield: f64,
    #[serde(default)]
    pub trade: f64,
    /// Resources that may appear on this terrain
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    #[serde(default)]
    pub food: f64,
    #[serde(default)]
    pub shield: f64,
    #[serde(default)]
    pub trade: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesetTables {
    #[serde(default)]
    pub terrain: Vec<TerrainEntry>,
    #[serde(default)]
    pub resource: Vec<ResourceEntry>,
}

fn terrain(name: &str, fpt: (f64, f64, f64), resources: &[&str]) -> TerrainEntry {
    let ident = CLASSIC_IDENTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .unwrap_or(' ');
    TerrainEntry {
        name: name.to_string(),
        ident,
        food: fpt.0,
        shield: fpt.1,
        trade: fpt.2,
        resources: resources.iter().map(|r| r.to_string()).collect(),
    }
}

fn resource(name: &str, fpt: (f64, f64, f64)) -> ResourceEntry {
    ResourceEntry { name: name.to_string(), food: fpt.0, shield: fpt.1, trade: fpt.2 }
}

impl RulesetTables {
    /// Classic ruleset values
    pub fn classic() -> Self {
        Self {
            terrain: vec![
                terrain("inaccessible", (0.0, 0.0, 0.0), &[]),
                terrain("lake", (2.0, 0.0, 2.0), &["fish"]),
                terrain("ocean", (1.0, 0.0, 2.0), &["fish", "whales"]),
                terrain("deep ocean", (1.0, 0.0, 2.0), &["fish", "whales"]),
                terrain("glacier", (0.0, 0.0, 0.0), &["ivory", "oil"]),
                terrain("desert", (0.0, 1.0, 0.0), &["oasis", "oil"]),
                terrain("forest", (1.0, 2.0, 0.0), &["pheasant", "silk"]),
                terrain("grassland", (2.0, 0.0, 0.0), &["resources"]),
                terrain("hills", (1.0, 0.0, 0.0), &["coal", "wine"]),
                terrain("jungle", (1.0, 0.0, 0.0), &["gems", "fruit"]),
                terrain("mountains", (0.0, 1.0, 0.0), &["gold", "iron"]),
                terrain("plains", (1.0, 1.0, 0.0), &["buffalo", "wheat"]),
                terrain("swamp", (1.0, 0.0, 0.0), &["peat", "spice"]),
                terrain("tundra", (1.0, 0.0, 0.0), &["game", "furs"]),
            ],
            resource: vec![
                resource("gold", (0.0, 0.0, 6.0)),
                resource("iron", (0.0, 3.0, 0.0)),
                resource("game", (2.0, 0.0, 0.0)),
                resource("furs", (2.0, 0.0, 3.0)),
                resource("coal", (0.0, 2.0, 0.0)),
                resource("fish", (2.0, 0.0, 0.0)),
                resource("fruit", (4.0, 0.0, 1.0)),
                resource("gems", (0.0, 0.0, 4.0)),
                resource("buffalo", (0.0, 2.0, 0.0)),
                resource("wheat", (2.0, 0.0, 0.0)),
                resource("oasis", (3.0, 0.0, 0.0)),
                resource("peat", (0.0, 4.0, 0.0)),
                resource("pheasant", (2.0, 0.0, 0.0)),
                resource("resources", (0.0, 1.0, 0.0)),
                resource("ivory", (1.0, 1.0, 4.0)),
                resource("silk", (0.0, 3.0, 1.0)),
                resource("spice", (2.0, 0.0, 4.0)),
                resource("whales", (1.0, 1.0, 0.0)),
                resource("wine", (0.0, 0.0, 4.0)),
                resource("oil", (0.0, 3.0, 0.0)),
            ],
        }
    }

    /// Load tables from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse tables from a TOML string; names are lower-cased
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut tables: RulesetTables = toml::from_str(content)?;
        for entry in &mut tables.terrain {
            entry.name = entry.name.to_lowercase();
            entry.resources.iter_mut().for_each(|r| *r = r.to_lowercase());
        }
        for entry in &mut tables.resource {
            entry.name = entry.name.to_lowercase();
        }
        Ok(tables)
    }

    /// Replace terrain map characters with those a save file declares
    pub fn with_idents(mut self, idents: &AHashMap<String, char>) -> Self {
        for entry in &mut self.terrain {
            if let Some(ident) = idents.get(&entry.name) {
                entry.ident = *ident;
            }
        }
        self
    }

    /// Resolve names into the character / code keyed tables the generator uses
    pub fn resolve(&self) -> Result<TileTables> {
        let mut tables = TileTables::default();
        for entry in &self.resource {
            // Names outside the save format's code table cannot appear on a map
            match code_for(&entry.name) {
                Some(code) => tables.insert_resource(code, Fpt::new(entry.food, entry.shield, entry.trade)),
                None => tracing::warn!(resource = %entry.name, "Resource has no save-file code, skipped"),
            }
        }
        for entry in &self.terrain {
            let mut allowed = Vec::with_capacity(entry.resources.len());
            for name in &entry.resources {
                let code = code_for(name).ok_or_else(|| {
                    ScenarioError::Config(format!(
                        "terrain `{}` allows unknown resource `{}`",
                        entry.name, name
                    ))
                })?;
                allowed.push(code);
            }
            tables.insert_terrain(
                entry.ident,
                Fpt::new(entry.food, entry.shield, entry.trade),
                allowed,
            );
        }
        Ok(tables)
    }
}
