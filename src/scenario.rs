//! One regeneration session: a parsed save, its typed map, and the players'
//! units and cities, shaped and re-seeded together
//!
//! Every stage edits the session in place. Attempts that fail with a
//! retryable error are thrown away and restarted from a clean copy with the
//! next seed.

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::GenerationConfig;
use crate::core::error::{Result, ScenarioError};
use crate::grid::model::MapModel;
use crate::placement::{
    align_player_layers, assign_cities, assign_units, find_clusters, read_colonies, refresh_visibility, sightings,
    Cluster, ClusterSpec, Colony,
};
use crate::rules::{RulesetTables, TileTables};
use crate::sav::{serialize, Overrides, SavDocument};
use crate::shaper::{shape_map, unit_accessible_locations, ShapeReport};

#[derive(Debug, Clone)]
pub struct Scenario {
    pub document: SavDocument,
    pub model: MapModel,
    pub colonies: Vec<Colony>,
}

/// What one successful regeneration did
#[derive(Debug, Clone, Serialize)]
pub struct RegenReport {
    pub seed: u64,
    /// Zero-based attempt that succeeded
    pub attempt: usize,
    pub shape: ShapeReport,
    pub clusters: Vec<Cluster>,
    pub cities_placed: usize,
    /// Player tiles forced back in line with the global map
    pub aligned_tiles: usize,
}

impl Scenario {
    pub fn from_document(document: SavDocument) -> Result<Self> {
        let model = MapModel::from_document(&document)?;
        let colonies = read_colonies(&document)?;
        Ok(Self { document, model, colonies })
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_document(SavDocument::load(path)?)
    }

    /// Resolve a ruleset against the terrain idents this save declares
    pub fn tables(&self, ruleset: RulesetTables) -> Result<TileTables> {
        ruleset.with_idents(&self.document.terrain_idents()).resolve()
    }

    /// Map layers plus unit and city tables as field overrides
    pub fn overrides(&self) -> Result<Overrides> {
        let mut overrides = self.model.to_overrides()?;
        for colony in &self.colonies {
            colony.write_overrides(&mut overrides);
        }
        Ok(overrides)
    }

    pub fn render(&self) -> Result<String> {
        Ok(serialize(&self.document, &self.overrides()?))
    }

    /// Shape the map, then move units and cities into fresh clusters
    fn regenerate_once(
        &mut self,
        tables: &TileTables,
        config: &GenerationConfig,
        rng: &mut ChaCha8Rng,
    ) -> Result<(ShapeReport, Vec<Cluster>, usize)> {
        let shape = shape_map(&mut self.model, tables, config, rng)?;

        let land = unit_accessible_locations(&self.model.terrain, false, true);
        let ocean = unit_accessible_locations(&self.model.terrain, true, false);
        let demands: Vec<_> = self.colonies.iter().map(Colony::demand).collect();
        let spec = ClusterSpec { attempts: config.cluster_attempts, ..ClusterSpec::default() };
        let clusters = find_clusters(
            &land,
            &ocean,
            &demands,
            &spec,
            self.model.rows(),
            self.model.cols(),
            rng,
        );

        assign_units(&mut self.colonies, &clusters, rng)?;
        let own = self.model.ownership.as_mut();
        let cities_placed = assign_cities(&mut self.colonies, &clusters, own, rng)?.len();
        refresh_visibility(&mut self.model, &sightings(&self.colonies)?)?;
        Ok((shape, clusters, cities_placed))
    }

    /// Regenerate from `seed`, trying up to `attempts` consecutive seeds
    ///
    /// Returns the regenerated copy; `self` is never modified.
    pub fn regenerate(
        &self,
        tables: &TileTables,
        config: &GenerationConfig,
        seed: u64,
        attempts: usize,
    ) -> Result<(Scenario, RegenReport)> {
        config.validate()?;
        if attempts == 0 {
            return Err(ScenarioError::Config("attempts must be at least 1".into()));
        }

        let mut last_error = None;
        for attempt in 0..attempts {
            let seed = seed.wrapping_add(attempt as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut candidate = self.clone();
            match candidate.regenerate_once(tables, config, &mut rng) {
                Ok((shape, clusters, cities_placed)) => {
                    let aligned_tiles = align_player_layers(&mut candidate.model);
                    tracing::info!(attempt, seed, mutations = shape.total_mutations(), "Regenerated scenario");
                    let report = RegenReport { seed, attempt, shape, clusters, cities_placed, aligned_tiles };
                    return Ok((candidate, report));
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(attempt, seed, error = %err, "Attempt failed, retrying");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_error.unwrap_or(ScenarioError::NoAccessibleLocation))
    }
}
