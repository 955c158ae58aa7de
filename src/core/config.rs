//! Generation configuration with documented constants
//!
//! All tuning numbers of the map shaper are collected here with a note on
//! what they control and how they interact.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, ScenarioError};
use crate::core::types::{ScoreBound, Weight};
use crate::scoring::CITY_SCOPE_DEPTH;

/// Configuration for one shaping pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    // === WALK ===
    /// Number of outer steps; each step picks a fresh city-accessible
    /// location and starts a new walk from it
    pub max_steps: usize,

    /// Upper bound on locations visited by a single walk
    ///
    /// A walk also ends early when no neighbour is accessible.
    pub max_walks: usize,

    /// Distance in tiles covered by one walk step
    ///
    /// At 3, consecutive walk locations share most of their scope, so a
    /// bound enforced at one location is not immediately undone at the next.
    pub stride: usize,

    /// Tiles kept clear between a walk location and the map edge
    ///
    /// Walk scopes do not wrap, so this must cover a full city scope.
    pub margin: usize,

    // === SCORING ===
    /// Number of best tiles in a scope that form its aggregate score
    pub topk: usize,

    /// Weights collapsing food/shield/trade into a single score
    pub weight: Weight,

    /// Target band for the top-k score; `None` disables convergence
    pub score_bound: Option<ScoreBound>,

    /// Rank zero-yield tiles (ocean, glacier, inaccessible) after all
    /// productive tiles when picking the top-k
    pub keep_ocean: bool,

    // === MUTATION ===
    /// Probability that a perturbed tile also gains or loses a resource;
    /// also the per-tile resource probability of a random map
    pub resource_prob: f64,

    /// Fraction of `max_steps` after which same-bucket perturbation stops
    ///
    /// Late steps then only enforce the bound, so the map settles.
    pub perturb_cutoff: f64,

    /// Fraction of `max_steps` after which coastline reshaping stops
    ///
    /// Kept below `perturb_cutoff` so the land mass is fixed before the
    /// last terrain variety is added.
    pub reshape_cutoff: f64,

    /// Share of lake tiles in a scope above which a bucket shift avoids
    /// picking lake again
    pub lake_limit: f64,

    /// Maximum mutations in one convergence loop before the bound is
    /// declared unsatisfiable
    pub convergence_limit: usize,

    // === PLACEMENT ===
    /// Center samples tried before clustering gives up
    pub cluster_attempts: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            // Walk
            max_steps: 20,
            max_walks: 10,
            stride: 3,
            margin: 2,

            // Scoring
            topk: 8,
            weight: Weight::default(),
            score_bound: None,
            keep_ocean: true,

            // Mutation
            resource_prob: 0.15,
            perturb_cutoff: 0.6,
            reshape_cutoff: 0.5,
            lake_limit: 0.2,
            convergence_limit: 10_000,

            // Placement
            cluster_attempts: 100,
        }
    }
}

impl GenerationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing keys take their defaults
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a config from a TOML string and validate it
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: GenerationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.topk == 0 {
            return Err(ScenarioError::Config("topk must be at least 1".into()));
        }

        if self.stride == 0 {
            return Err(ScenarioError::Config("stride must be at least 1".into()));
        }

        if self.margin < CITY_SCOPE_DEPTH {
            return Err(ScenarioError::Config(format!(
                "margin ({}) should be at least the city scope depth ({})",
                self.margin, CITY_SCOPE_DEPTH
            )));
        }

        if let Some(bound) = self.score_bound {
            if bound.lower > bound.upper {
                return Err(ScenarioError::Config(format!(
                    "score_bound lower ({}) should be <= upper ({})",
                    bound.lower, bound.upper
                )));
            }
        }

        // Probabilities and step fractions live in [0, 1]
        for (name, value) in [
            ("resource_prob", self.resource_prob),
            ("perturb_cutoff", self.perturb_cutoff),
            ("reshape_cutoff", self.reshape_cutoff),
            ("lake_limit", self.lake_limit),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScenarioError::Config(format!(
                    "{} ({}) should be within [0, 1]",
                    name, value
                )));
            }
        }

        let weights = [self.weight.food, self.weight.shield, self.weight.trade];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(ScenarioError::Config("weights must be non-negative".into()));
        }

        if self.convergence_limit == 0 || self.cluster_attempts == 0 {
            return Err(ScenarioError::Config(
                "convergence_limit and cluster_attempts must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Step index before which same-bucket perturbation runs
    pub fn perturb_steps(&self) -> f64 {
        self.perturb_cutoff * self.max_steps as f64
    }

    /// Step index before which coastline reshaping runs
    pub fn reshape_steps(&self) -> f64 {
        self.reshape_cutoff * self.max_steps as f64
    }
}
