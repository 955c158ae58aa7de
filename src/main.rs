//! Civ Scenario - command line entry point
//!
//! `roundtrip` checks that a save survives parse and write unchanged,
//! `regen` reshapes the map and re-seeds every player, `stats` reports the
//! city score surface of a save.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use civ_scenario::core::config::GenerationConfig;
use civ_scenario::core::error::Result;
use civ_scenario::rules::RulesetTables;
use civ_scenario::sav::{self, Overrides, SavDocument};
use civ_scenario::scenario::Scenario;
use civ_scenario::scoring::{
    map_summary, optimal_locations, scope_statistics, score_map, unit_summary, ScopeStatistics, ScoreSummary,
};

#[derive(Parser, Debug)]
#[command(name = "civ-scenario")]
#[command(about = "Round-trip and regenerate strategy game save files")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-emit a save without changes and report whether it is identical
    Roundtrip {
        sav: PathBuf,

        /// Also write the re-emitted save here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Reshape the map and move every player's units and cities
    Regen {
        sav: PathBuf,

        /// Random seed for deterministic runs
        #[arg(long)]
        seed: Option<u64>,

        /// Generation config (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Ruleset tables (TOML); the classic ruleset when omitted
        #[arg(long)]
        ruleset: Option<PathBuf>,

        /// Output save path
        #[arg(long)]
        out: PathBuf,

        /// Seeds tried before giving up
        #[arg(long, default_value_t = 10)]
        attempts: usize,
    },

    /// Score every tile as a city site and summarise the result
    Stats {
        sav: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        ruleset: Option<PathBuf>,

        /// Turns of movement counted around each unit
        #[arg(long, default_value_t = 3)]
        turns: usize,

        /// Report tiles scoring above this; the 90th percentile when omitted
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Serialize)]
struct RoundtripResult {
    lines: usize,
    identical: bool,
    model_identical: bool,
}

#[derive(Serialize)]
struct UnitStats {
    player: usize,
    unit: String,
    summary: Option<ScoreSummary>,
}

#[derive(Serialize)]
struct StatsResult {
    map: Option<ScoreSummary>,
    units: Vec<UnitStats>,
    threshold: Option<f64>,
    optimal_locations: usize,
    scope: ScopeStatistics,
}

fn load_config(path: Option<&Path>) -> Result<GenerationConfig> {
    match path {
        Some(path) => GenerationConfig::load_from_toml(path),
        None => Ok(GenerationConfig::default()),
    }
}

fn load_ruleset(path: Option<&Path>) -> Result<RulesetTables> {
    match path {
        Some(path) => RulesetTables::load_from_toml(path),
        None => Ok(RulesetTables::classic()),
    }
}

fn roundtrip(path: &Path, out: Option<&Path>) -> Result<()> {
    let doc = SavDocument::load(path)?;
    let normalized = doc.normalized();
    let text = sav::serialize(&doc, &Overrides::new());
    let scenario = Scenario::from_document(doc)?;
    let result = RoundtripResult {
        lines: scenario.document.lines().len(),
        identical: text == normalized,
        model_identical: scenario.render()? == normalized,
    };
    if let Some(out) = out {
        std::fs::write(out, &text)?;
    }
    if !result.identical {
        tracing::warn!(path = %path.display(), "Save did not survive the round trip");
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn regen(
    path: &Path,
    seed: Option<u64>,
    config: Option<&Path>,
    ruleset: Option<&Path>,
    out: &Path,
    attempts: usize,
) -> Result<()> {
    let config = load_config(config)?;
    let scenario = Scenario::load(path)?;
    let tables = scenario.tables(load_ruleset(ruleset)?)?;
    let seed = seed.unwrap_or_else(rand::random);

    let (regenerated, report) = scenario.regenerate(&tables, &config, seed, attempts)?;
    sav::write(out, &regenerated.document, &regenerated.overrides()?)?;
    tracing::info!(out = %out.display(), seed = report.seed, "Wrote regenerated save");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn stats(
    path: &Path,
    config: Option<&Path>,
    ruleset: Option<&Path>,
    turns: usize,
    threshold: Option<f64>,
) -> Result<()> {
    let config = load_config(config)?;
    let scenario = Scenario::load(path)?;
    let tables = scenario.tables(load_ruleset(ruleset)?)?;
    let scores = score_map(&scenario.model, &tables, &config.weight, config.topk, config.keep_ocean)?;
    let map = map_summary(&scores);

    let mut units = Vec::new();
    for colony in &scenario.colonies {
        for (unit, loc) in colony.unit_positions()? {
            if scores.get(loc).is_err() {
                tracing::warn!(player = colony.index, %unit, %loc, "Unit outside the map, skipped");
                continue;
            }
            let summary = unit_summary(&scenario.model, &scores, loc, turns);
            units.push(UnitStats { player: colony.index, unit, summary });
        }
    }

    let threshold = threshold.or_else(|| map.as_ref().and_then(|m| m.percentile(90)));
    let optimal = threshold.map_or(0, |t| optimal_locations(&scores, t, None).len());
    let result = StatsResult {
        map,
        units,
        threshold,
        optimal_locations: optimal,
        scope: scope_statistics(&scenario.model)?,
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("civ_scenario=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Roundtrip { sav, out } => roundtrip(&sav, out.as_deref()),
        Command::Regen { sav, seed, config, ruleset, out, attempts } => {
            regen(&sav, seed, config.as_deref(), ruleset.as_deref(), &out, attempts)
        }
        Command::Stats { sav, config, ruleset, turns, threshold } => {
            stats(&sav, config.as_deref(), ruleset.as_deref(), turns, threshold)
        }
    }
}
