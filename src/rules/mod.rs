//! Read-only rules: productivity tables and unit facts

pub mod ruleset;
pub mod tables;
pub mod units;

pub use ruleset::{ResourceEntry, RulesetTables, TerrainEntry};
pub use tables::TileTables;
