//! Civ Scenario - save-file round-tripping and procedural scenario
//! regeneration for turn-based strategy saves

pub mod core;
pub mod grid;
pub mod placement;
pub mod rules;
pub mod sav;
pub mod scenario;
pub mod scoring;
pub mod shaper;
