pub mod config;
pub mod error;
pub mod types;

pub use config::GenerationConfig;
pub use error::{Result, ScenarioError};
pub use types::{round_score, Fpt, Location, ScoreBound, Weight};
