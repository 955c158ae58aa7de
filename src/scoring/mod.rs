//! Tile productivity, scope geometry and map-wide score statistics

pub mod connectivity;
pub mod property;
pub mod scope;
pub mod stats;
pub mod topk;

pub use connectivity::{connectivity, Connectivity};
pub use property::{scope_properties, tile_property, total_score, TileProperty};
pub use scope::{city_scope, max_turns_scope, scope, scope_offsets, unit_scope, ScopeMode, CITY_SCOPE_DEPTH};
pub use stats::{
    map_summary, optimal_locations, scope_statistics, score_map, unit_summary, ScopeStatistics,
    ScoreSummary,
};
pub use topk::{evaluate_topk, reorder, topk_fpt, TopK};
