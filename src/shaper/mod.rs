//! Stochastic map shaping: score buckets, tile mutations, coastline
//! reshaping and the random walk that ties them together

pub mod buckets;
pub mod converge;
pub mod generator;
pub mod land;
pub mod mutation;
pub mod random_map;
pub mod walk;

pub use buckets::TerrainBuckets;
pub use converge::{converge, perturb};
pub use generator::{shape_map, ShapeContext, ShapeReport};
pub use land::modify_land;
pub use mutation::MutationKind;
pub use random_map::random_map;
pub use walk::{city_location, city_locations, is_accessible, unit_accessible_locations, walk_step};
