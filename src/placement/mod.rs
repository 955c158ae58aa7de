//! Placement: colony clusters, unit and city seeding, ownership and
//! player visibility

pub mod city;
pub mod cluster;
pub mod colony;
pub mod records;
pub mod units;
pub mod visibility;

pub use city::{assign_cities, place_cities, place_city, place_sites, CityPlacement, CitySite};
pub use cluster::{find_clusters, looped_distance, require_clusters, Cluster, ClusterSpec, ColonyDemand};
pub use colony::{read_colonies, Colony};
pub use records::RecordTable;
pub use units::{assign_units, colony_clusters};
pub use visibility::{align_player_layers, misaligned_tiles, refresh_visibility, sightings, Sighting};
