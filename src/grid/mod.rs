//! Grid model: terrain, resource, visibility and ownership layers

pub mod layer;
pub mod model;
pub mod ownership;
pub mod resource;
pub mod terrain;

pub use layer::Grid;
pub use model::{LayerKey, MapModel, PlayerLayers};
pub use ownership::OwnershipLayers;
pub use resource::ResourceCode;
