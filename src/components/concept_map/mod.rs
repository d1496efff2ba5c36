mod component;
mod config;
mod drag;
mod layout;
mod media;
mod render;
mod state;
mod timesync;
mod transform;
mod types;
mod viewport;
mod visibility;

pub use component::ConceptMapCanvas;
pub use config::edit_mode_from_location;
pub use types::{ConceptSeed, Dataset, NodeId, Point, Relation};
