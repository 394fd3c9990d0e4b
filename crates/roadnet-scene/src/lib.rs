//! Roadnet Scene - Entity store for the road network
//!
//! Plain keyed collections of roads, junctions and signals. The store has
//! no undo semantics of its own; every history concern lives in
//! `roadnet-edit`. Cross-entity links are id keys resolved on access.

mod category;
mod dirty;
mod entity;
mod export;
mod store;

pub use category::{EntityCategory, EntityKind, RoadCategory, RoadProfile};
pub use dirty::DirtyTracker;
pub use entity::{
    BoundaryType, Entity, EntityKey, Junction, Lane, LaneKind, LaneLayout, LaneRef, LaneSpec,
    Road, RoadRef, Signal,
};
pub use export::{ExportBatch, ExportRecord, ExportSync};
pub use store::SceneStore;
