//! Roadnet Core - Foundational types for the roadnet editor
//!
//! This crate provides the types every other roadnet crate depends on:
//! - `EntityId` - Stable entity identifiers
//! - `ContentHash` - SHA-256 based change detection for export
//! - `Vec3`, `Vec2` - Points in the scene and on the ground plane
//! - `math` - Distance, projection, normals and ground-plane intersection
//! - Error types and Result alias

mod error;
mod hash;
mod id;
pub mod math;
mod types;

pub use error::{Result, RoadError};
pub use hash::ContentHash;
pub use id::EntityId;
pub use math::CurveMath;
pub use types::{Vec2, Vec3};
