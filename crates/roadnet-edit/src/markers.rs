//! Marker boundary. The rendering side owns marker meshes; edits only ask
//! for them to be disposed and recreated.

use roadnet_core::Vec3;
use roadnet_scene::EntityKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

pub trait MarkerHost {
    /// Drop every marker that belongs to `keys`.
    fn dispose_markers(&mut self, keys: &[EntityKey]);

    fn create_marker(&mut self, point: Vec3) -> MarkerHandle;
}

/// Hands out handles and draws nothing.
#[derive(Debug, Default)]
pub struct NullMarkers {
    next: u64,
}

impl MarkerHost for NullMarkers {
    fn dispose_markers(&mut self, _keys: &[EntityKey]) {}

    fn create_marker(&mut self, _point: Vec3) -> MarkerHandle {
        self.next += 1;
        MarkerHandle(self.next)
    }
}
