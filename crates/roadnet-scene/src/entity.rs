//! Road network entities

use crate::category::{EntityCategory, EntityKind, RoadCategory};
use roadnet_core::{EntityId, Vec3};
use roadnet_curve::{ReferenceLine, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store key of any entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityKey {
    pub fn road(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Road,
            id,
        }
    }

    pub fn junction(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Junction,
            id,
        }
    }

    pub fn signal(id: EntityId) -> Self {
        Self {
            kind: EntityKind::Signal,
            id,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.name(), self.id)
    }
}

/// Back-reference to a road, resolved through the store on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadRef {
    pub id: EntityId,
    pub category: RoadCategory,
}

/// Back-reference to a lane of another road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneRef {
    pub road: EntityId,
    pub side: Side,
    pub lane: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneKind {
    #[default]
    Driving,
    Sidewalk,
    Shoulder,
    Biking,
    Parking,
    Median,
}

/// Marking drawn on a lane's outer boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryType {
    #[default]
    Solid,
    Dashed,
    DoubleSolid,
    Curb,
    None,
}

/// Lane metadata used when a lane is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSpec {
    #[serde(default)]
    pub kind: LaneKind,
    #[serde(default = "default_lane_width")]
    pub width: f64,
    #[serde(default)]
    pub boundary: BoundaryType,
}

fn default_lane_width() -> f64 {
    3.5
}

impl Default for LaneSpec {
    fn default() -> Self {
        Self {
            kind: LaneKind::Driving,
            width: default_lane_width(),
            boundary: BoundaryType::Solid,
        }
    }
}

/// Lanes of a new road, each side ordered outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneLayout {
    #[serde(default)]
    pub left: Vec<LaneSpec>,
    #[serde(default)]
    pub right: Vec<LaneSpec>,
}

impl Default for LaneLayout {
    /// One driving lane per side.
    fn default() -> Self {
        Self {
            left: vec![LaneSpec::default()],
            right: vec![LaneSpec::default()],
        }
    }
}

impl LaneLayout {
    pub fn side(&self, side: Side) -> &[LaneSpec] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// One lane: metadata plus a boundary pair the length of the reference serie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: u32,
    pub kind: LaneKind,
    pub width: f64,
    pub boundary: BoundaryType,
    pub inner: Vec<Vec3>,
    pub outer: Vec<Vec3>,
    #[serde(default)]
    pub predecessor: Option<LaneRef>,
    #[serde(default)]
    pub successor: Option<LaneRef>,
}

impl Lane {
    /// A lane with no boundaries yet; they are filled by the next rebuild.
    pub fn from_spec(id: u32, spec: &LaneSpec) -> Self {
        Self {
            id,
            kind: spec.kind,
            width: spec.width,
            boundary: spec.boundary,
            inner: Vec::new(),
            outer: Vec::new(),
            predecessor: None,
            successor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: EntityId,
    pub category: RoadCategory,
    pub reference: ReferenceLine,
    pub left: Vec<Lane>,
    pub right: Vec<Lane>,
    #[serde(default)]
    pub prev: Option<RoadRef>,
    #[serde(default)]
    pub next: Option<RoadRef>,
    #[serde(default)]
    pub junction: Option<EntityId>,
}

impl Road {
    pub fn new(id: EntityId, category: RoadCategory, reference: ReferenceLine) -> Self {
        Self {
            id,
            category,
            reference,
            left: Vec::new(),
            right: Vec::new(),
            prev: None,
            next: None,
            junction: None,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::road(self.id)
    }

    pub fn as_ref(&self) -> RoadRef {
        RoadRef {
            id: self.id,
            category: self.category,
        }
    }

    pub fn lanes(&self, side: Side) -> &[Lane] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn lanes_mut(&mut self, side: Side) -> &mut Vec<Lane> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Position of lane `id` counted outward from the reference line.
    pub fn lane_position(&self, side: Side, id: u32) -> Option<usize> {
        self.lanes(side).iter().position(|lane| lane.id == id)
    }

    pub fn lane(&self, side: Side, id: u32) -> Option<&Lane> {
        self.lanes(side).iter().find(|lane| lane.id == id)
    }

    /// Lane ids are unique per side and never reused while the road lives.
    pub fn next_lane_id(&self, side: Side) -> u32 {
        self.lanes(side).iter().map(|lane| lane.id).max().map_or(1, |id| id + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub id: EntityId,
    /// Member roads in creation order
    pub members: Vec<EntityId>,
    /// Connection roads owned by this junction
    #[serde(default)]
    pub connections: Vec<EntityId>,
}

impl Junction {
    pub fn key(&self) -> EntityKey {
        EntityKey::junction(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: EntityId,
    pub road: EntityId,
    pub serie_index: usize,
    /// Lateral offset from the reference line, positive to the left
    pub offset: f64,
    pub kind: String,
    pub position: Vec3,
}

impl Signal {
    pub fn key(&self) -> EntityKey {
        EntityKey::signal(self.id)
    }
}

/// Snapshot of any entity, as stored by the edit journal and exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Entity {
    Road(Road),
    Junction(Junction),
    Signal(Signal),
}

impl Entity {
    pub fn key(&self) -> EntityKey {
        match self {
            Entity::Road(road) => road.key(),
            Entity::Junction(junction) => junction.key(),
            Entity::Signal(signal) => signal.key(),
        }
    }

    pub fn category(&self) -> EntityCategory {
        match self {
            Entity::Road(road) => EntityCategory::Road(road.category),
            Entity::Junction(_) => EntityCategory::Junction,
            Entity::Signal(_) => EntityCategory::Signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> ReferenceLine {
        ReferenceLine {
            catmull: vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)],
            serie: vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)],
            catmull_indices: vec![0, 1],
            tangents: vec![Vec3::new(1.0, 0.0, 0.0); 2],
        }
    }

    #[test]
    fn test_lane_ids_grow_per_side() {
        let mut road = Road::new(EntityId::from_raw(7), RoadCategory::TwoStraightLine, line());
        assert_eq!(road.next_lane_id(Side::Left), 1);
        road.left.push(Lane::from_spec(1, &LaneSpec::default()));
        road.left.push(Lane::from_spec(4, &LaneSpec::default()));
        assert_eq!(road.next_lane_id(Side::Left), 5);
        assert_eq!(road.next_lane_id(Side::Right), 1);
        assert_eq!(road.lane_position(Side::Left, 4), Some(1));
        assert!(road.lane(Side::Right, 1).is_none());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(EntityKey::road(EntityId::from_raw(3)).to_string(), "road:3");
        assert_eq!(EntityKey::signal(EntityId::from_raw(9)).to_string(), "signal:9");
    }

    #[test]
    fn test_entity_snapshot_serializes_with_entity_tag() {
        let road = Road::new(EntityId::from_raw(2), RoadCategory::CatmullSerie, line());
        let json = serde_json::to_value(Entity::Road(road)).unwrap();
        assert_eq!(json["entity"], "road");
        assert_eq!(json["category"], "catmull_serie");
        assert_eq!(json["id"], 2);
    }
}
