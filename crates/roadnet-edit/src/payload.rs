//! Edit payloads - the data half of a transaction

use roadnet_core::{EntityId, Vec3};
use roadnet_curve::Side;
use roadnet_scene::{BoundaryType, EntityCategory, EntityKey, LaneLayout, LaneSpec, RoadCategory, SceneStore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Edit half of the `(EditKind, EntityCategory)` dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EditKind {
    Create,
    Remove,
    MoveControlPoint,
    InsertControlPoint,
    RemoveControlPoint,
    MoveLaneBoundaryPoint,
    SetLaneWidth,
    SetLaneBoundaryType,
    AddLane,
    RemoveLane,
    ConnectRoads,
    MoveSignal,
    RefreshJunction,
}

impl EditKind {
    pub fn name(self) -> &'static str {
        match self {
            EditKind::Create => "Create",
            EditKind::Remove => "Remove",
            EditKind::MoveControlPoint => "MoveControlPoint",
            EditKind::InsertControlPoint => "InsertControlPoint",
            EditKind::RemoveControlPoint => "RemoveControlPoint",
            EditKind::MoveLaneBoundaryPoint => "MoveLaneBoundaryPoint",
            EditKind::SetLaneWidth => "SetLaneWidth",
            EditKind::SetLaneBoundaryType => "SetLaneBoundaryType",
            EditKind::AddLane => "AddLane",
            EditKind::RemoveLane => "RemoveLane",
            EditKind::ConnectRoads => "ConnectRoads",
            EditKind::MoveSignal => "MoveSignal",
            EditKind::RefreshJunction => "RefreshJunction",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to apply one edit. Ids of new entities are chosen
/// up front so that a redo recreates the same ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum EditPayload {
    CreateRoad {
        id: EntityId,
        category: RoadCategory,
        points: Vec<Vec3>,
        #[serde(default)]
        lanes: LaneLayout,
    },
    CreateJunction {
        id: EntityId,
        members: Vec<EntityId>,
    },
    CreateSignal {
        id: EntityId,
        road: EntityId,
        serie_index: usize,
        #[serde(default)]
        offset: f64,
        kind: String,
    },
    RemoveRoad {
        road: EntityId,
    },
    RemoveJunction {
        junction: EntityId,
    },
    RemoveSignal {
        signal: EntityId,
    },
    MoveControlPoint {
        road: EntityId,
        index: usize,
        point: Vec3,
    },
    InsertControlPoint {
        road: EntityId,
        point: Vec3,
    },
    RemoveControlPoint {
        road: EntityId,
        index: usize,
    },
    MoveLaneBoundaryPoint {
        road: EntityId,
        side: Side,
        lane: u32,
        index: usize,
        point: Vec3,
    },
    SetLaneWidth {
        road: EntityId,
        side: Side,
        lane: u32,
        width: f64,
    },
    SetLaneBoundaryType {
        road: EntityId,
        side: Side,
        lane: u32,
        boundary: BoundaryType,
    },
    AddLane {
        road: EntityId,
        side: Side,
        #[serde(default)]
        lane: LaneSpec,
    },
    RemoveLane {
        road: EntityId,
        side: Side,
        lane: u32,
    },
    ConnectRoads {
        from: EntityId,
        to: EntityId,
    },
    MoveSignal {
        signal: EntityId,
        serie_index: usize,
    },
    RefreshJunction {
        junction: EntityId,
    },
}

/// What an edit acts on: a new entity of a known category, or an existing
/// one whose category must be read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    New(EntityCategory),
    Existing(EntityKey),
}

impl EditPayload {
    pub fn kind(&self) -> EditKind {
        match self {
            EditPayload::CreateRoad { .. }
            | EditPayload::CreateJunction { .. }
            | EditPayload::CreateSignal { .. } => EditKind::Create,
            EditPayload::RemoveRoad { .. }
            | EditPayload::RemoveJunction { .. }
            | EditPayload::RemoveSignal { .. } => EditKind::Remove,
            EditPayload::MoveControlPoint { .. } => EditKind::MoveControlPoint,
            EditPayload::InsertControlPoint { .. } => EditKind::InsertControlPoint,
            EditPayload::RemoveControlPoint { .. } => EditKind::RemoveControlPoint,
            EditPayload::MoveLaneBoundaryPoint { .. } => EditKind::MoveLaneBoundaryPoint,
            EditPayload::SetLaneWidth { .. } => EditKind::SetLaneWidth,
            EditPayload::SetLaneBoundaryType { .. } => EditKind::SetLaneBoundaryType,
            EditPayload::AddLane { .. } => EditKind::AddLane,
            EditPayload::RemoveLane { .. } => EditKind::RemoveLane,
            EditPayload::ConnectRoads { .. } => EditKind::ConnectRoads,
            EditPayload::MoveSignal { .. } => EditKind::MoveSignal,
            EditPayload::RefreshJunction { .. } => EditKind::RefreshJunction,
        }
    }

    pub fn subject(&self) -> Subject {
        match self {
            EditPayload::CreateRoad { category, .. } => Subject::New(EntityCategory::Road(*category)),
            EditPayload::CreateJunction { .. } => Subject::New(EntityCategory::Junction),
            EditPayload::CreateSignal { .. } => Subject::New(EntityCategory::Signal),
            EditPayload::RemoveRoad { road }
            | EditPayload::MoveControlPoint { road, .. }
            | EditPayload::InsertControlPoint { road, .. }
            | EditPayload::RemoveControlPoint { road, .. }
            | EditPayload::MoveLaneBoundaryPoint { road, .. }
            | EditPayload::SetLaneWidth { road, .. }
            | EditPayload::SetLaneBoundaryType { road, .. }
            | EditPayload::AddLane { road, .. }
            | EditPayload::RemoveLane { road, .. }
            | EditPayload::ConnectRoads { from: road, .. } => Subject::Existing(EntityKey::road(*road)),
            EditPayload::RemoveJunction { junction } | EditPayload::RefreshJunction { junction } => {
                Subject::Existing(EntityKey::junction(*junction))
            }
            EditPayload::RemoveSignal { signal } | EditPayload::MoveSignal { signal, .. } => {
                Subject::Existing(EntityKey::signal(*signal))
            }
        }
    }

    /// Category the edit dispatches on, `None` when the subject is gone.
    pub fn category(&self, store: &SceneStore) -> Option<EntityCategory> {
        match self.subject() {
            Subject::New(category) => Some(category),
            Subject::Existing(key) => store.category_of(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_reads_from_toml() {
        let payload: EditPayload = toml::from_str(
            r#"
edit = "create_road"
id = 42
category = "two_straight_line"
points = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]
"#,
        )
        .unwrap();
        assert_eq!(payload.kind(), EditKind::Create);
        assert_eq!(
            payload.subject(),
            Subject::New(EntityCategory::Road(RoadCategory::TwoStraightLine))
        );
        match payload {
            EditPayload::CreateRoad { lanes, points, .. } => {
                assert_eq!(points.len(), 2);
                assert_eq!(lanes, LaneLayout::default());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_connect_dispatches_on_the_source_road() {
        let payload = EditPayload::ConnectRoads {
            from: EntityId::from_raw(1),
            to: EntityId::from_raw(2),
        };
        assert_eq!(
            payload.subject(),
            Subject::Existing(EntityKey::road(EntityId::from_raw(1)))
        );
        assert_eq!(payload.category(&SceneStore::new()), None);
    }
}
