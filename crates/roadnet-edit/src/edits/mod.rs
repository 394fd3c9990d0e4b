//! Built-in edit behaviors

mod altitude;
mod junction;
mod lane;
mod road;
mod signal;

pub use altitude::altitude_edit;
pub use lane::rebuild_lanes;

use crate::payload::{EditKind, EditPayload};
use crate::registry::{EditBehavior, TransactionMap};
use roadnet_core::{Result, RoadError, Vec3};
use roadnet_scene::{EntityCategory, RoadCategory, SceneStore};

/// Register every built-in `(EditKind, EntityCategory)` pair.
pub fn register_defaults(map: &mut TransactionMap) {
    use EditKind::*;

    for category in RoadCategory::ALL {
        let target = EntityCategory::Road(category);
        map.register(Create, target, EditBehavior::new(road::validate_create, road::apply_create));
        map.register(Remove, target, EditBehavior::new(no_check, road::apply_remove));
        map.register(
            MoveControlPoint,
            target,
            EditBehavior::new(road::validate_move_control_point, road::apply_move_control_point),
        );
        map.register(
            ConnectRoads,
            target,
            EditBehavior::new(road::validate_connect, road::apply_connect),
        );
        map.register(
            MoveLaneBoundaryPoint,
            target,
            EditBehavior::new(lane::validate_move_boundary_point, lane::apply_move_boundary_point),
        );
        map.register(
            SetLaneWidth,
            target,
            EditBehavior::new(lane::validate_set_width, lane::apply_set_width),
        );
        map.register(
            SetLaneBoundaryType,
            target,
            EditBehavior::new(lane::validate_set_boundary_type, lane::apply_set_boundary_type),
        );
        map.register(AddLane, target, EditBehavior::new(lane::validate_add, lane::apply_add));
        map.register(RemoveLane, target, EditBehavior::new(lane::validate_remove, lane::apply_remove));

        if category.profile().resizable {
            map.register(
                InsertControlPoint,
                target,
                EditBehavior::new(road::validate_insert_control_point, road::apply_insert_control_point),
            );
            map.register(
                RemoveControlPoint,
                target,
                EditBehavior::new(
                    road::validate_remove_control_point,
                    road::apply_remove_control_point,
                ),
            );
        }
    }

    let target = EntityCategory::Junction;
    map.register(Create, target, EditBehavior::new(junction::validate_create, junction::apply_create));
    map.register(Remove, target, EditBehavior::new(no_check, junction::apply_remove));
    map.register(RefreshJunction, target, EditBehavior::new(no_check, junction::apply_refresh));

    let target = EntityCategory::Signal;
    map.register(Create, target, EditBehavior::new(signal::validate_create, signal::apply_create));
    map.register(Remove, target, EditBehavior::new(no_check, signal::apply_remove));
    map.register(MoveSignal, target, EditBehavior::new(signal::validate_move, signal::apply_move));
}

fn no_check(_store: &SceneStore, _payload: &EditPayload) -> Result<()> {
    Ok(())
}

/// A behavior was handed a payload for another edit.
fn mismatch(expected: &str, payload: &EditPayload) -> RoadError {
    RoadError::InvalidState(format!(
        "{} behavior received a {} payload",
        expected,
        payload.kind()
    ))
}

/// Treat a stale id as nothing to do.
fn skip_missing<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_lookup_failure() => {
            tracing::debug!(%err, "skipping stale reference");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn precondition(message: impl Into<String>) -> RoadError {
    RoadError::Precondition(message.into())
}

/// Every coordinate of every point must be finite.
fn check_finite(points: &[Vec3]) -> Result<()> {
    match points.iter().find(|p| !p.is_finite()) {
        Some(p) => Err(precondition(format!("point {:?} is not finite", p))),
        None => Ok(()),
    }
}
