//! Lane edits and boundary rebuilding

use super::{check_finite, mismatch, precondition};
use crate::context::EditContext;
use crate::payload::EditPayload;
use roadnet_core::{EntityId, Result, RoadError};
use roadnet_curve::{BoundaryPair, CurveEngine, LaneRepair, RepairRejection, Side};
use roadnet_scene::{Lane, Road, SceneStore};

const SIDES: [Side; 2] = [Side::Left, Side::Right];

fn invalid_geometry(road: EntityId, side: Side, lanes: &[Lane], rejection: RepairRejection) -> RoadError {
    let lane = lanes
        .get(rejection.lane_index)
        .map_or(rejection.lane_index as u32, |lane| lane.id);
    RoadError::InvalidGeometry {
        road: road.to_string(),
        lane: format!("{} {}", side.name(), lane),
        crossings: rejection.crossings,
        tolerance: rejection.tolerance,
    }
}

/// Regenerate every lane boundary of `road` from its reference serie.
///
/// Fails with `InvalidGeometry` when any lane folds beyond the repair
/// tolerance; the road is left untouched in that case.
pub fn rebuild_lanes(road: &mut Road, engine: &CurveEngine) -> Result<()> {
    let mut rebuilt = Vec::with_capacity(2);
    for side in SIDES {
        let lanes = road.lanes(side);
        let widths: Vec<f64> = lanes.iter().map(|lane| lane.width).collect();
        let pairs = engine
            .build_boundaries(&road.reference.serie, &widths, side)
            .map_err(|rejection| invalid_geometry(road.id, side, lanes, rejection))?;
        rebuilt.push((side, pairs));
    }
    for (side, pairs) in rebuilt {
        write_pairs(road.lanes_mut(side), pairs, 0);
    }
    Ok(())
}

fn write_pairs(lanes: &mut [Lane], pairs: Vec<BoundaryPair>, start: usize) {
    for (lane, pair) in lanes.iter_mut().zip(pairs).skip(start) {
        lane.inner = pair.inner;
        lane.outer = pair.outer;
    }
}

fn lane_position(store: &SceneStore, road: EntityId, side: Side, lane: u32) -> Result<usize> {
    let road = store
        .road(road)
        .ok_or_else(|| RoadError::EntityNotFound(road.to_string()))?;
    road.lane_position(side, lane)
        .ok_or_else(|| precondition(format!("road {} has no {} lane {}", road.id, side.name(), lane)))
}

fn check_width(width: f64) -> Result<()> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(precondition(format!("lane width must be positive, got {}", width)))
    }
}

pub(super) fn validate_move_boundary_point(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::MoveLaneBoundaryPoint {
        road,
        side,
        lane,
        index,
        point,
    } = payload
    else {
        return Err(mismatch("MoveLaneBoundaryPoint", payload));
    };
    check_finite(&[*point])?;
    let position = lane_position(store, *road, *side, *lane)?;
    let len = store
        .road(*road)
        .map_or(0, |road| road.lanes(*side)[position].outer.len());
    if *index >= len {
        return Err(precondition(format!(
            "boundary point {} out of range (0..{})",
            index, len
        )));
    }
    Ok(())
}

/// Move one outer boundary point, then repair that lane and carry the
/// result outward into the following lanes.
pub(super) fn apply_move_boundary_point(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::MoveLaneBoundaryPoint {
        road,
        side,
        lane,
        index,
        point,
    } = payload
    else {
        return Err(mismatch("MoveLaneBoundaryPoint", payload));
    };
    let engine = ctx.engine();
    let road = ctx.road_mut(*road)?;
    let road_id = road.id;
    let lanes = road.lanes_mut(*side);
    let position = lanes
        .iter()
        .position(|l| l.id == *lane)
        .ok_or_else(|| precondition(format!("road {} has no {} lane {}", road_id, side.name(), lane)))?;

    let target = lanes[position]
        .outer
        .get_mut(*index)
        .ok_or_else(|| precondition(format!("boundary point {} out of range", index)))?;
    *target = *point;

    let mut pairs: Vec<BoundaryPair> = lanes
        .iter()
        .map(|l| BoundaryPair {
            inner: l.inner.clone(),
            outer: l.outer.clone(),
        })
        .collect();
    let changed = engine
        .refit_from(&mut pairs, position)
        .map_err(|rejection| invalid_geometry(road_id, *side, lanes.as_slice(), rejection))?;
    write_pairs(lanes, pairs, position);
    tracing::debug!(
        road = %road_id,
        side = side.name(),
        lane,
        index,
        repaired = changed,
        "moved lane boundary point"
    );
    Ok(())
}

pub(super) fn validate_set_width(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::SetLaneWidth {
        road,
        side,
        lane,
        width,
    } = payload
    else {
        return Err(mismatch("SetLaneWidth", payload));
    };
    check_width(*width)?;
    lane_position(store, *road, *side, *lane).map(|_| ())
}

pub(super) fn apply_set_width(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::SetLaneWidth {
        road,
        side,
        lane,
        width,
    } = payload
    else {
        return Err(mismatch("SetLaneWidth", payload));
    };
    let engine = ctx.engine();
    let road = ctx.road_mut(*road)?;
    let target = road
        .lanes_mut(*side)
        .iter_mut()
        .find(|l| l.id == *lane)
        .ok_or_else(|| precondition(format!("no {} lane {}", side.name(), lane)))?;
    target.width = *width;
    rebuild_lanes(road, engine)
}

pub(super) fn validate_set_boundary_type(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::SetLaneBoundaryType { road, side, lane, .. } = payload else {
        return Err(mismatch("SetLaneBoundaryType", payload));
    };
    lane_position(store, *road, *side, *lane).map(|_| ())
}

pub(super) fn apply_set_boundary_type(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::SetLaneBoundaryType {
        road,
        side,
        lane,
        boundary,
    } = payload
    else {
        return Err(mismatch("SetLaneBoundaryType", payload));
    };
    let road = ctx.road_mut(*road)?;
    let target = road
        .lanes_mut(*side)
        .iter_mut()
        .find(|l| l.id == *lane)
        .ok_or_else(|| precondition(format!("no {} lane {}", side.name(), lane)))?;
    target.boundary = *boundary;
    Ok(())
}

pub(super) fn validate_add(_store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::AddLane { lane, .. } = payload else {
        return Err(mismatch("AddLane", payload));
    };
    check_width(lane.width)
}

/// Append a lane on the outside of `side`.
pub(super) fn apply_add(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::AddLane { road, side, lane } = payload else {
        return Err(mismatch("AddLane", payload));
    };
    let engine = ctx.engine();
    let road = ctx.road_mut(*road)?;
    let id = road.next_lane_id(*side);
    road.lanes_mut(*side).push(Lane::from_spec(id, lane));
    rebuild_lanes(road, engine)
}

pub(super) fn validate_remove(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::RemoveLane { road, side, lane } = payload else {
        return Err(mismatch("RemoveLane", payload));
    };
    lane_position(store, *road, *side, *lane).map(|_| ())
}

pub(super) fn apply_remove(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::RemoveLane { road, side, lane } = payload else {
        return Err(mismatch("RemoveLane", payload));
    };
    let engine = ctx.engine();
    let road = ctx.road_mut(*road)?;
    let lanes = road.lanes_mut(*side);
    let position = lanes
        .iter()
        .position(|l| l.id == *lane)
        .ok_or_else(|| precondition(format!("no {} lane {}", side.name(), lane)))?;
    lanes.remove(position);
    rebuild_lanes(road, engine)
}
