//! Road edits: creation, removal, control points and connectivity

use super::lane::rebuild_lanes;
use super::{check_finite, mismatch, precondition, skip_missing};
use crate::context::EditContext;
use crate::payload::EditPayload;
use roadnet_core::{Result, RoadError};
use roadnet_curve::{CurveSynthesis, Side};
use roadnet_scene::{Lane, LaneRef, Road, SceneStore};

pub(super) fn validate_create(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::CreateRoad {
        id,
        category,
        points,
        lanes,
    } = payload
    else {
        return Err(mismatch("CreateRoad", payload));
    };
    let profile = category.profile();
    if !profile.accepts(points.len()) {
        return Err(precondition(format!(
            "{} takes {}{} control points, got {}",
            category,
            profile.min_points,
            profile
                .max_points
                .map_or_else(|| " or more".to_string(), |max| format!("..={}", max)),
            points.len()
        )));
    }
    check_finite(points)?;
    if store.road(*id).is_some() {
        return Err(precondition(format!("road {} already exists", id)));
    }
    if let Some(spec) = lanes
        .left
        .iter()
        .chain(&lanes.right)
        .find(|spec| !(spec.width.is_finite() && spec.width > 0.0))
    {
        return Err(precondition(format!("lane width must be positive, got {}", spec.width)));
    }
    Ok(())
}

pub(super) fn apply_create(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::CreateRoad {
        id,
        category,
        points,
        lanes,
    } = payload
    else {
        return Err(mismatch("CreateRoad", payload));
    };
    let engine = ctx.engine();
    let reference = engine.synthesize(category.profile().model, points)?;
    let mut road = Road::new(*id, *category, reference);
    for side in [Side::Left, Side::Right] {
        *road.lanes_mut(side) = lanes
            .side(side)
            .iter()
            .enumerate()
            .map(|(i, spec)| Lane::from_spec(i as u32 + 1, spec))
            .collect();
    }
    rebuild_lanes(&mut road, engine)?;
    tracing::debug!(
        road = %id,
        %category,
        serie = road.reference.serie.len(),
        "created road"
    );
    ctx.insert_road(road)
}

/// Remove a road and drop it from the junction it belongs to.
pub(super) fn apply_remove(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::RemoveRoad { road } = payload else {
        return Err(mismatch("RemoveRoad", payload));
    };
    let removed = ctx.remove_road(*road)?;
    if let Some(junction_id) = removed.junction {
        if let Some(junction) = skip_missing(ctx.junction_mut(junction_id))? {
            junction.members.retain(|member| member != road);
            junction.connections.retain(|connection| connection != road);
        }
    }
    Ok(())
}

pub(super) fn validate_move_control_point(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::MoveControlPoint { road, index, point } = payload else {
        return Err(mismatch("MoveControlPoint", payload));
    };
    check_finite(&[*point])?;
    let count = store.road(*road).map_or(0, |road| road.reference.catmull.len());
    if *index >= count {
        return Err(precondition(format!(
            "control point {} out of range (0..{})",
            index, count
        )));
    }
    Ok(())
}

pub(super) fn apply_move_control_point(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::MoveControlPoint { road, index, point } = payload else {
        return Err(mismatch("MoveControlPoint", payload));
    };
    let engine = ctx.engine();
    let road = ctx.road_mut(*road)?;
    let model = road.category.profile().model;
    engine.move_control_point(model, &mut road.reference, *index, *point)?;
    rebuild_lanes(road, engine)
}

pub(super) fn validate_insert_control_point(_store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::InsertControlPoint { point, .. } = payload else {
        return Err(mismatch("InsertControlPoint", payload));
    };
    check_finite(&[*point])
}

pub(super) fn apply_insert_control_point(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::InsertControlPoint { road, point } = payload else {
        return Err(mismatch("InsertControlPoint", payload));
    };
    let engine = ctx.engine();
    let road = ctx.road_mut(*road)?;
    let model = road.category.profile().model;
    let at = engine.insert_control_point(model, &mut road.reference, *point)?;
    tracing::debug!(road = %road.id, index = at, "inserted control point");
    rebuild_lanes(road, engine)
}

pub(super) fn validate_remove_control_point(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::RemoveControlPoint { road, index } = payload else {
        return Err(mismatch("RemoveControlPoint", payload));
    };
    let count = store.road(*road).map_or(0, |road| road.reference.catmull.len());
    if count <= 2 {
        return Err(precondition("a road keeps at least 2 control points"));
    }
    if *index == 0 || *index >= count - 1 {
        return Err(precondition(format!(
            "only interior control points can be removed, got {} of {}",
            index, count
        )));
    }
    Ok(())
}

pub(super) fn apply_remove_control_point(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::RemoveControlPoint { road, index } = payload else {
        return Err(mismatch("RemoveControlPoint", payload));
    };
    let engine = ctx.engine();
    let road = ctx.road_mut(*road)?;
    let model = road.category.profile().model;
    engine.remove_control_point(model, &mut road.reference, *index)?;
    rebuild_lanes(road, engine)
}

pub(super) fn validate_connect(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::ConnectRoads { from, to } = payload else {
        return Err(mismatch("ConnectRoads", payload));
    };
    if from == to {
        return Err(precondition("a road cannot connect to itself"));
    }
    let from_road = store
        .road(*from)
        .ok_or_else(|| RoadError::EntityNotFound(from.to_string()))?;
    let to_road = store
        .road(*to)
        .ok_or_else(|| RoadError::EntityNotFound(to.to_string()))?;
    for side in [Side::Left, Side::Right] {
        let (have, need) = (to_road.lanes(side).len(), from_road.lanes(side).len());
        if have < need {
            return Err(precondition(format!(
                "road {} has {} {} lanes, road {} needs {}",
                to,
                have,
                side.name(),
                from,
                need
            )));
        }
    }
    Ok(())
}

/// Link `from` to `to` and each lane of `from` to the lane at the same
/// position and side on `to`.
pub(super) fn apply_connect(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::ConnectRoads { from, to } = payload else {
        return Err(mismatch("ConnectRoads", payload));
    };
    let (from_ref, to_ref) = (ctx.road(*from)?.as_ref(), ctx.road(*to)?.as_ref());

    for side in [Side::Left, Side::Right] {
        let to_ids: Vec<u32> = ctx.road(*to)?.lanes(side).iter().map(|l| l.id).collect();
        let from_ids: Vec<u32> = ctx.road(*from)?.lanes(side).iter().map(|l| l.id).collect();
        if to_ids.len() < from_ids.len() {
            return Err(precondition(format!(
                "road {} lacks {} lanes to connect",
                to,
                side.name()
            )));
        }

        for (lane, to_id) in ctx.road_mut(*from)?.lanes_mut(side).iter_mut().zip(&to_ids) {
            lane.successor = Some(LaneRef {
                road: *to,
                side,
                lane: *to_id,
            });
        }
        for (lane, from_id) in ctx.road_mut(*to)?.lanes_mut(side).iter_mut().zip(&from_ids) {
            lane.predecessor = Some(LaneRef {
                road: *from,
                side,
                lane: *from_id,
            });
        }
    }

    ctx.road_mut(*from)?.next = Some(to_ref);
    ctx.road_mut(*to)?.prev = Some(from_ref);
    Ok(())
}
