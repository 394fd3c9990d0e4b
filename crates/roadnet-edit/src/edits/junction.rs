//! Junction edits. A junction owns one connection road per ordered pair
//! of distinct member roads, running from the junction end of the first
//! member to the junction end of the second. A member's junction end is
//! whichever of its two ends lies nearer the centre of all member ends.

use super::lane::rebuild_lanes;
use super::{mismatch, precondition, skip_missing};
use crate::context::EditContext;
use crate::payload::EditPayload;
use roadnet_core::math::{distance, tangent_at};
use roadnet_core::{EntityId, Result, Vec3};
use roadnet_curve::CurveSynthesis;
use roadnet_scene::{Junction, Lane, LaneSpec, Road, RoadCategory, SceneStore};

/// Average of both ends of every road.
fn junction_center<'r>(roads: impl Iterator<Item = &'r Road>) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0;
    for road in roads {
        sum += road.reference.start() + road.reference.end();
        count += 2;
    }
    if count == 0 {
        return sum;
    }
    sum * (1.0 / count as f64)
}

/// The end of `road` facing `center`, with the unit direction pointing
/// out of the road into the junction.
fn junction_end(road: &Road, center: Vec3) -> (Vec3, Vec3) {
    let serie = &road.reference.serie;
    let (start, end) = (road.reference.start(), road.reference.end());
    if distance(end, center) <= distance(start, center) {
        (end, tangent_at(serie, serie.len().saturating_sub(1)))
    } else {
        (start, -tangent_at(serie, 0))
    }
}

/// Cubic control polygon leaving `from` and entering `to` along their
/// junction-end directions.
fn connection_polygon(from: &Road, to: &Road, center: Vec3) -> Vec<Vec3> {
    let (start, out_dir) = junction_end(from, center);
    let (end, in_dir) = junction_end(to, center);
    let reach = distance(start, end) / 3.0;
    vec![start, start + out_dir * reach, end + in_dir * reach, end]
}

fn build_connections(
    ctx: &mut EditContext<'_>,
    junction: EntityId,
    members: &[EntityId],
) -> Result<Vec<EntityId>> {
    let engine = ctx.engine();
    let profile = RoadCategory::Connection.profile();
    let mut connections = Vec::new();
    let center = junction_center(members.iter().filter_map(|id| ctx.store().road(*id)));

    for from_id in members {
        for to_id in members {
            if from_id == to_id {
                continue;
            }
            let (from, to) = (ctx.road(*from_id)?, ctx.road(*to_id)?);
            let reference = engine.synthesize(profile.model, &connection_polygon(from, to, center))?;
            let width = from.right.first().map_or(LaneSpec::default().width, |l| l.width);
            let (from_ref, to_ref) = (from.as_ref(), to.as_ref());

            let mut road = Road::new(EntityId::new(), RoadCategory::Connection, reference);
            road.right.push(Lane::from_spec(1, &LaneSpec { width, ..LaneSpec::default() }));
            road.prev = Some(from_ref);
            road.next = Some(to_ref);
            road.junction = Some(junction);
            rebuild_lanes(&mut road, engine)?;

            connections.push(road.id);
            ctx.insert_road(road)?;
        }
    }
    Ok(connections)
}

pub(super) fn validate_create(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::CreateJunction { id, members } = payload else {
        return Err(mismatch("CreateJunction", payload));
    };
    if store.junction(*id).is_some() {
        return Err(precondition(format!("junction {} already exists", id)));
    }
    if members.len() < 2 {
        return Err(precondition("a junction needs at least 2 member roads"));
    }
    for (i, member) in members.iter().enumerate() {
        if members[..i].contains(member) {
            return Err(precondition(format!("road {} listed twice", member)));
        }
        let road = store
            .road(*member)
            .ok_or_else(|| precondition(format!("member road {} does not exist", member)))?;
        if let Some(other) = road.junction {
            return Err(precondition(format!(
                "road {} already belongs to junction {}",
                member, other
            )));
        }
    }
    Ok(())
}

pub(super) fn apply_create(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::CreateJunction { id, members } = payload else {
        return Err(mismatch("CreateJunction", payload));
    };
    for member in members {
        ctx.road_mut(*member)?.junction = Some(*id);
    }
    let connections = build_connections(ctx, *id, members)?;
    tracing::debug!(
        junction = %id,
        connections = connections.len(),
        "created junction"
    );
    ctx.insert_junction(Junction {
        id: *id,
        members: members.clone(),
        connections,
    })
}

fn remove_connections(ctx: &mut EditContext<'_>, connections: &[EntityId]) -> Result<()> {
    for connection in connections {
        skip_missing(ctx.remove_road(*connection))?;
    }
    Ok(())
}

pub(super) fn apply_remove(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::RemoveJunction { junction } = payload else {
        return Err(mismatch("RemoveJunction", payload));
    };
    let removed = ctx.remove_junction(*junction)?;
    remove_connections(ctx, &removed.connections)?;
    for member in &removed.members {
        if let Some(road) = skip_missing(ctx.road_mut(*member))? {
            if road.junction == Some(*junction) {
                road.junction = None;
            }
        }
    }
    Ok(())
}

/// Regenerate every connection road from the members that still exist.
pub(super) fn apply_refresh(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::RefreshJunction { junction } = payload else {
        return Err(mismatch("RefreshJunction", payload));
    };
    let current = ctx.junction(*junction)?.clone();
    remove_connections(ctx, &current.connections)?;

    let members: Vec<EntityId> = current
        .members
        .iter()
        .copied()
        .filter(|member| ctx.store().road(*member).is_some())
        .collect();
    let connections = build_connections(ctx, *junction, &members)?;

    let target = ctx.junction_mut(*junction)?;
    target.members = members;
    target.connections = connections;
    Ok(())
}
