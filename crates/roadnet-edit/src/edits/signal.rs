//! Signal edits

use super::{mismatch, precondition};
use crate::context::EditContext;
use crate::payload::EditPayload;
use roadnet_core::math::{ground_normal, tangent_at};
use roadnet_core::{EntityId, Result, RoadError, Vec3};
use roadnet_scene::{Road, SceneStore, Signal};

/// Serie point `index` pushed sideways by `offset`, positive to the left.
fn signal_position(road: &Road, index: usize, offset: f64) -> Vec3 {
    let serie = &road.reference.serie;
    serie[index] + ground_normal(tangent_at(serie, index)) * offset
}

fn check_index(store: &SceneStore, road: EntityId, index: usize) -> Result<()> {
    let road = store
        .road(road)
        .ok_or_else(|| RoadError::EntityNotFound(road.to_string()))?;
    let len = road.reference.serie.len();
    if index >= len {
        return Err(precondition(format!(
            "serie index {} out of range (0..{}) on road {}",
            index, len, road.id
        )));
    }
    Ok(())
}

pub(super) fn validate_create(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::CreateSignal {
        id,
        road,
        serie_index,
        offset,
        ..
    } = payload
    else {
        return Err(mismatch("CreateSignal", payload));
    };
    if !offset.is_finite() {
        return Err(precondition(format!("signal offset must be finite, got {}", offset)));
    }
    if store.signal(*id).is_some() {
        return Err(precondition(format!("signal {} already exists", id)));
    }
    check_index(store, *road, *serie_index)
}

pub(super) fn apply_create(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::CreateSignal {
        id,
        road,
        serie_index,
        offset,
        kind,
    } = payload
    else {
        return Err(mismatch("CreateSignal", payload));
    };
    let position = signal_position(ctx.road(*road)?, *serie_index, *offset);
    ctx.insert_signal(Signal {
        id: *id,
        road: *road,
        serie_index: *serie_index,
        offset: *offset,
        kind: kind.clone(),
        position,
    })
}

pub(super) fn apply_remove(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::RemoveSignal { signal } = payload else {
        return Err(mismatch("RemoveSignal", payload));
    };
    ctx.remove_signal(*signal).map(|_| ())
}

pub(super) fn validate_move(store: &SceneStore, payload: &EditPayload) -> Result<()> {
    let EditPayload::MoveSignal {
        signal,
        serie_index,
    } = payload
    else {
        return Err(mismatch("MoveSignal", payload));
    };
    let signal = store
        .signal(*signal)
        .ok_or_else(|| RoadError::EntityNotFound(signal.to_string()))?;
    check_index(store, signal.road, *serie_index)
}

pub(super) fn apply_move(ctx: &mut EditContext<'_>, payload: &EditPayload) -> Result<()> {
    let EditPayload::MoveSignal {
        signal,
        serie_index,
    } = payload
    else {
        return Err(mismatch("MoveSignal", payload));
    };
    let current = ctx.signal(*signal)?;
    let (road_id, offset) = (current.road, current.offset);
    let position = signal_position(ctx.road(road_id)?, *serie_index, offset);

    let target = ctx.signal_mut(*signal)?;
    target.serie_index = *serie_index;
    target.position = position;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnet_core::Vec3;
    use roadnet_curve::ReferenceLine;
    use roadnet_scene::RoadCategory;

    #[test]
    fn test_offset_is_perpendicular_to_travel() {
        let reference = ReferenceLine {
            catmull: vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0)],
            serie: vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 4.0)],
            catmull_indices: vec![0, 2],
            tangents: vec![Vec3::new(0.0, 0.0, 1.0); 2],
        };
        let road = Road::new(EntityId::new(), RoadCategory::TwoStraightLine, reference);
        let p = signal_position(&road, 1, 1.5);
        assert!((p.z - 2.0).abs() < 1e-12);
        assert!((p.x.abs() - 1.5).abs() < 1e-12);
        assert_eq!(signal_position(&road, 1, 0.0), Vec3::new(0.0, 0.0, 2.0));
    }
}
