use crate::composition::CompositionTransaction;
use crate::payload::EditPayload;
use crate::registry::TransactionMap;
use crate::transaction::Transaction;
use roadnet_core::math::ground_distance;
use roadnet_core::{EntityId, Result, RoadError};
use roadnet_scene::{RoadCategory, SceneStore};

/// Ground distance under which two road ends count as the same point.
const SHARED_END_TOLERANCE: f64 = 1e-6;

/// Change the altitude of one control point and everything attached to it.
///
/// Children, built now against the current store: the move on `road`
/// itself, the matching end moves on the previous and next roads whose
/// shared endpoint coincides with the edited point, then a refresh of the
/// road's junction.
pub fn altitude_edit(
    registry: &TransactionMap,
    store: &SceneStore,
    road: EntityId,
    index: usize,
    altitude: f64,
) -> Result<CompositionTransaction> {
    if !altitude.is_finite() {
        return Err(RoadError::Precondition(format!(
            "altitude must be finite, got {}",
            altitude
        )));
    }
    let target = store
        .road(road)
        .ok_or_else(|| RoadError::EntityNotFound(road.to_string()))?;
    let catmull = &target.reference.catmull;
    let point = *catmull.get(index).ok_or_else(|| {
        RoadError::Precondition(format!(
            "control point {} out of range (0..{})",
            index,
            catmull.len()
        ))
    })?;

    let mut children: Vec<Box<dyn Transaction>> = vec![Box::new(registry.build(
        store,
        EditPayload::MoveControlPoint {
            road,
            index,
            point: point.with_y(altitude),
        },
    )?)];

    let last = catmull.len() - 1;
    let mut neighbours = Vec::new();
    if index == 0 {
        if let Some(prev) = target.prev.and_then(|r| store.road(r.id)) {
            let end = prev.reference.catmull.len() - 1;
            neighbours.push((prev.id, end, prev.reference.end()));
        }
    }
    if index == last {
        if let Some(next) = target.next.and_then(|r| store.road(r.id)) {
            neighbours.push((next.id, 0, next.reference.start()));
        }
    }
    for (id, end_index, end_point) in neighbours {
        if ground_distance(end_point, point) > SHARED_END_TOLERANCE {
            continue;
        }
        children.push(Box::new(registry.build(
            store,
            EditPayload::MoveControlPoint {
                road: id,
                index: end_index,
                point: end_point.with_y(altitude),
            },
        )?));
    }

    if target.category != RoadCategory::Connection {
        if let Some(junction) = target.junction.filter(|j| store.junction(*j).is_some()) {
            children.push(Box::new(
                registry.build(store, EditPayload::RefreshJunction { junction })?,
            ));
        }
    }

    Ok(CompositionTransaction::new("AltitudeEdit", children))
}
