use roadnet_curve::CurveEngine;
use roadnet_scene::SceneStore;

/// What transactions operate on: the entity store and the curve engine
/// that regenerates geometry for it.
#[derive(Debug, Clone, Default)]
pub struct RoadWorld {
    pub store: SceneStore,
    pub engine: CurveEngine,
}

impl RoadWorld {
    pub fn new(engine: CurveEngine) -> Self {
        Self {
            store: SceneStore::new(),
            engine,
        }
    }
}
