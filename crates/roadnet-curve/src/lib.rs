//! Roadnet Curve - Reference line synthesis and lane geometry repair
//!
//! Turns sparse control points into dense serie points and keeps lane
//! boundary pairs free of folds:
//! - `spline` - two-pass Catmull-Rom synthesis with local re-synthesis
//! - `bezier` - Bezier reference lines sized with the same step table
//! - `lane` - lane boundary offsetting from a reference serie
//! - `repair` - rib crossing detection and outer boundary repair
//! - `CurveEngine` - configured implementation of the capability traits

pub mod bezier;
mod config;
mod engine;
pub mod lane;
pub mod repair;
pub mod spline;

pub use config::{CurveConfig, RepairConfig, StepBucket};
pub use engine::{CurveEngine, CurveModel, CurveSynthesis, LaneRepair};
pub use lane::{BoundaryPair, RepairRejection, Side};
pub use spline::ReferenceLine;
