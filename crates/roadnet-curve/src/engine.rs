use crate::bezier::synthesize_bezier;
use crate::config::{CurveConfig, RepairConfig};
use crate::lane::{build_side, refit_from, BoundaryPair, RepairRejection, Side};
use crate::repair;
use crate::spline::{self, ReferenceLine};
use roadnet_core::math::CurveMath;
use roadnet_core::{Result, RoadError, Vec3};
use serde::{Deserialize, Serialize};

/// How a road category turns its control points into a serie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveModel {
    /// Catmull-Rom through every control point, edited locally
    CatmullRom,
    /// Bezier over the control polygon, regenerated whole on every edit
    Bezier,
}

/// Curve synthesis and control point editing.
pub trait CurveSynthesis {
    fn synthesize(&self, model: CurveModel, control: &[Vec3]) -> Result<ReferenceLine>;

    fn move_control_point(
        &self,
        model: CurveModel,
        line: &mut ReferenceLine,
        index: usize,
        to: Vec3,
    ) -> Result<()>;

    fn insert_control_point(
        &self,
        model: CurveModel,
        line: &mut ReferenceLine,
        point: Vec3,
    ) -> Result<usize>;

    fn remove_control_point(
        &self,
        model: CurveModel,
        line: &mut ReferenceLine,
        index: usize,
    ) -> Result<()>;
}

/// Lane boundary generation and fold repair.
pub trait LaneRepair {
    fn count_crossings(&self, inner: &[Vec3], outer: &[Vec3]) -> usize;

    fn should_adjust(&self, inner: &[Vec3], outer: &[Vec3]) -> bool;

    /// Repair `outer` in place. Returns the number of changed points.
    fn repair(&self, inner: &[Vec3], outer: &mut [Vec3]) -> usize;

    fn build_boundaries(
        &self,
        serie: &[Vec3],
        widths: &[f64],
        side: Side,
    ) -> std::result::Result<Vec<BoundaryPair>, RepairRejection>;

    fn refit_from(
        &self,
        pairs: &mut [BoundaryPair],
        start: usize,
    ) -> std::result::Result<usize, RepairRejection>;
}

/// The configured curve engine used by every edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveEngine {
    #[serde(default)]
    pub curve: CurveConfig,
    #[serde(default)]
    pub repair: RepairConfig,
}

impl CurveEngine {
    pub fn new(curve: CurveConfig, repair: RepairConfig) -> Result<Self> {
        curve.validate()?;
        repair.validate()?;
        Ok(Self { curve, repair })
    }
}

impl CurveMath for CurveEngine {}

fn ensure_finite(points: &[Vec3]) -> Result<()> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(i) => Err(RoadError::Precondition(format!(
            "control point {} is not finite: {:?}",
            i, points[i]
        ))),
        None => Ok(()),
    }
}

impl CurveSynthesis for CurveEngine {
    fn synthesize(&self, model: CurveModel, control: &[Vec3]) -> Result<ReferenceLine> {
        ensure_finite(control)?;
        let line = match model {
            CurveModel::CatmullRom => spline::synthesize(control, &self.curve)?,
            CurveModel::Bezier => synthesize_bezier(control, &self.curve)?,
        };
        tracing::trace!(
            ?model,
            controls = line.catmull.len(),
            serie = line.serie.len(),
            "synthesized curve"
        );
        Ok(line)
    }

    fn move_control_point(
        &self,
        model: CurveModel,
        line: &mut ReferenceLine,
        index: usize,
        to: Vec3,
    ) -> Result<()> {
        ensure_finite(&[to])?;
        match model {
            CurveModel::CatmullRom => line.move_control_point(index, to, &self.curve),
            CurveModel::Bezier => {
                if index >= line.catmull.len() {
                    return Err(RoadError::Precondition(format!(
                        "control point {} out of range (0..{})",
                        index,
                        line.catmull.len()
                    )));
                }
                let mut control = line.catmull.clone();
                control[index] = to;
                *line = synthesize_bezier(&control, &self.curve)?;
                Ok(())
            }
        }
    }

    fn insert_control_point(
        &self,
        model: CurveModel,
        line: &mut ReferenceLine,
        point: Vec3,
    ) -> Result<usize> {
        ensure_finite(&[point])?;
        match model {
            CurveModel::CatmullRom => line.insert_control_point(point, &self.curve),
            CurveModel::Bezier => Err(RoadError::Precondition(
                "a Bezier control polygon has a fixed size".into(),
            )),
        }
    }

    fn remove_control_point(
        &self,
        model: CurveModel,
        line: &mut ReferenceLine,
        index: usize,
    ) -> Result<()> {
        match model {
            CurveModel::CatmullRom => line.remove_control_point(index, &self.curve),
            CurveModel::Bezier => Err(RoadError::Precondition(
                "a Bezier control polygon has a fixed size".into(),
            )),
        }
    }
}

impl LaneRepair for CurveEngine {
    fn count_crossings(&self, inner: &[Vec3], outer: &[Vec3]) -> usize {
        repair::count_crossings(inner, outer, self.repair.epsilon)
    }

    fn should_adjust(&self, inner: &[Vec3], outer: &[Vec3]) -> bool {
        repair::should_adjust(inner, outer, &self.repair)
    }

    fn repair(&self, inner: &[Vec3], outer: &mut [Vec3]) -> usize {
        let changed = repair::repair_outer(inner, outer, self.repair.epsilon);
        if changed > 0 {
            tracing::debug!(repaired = changed, "repaired outer boundary");
        }
        changed
    }

    fn build_boundaries(
        &self,
        serie: &[Vec3],
        widths: &[f64],
        side: Side,
    ) -> std::result::Result<Vec<BoundaryPair>, RepairRejection> {
        build_side(serie, widths, side, &self.repair).inspect_err(|r| {
            tracing::warn!(side = side.name(), rejection = %r, "lane boundaries rejected");
        })
    }

    fn refit_from(
        &self,
        pairs: &mut [BoundaryPair],
        start: usize,
    ) -> std::result::Result<usize, RepairRejection> {
        refit_from(pairs, start, &self.repair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s_curve() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn engine_dispatches_on_model() {
        let engine = CurveEngine::default();
        let catmull = engine.synthesize(CurveModel::CatmullRom, &s_curve()).unwrap();
        assert_eq!(catmull.serie.len(), 7);
        let bezier = engine.synthesize(CurveModel::Bezier, &s_curve()).unwrap();
        assert_eq!(bezier.serie[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(*bezier.serie.last().unwrap(), Vec3::new(3.0, 0.0, 1.0));
    }

    #[test]
    fn bezier_move_regenerates_whole_curve() {
        let engine = CurveEngine::default();
        let mut line = engine.synthesize(CurveModel::Bezier, &s_curve()).unwrap();
        let to = Vec3::new(6.0, 0.0, 1.0);
        engine
            .move_control_point(CurveModel::Bezier, &mut line, 3, to)
            .unwrap();
        assert_eq!(line.catmull[3], to);
        assert_eq!(*line.serie.last().unwrap(), to);
    }

    #[test]
    fn bezier_rejects_insert_and_remove() {
        let engine = CurveEngine::default();
        let mut line = engine.synthesize(CurveModel::Bezier, &s_curve()).unwrap();
        let err = engine
            .insert_control_point(CurveModel::Bezier, &mut line, Vec3::new(1.5, 0.0, 0.5))
            .unwrap_err();
        assert!(err.is_precondition());
        assert!(engine
            .remove_control_point(CurveModel::Bezier, &mut line, 1)
            .is_err());
        assert_eq!(line.catmull.len(), 4);
    }

    #[test]
    fn non_finite_control_points_are_rejected() {
        let engine = CurveEngine::default();
        let err = engine
            .synthesize(
                CurveModel::CatmullRom,
                &[Vec3::ZERO, Vec3::new(f64::INFINITY, 0.0, 0.0)],
            )
            .unwrap_err();
        assert!(err.is_precondition());
        assert!(engine
            .synthesize(CurveModel::Bezier, &[Vec3::ZERO, Vec3::new(0.0, f64::NAN, 0.0)])
            .is_err());

        let mut line = engine.synthesize(CurveModel::CatmullRom, &s_curve()).unwrap();
        let before = line.clone();
        let nan = Vec3::new(f64::NAN, 0.0, 0.0);
        let err = engine
            .move_control_point(CurveModel::CatmullRom, &mut line, 1, nan)
            .unwrap_err();
        assert!(err.is_precondition());
        let below = Vec3::new(0.0, 0.0, f64::NEG_INFINITY);
        let err = engine
            .insert_control_point(CurveModel::CatmullRom, &mut line, below)
            .unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(line, before);
    }

    #[test]
    fn huge_finite_span_samples_a_bounded_serie() {
        let engine = CurveEngine::default();
        let line = engine
            .synthesize(CurveModel::CatmullRom, &[Vec3::ZERO, Vec3::new(1e12, 0.0, 0.0)])
            .unwrap();
        assert_eq!(line.serie.len(), engine.curve.max_segment_points);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let curve = CurveConfig {
            neighbor_ratio: 0.0,
            ..CurveConfig::default()
        };
        assert!(CurveEngine::new(curve, RepairConfig::default()).is_err());
    }

    #[test]
    fn engine_is_usable_as_curve_math() {
        fn length_of(math: &dyn CurveMath, points: &[Vec3]) -> f64 {
            math.polyline_length(points)
        }
        let engine = CurveEngine::default();
        let pts = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0)];
        assert!((length_of(&engine, &pts) - 4.0).abs() < 1e-12);
    }
}
