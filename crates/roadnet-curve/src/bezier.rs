//! Bezier reference lines.
//!
//! Quadratic and cubic road categories are driven by a Bezier control
//! polygon instead of an interpolating spline. Only the end control points
//! lie on the curve, so every edit regenerates the whole serie.

use crate::config::CurveConfig;
use crate::spline::{locate_controls, ReferenceLine};
use roadnet_core::math::{distance, polyline_length, tangent_at};
use roadnet_core::{Result, RoadError, Vec3};

/// Evaluate a Bezier curve of any degree with de Casteljau's algorithm.
pub fn de_casteljau(control: &[Vec3], t: f64) -> Vec3 {
    let mut work = control.to_vec();
    let n = work.len();
    for level in 1..n {
        for i in 0..n - level {
            work[i] = work[i].lerp(&work[i + 1], t);
        }
    }
    work[0]
}

fn sample(control: &[Vec3], count: usize) -> Vec<Vec3> {
    let first = control[0];
    let last = control[control.len() - 1];
    let count = count.max(2);
    let mut points = Vec::with_capacity(count);
    points.push(first);
    for i in 1..count - 1 {
        points.push(de_casteljau(control, i as f64 / (count - 1) as f64));
    }
    points.push(last);
    points
}

/// Build a reference line from a Bezier control polygon.
pub fn synthesize_bezier(control: &[Vec3], config: &CurveConfig) -> Result<ReferenceLine> {
    let n = control.len();
    if n < 2 {
        return Err(RoadError::Precondition(format!(
            "a Bezier curve needs at least 2 control points, got {}",
            n
        )));
    }

    let first_count = config.step_count(distance(control[0], control[n - 1]));
    let first = sample(control, first_count);
    let count = config.step_count(polyline_length(&first));
    let serie = if count == first_count {
        first
    } else {
        sample(control, count)
    };

    let catmull_indices = locate_controls(control, &serie);
    let tangents = catmull_indices
        .iter()
        .map(|&idx| tangent_at(&serie, idx))
        .collect();

    Ok(ReferenceLine {
        catmull: control.to_vec(),
        serie,
        catmull_indices,
        tangents,
    })
}
