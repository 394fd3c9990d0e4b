//! Catmull-Rom reference line synthesis.
//!
//! A sparse control ("catmull") sequence becomes a dense serie. Every
//! real segment blends four points, so the open ends get virtual control
//! points mirrored through the first and last segment. Segment density
//! comes from the step table, sized twice: once from the chord, then
//! again from the arc length of that first pass.

use crate::config::CurveConfig;
use roadnet_core::math::{distance, nearest_index_from, polyline_length};
use roadnet_core::{Result, RoadError, Vec3};
use serde::{Deserialize, Serialize};

/// A synthesized curve: control points, the dense serie derived from them,
/// the serie index of every control point, and one tangent per control
/// point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub catmull: Vec<Vec3>,
    pub serie: Vec<Vec3>,
    pub catmull_indices: Vec<usize>,
    pub tangents: Vec<Vec3>,
}

impl ReferenceLine {
    pub fn start(&self) -> Vec3 {
        self.catmull[0]
    }

    pub fn end(&self) -> Vec3 {
        self.catmull[self.catmull.len() - 1]
    }

    pub fn length(&self) -> f64 {
        polyline_length(&self.serie)
    }

    /// Control segment whose serie range holds the serie point nearest to `p`.
    pub fn segment_near(&self, p: Vec3) -> usize {
        let last_segment = self.catmull.len().saturating_sub(2);
        let Some(s) = nearest_index_from(&self.serie, p, 0) else {
            return 0;
        };
        let k = self.catmull_indices.partition_point(|&idx| idx <= s);
        k.saturating_sub(1).min(last_segment)
    }
}

/// Catmull-Rom spline interpolation between four points.
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f64) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    Vec3::new(
        0.5 * ((2.0 * p1.x)
            + (-p0.x + p2.x) * t
            + (2.0 * p0.x - 5.0 * p1.x + 4.0 * p2.x - p3.x) * t2
            + (-p0.x + 3.0 * p1.x - 3.0 * p2.x + p3.x) * t3),
        0.5 * ((2.0 * p1.y)
            + (-p0.y + p2.y) * t
            + (2.0 * p0.y - 5.0 * p1.y + 4.0 * p2.y - p3.y) * t2
            + (-p0.y + 3.0 * p1.y - 3.0 * p2.y + p3.y) * t3),
        0.5 * ((2.0 * p1.z)
            + (-p0.z + p2.z) * t
            + (2.0 * p0.z - 5.0 * p1.z + 4.0 * p2.z - p3.z) * t2
            + (-p0.z + 3.0 * p1.z - 3.0 * p2.z + p3.z) * t3),
    )
}

/// Cubic Hermite interpolation from `a` to `b` with end tangents `ma`, `mb`.
pub fn hermite(a: Vec3, ma: Vec3, b: Vec3, mb: Vec3, t: f64) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    a * h00 + ma * h10 + b * h01 + mb * h11
}

/// Catmull-Rom tangent at control point `index`, using virtual endpoints.
pub fn catmull_tangent(catmull: &[Vec3], index: usize) -> Vec3 {
    let n = catmull.len();
    if n < 2 {
        return Vec3::ZERO;
    }
    let prev = if index == 0 {
        virtual_start(catmull)
    } else {
        catmull[index - 1]
    };
    let next = if index + 1 >= n {
        virtual_end(catmull)
    } else {
        catmull[index + 1]
    };
    (next - prev) * 0.5
}

fn virtual_start(catmull: &[Vec3]) -> Vec3 {
    catmull[0] * 2.0 - catmull[1]
}

fn virtual_end(catmull: &[Vec3]) -> Vec3 {
    let n = catmull.len();
    catmull[n - 1] * 2.0 - catmull[n - 2]
}

/// Sample `count` points on `[a, b]`, ends pinned to the exact control points.
fn sample_with<F>(a: Vec3, b: Vec3, count: usize, eval: F) -> Vec<Vec3>
where
    F: Fn(f64) -> Vec3,
{
    let count = count.max(2);
    let mut points = Vec::with_capacity(count);
    points.push(a);
    for i in 1..count - 1 {
        points.push(eval(i as f64 / (count - 1) as f64));
    }
    points.push(b);
    points
}

/// Two-pass sizing: chord length picks the first count, the arc length of
/// that first pass picks the final one.
fn sample_sized<F>(a: Vec3, b: Vec3, config: &CurveConfig, eval: F) -> Vec<Vec3>
where
    F: Fn(f64) -> Vec3,
{
    let first_count = config.step_count(distance(a, b));
    let first = sample_with(a, b, first_count, &eval);
    let count = config.step_count(polyline_length(&first));
    if count == first_count {
        first
    } else {
        sample_with(a, b, count, &eval)
    }
}

/// Sample one Catmull-Rom segment `a -> b`, suppressing neighbours that sit
/// disproportionately far from the segment.
pub fn sample_segment(pre: Vec3, a: Vec3, b: Vec3, post: Vec3, config: &CurveConfig) -> Vec<Vec3> {
    let chord = distance(a, b);
    let limit = config.neighbor_ratio * chord;
    let pre = if distance(pre, a) > limit { a * 2.0 - b } else { pre };
    let post = if distance(b, post) > limit { b * 2.0 - a } else { post };
    sample_sized(a, b, config, |t| catmull_rom(pre, a, b, post, t))
}

/// Sample one Hermite segment with fixed end tangents.
pub fn sample_hermite_segment(
    a: Vec3,
    ma: Vec3,
    b: Vec3,
    mb: Vec3,
    config: &CurveConfig,
) -> Vec<Vec3> {
    sample_sized(a, b, config, |t| hermite(a, ma, b, mb, t))
}

/// Build a reference line from at least two control points.
pub fn synthesize(catmull: &[Vec3], config: &CurveConfig) -> Result<ReferenceLine> {
    let n = catmull.len();
    if n < 2 {
        return Err(RoadError::Precondition(format!(
            "a curve needs at least 2 control points, got {}",
            n
        )));
    }

    let start = virtual_start(catmull);
    let end = virtual_end(catmull);

    let mut serie = Vec::new();
    for seg in 0..n - 1 {
        let pre = if seg == 0 { start } else { catmull[seg - 1] };
        let post = if seg + 2 < n { catmull[seg + 2] } else { end };
        let points = sample_segment(pre, catmull[seg], catmull[seg + 1], post, config);
        // Each segment drops its own end point; the next segment starts on it.
        let keep = if seg == n - 2 { points.len() } else { points.len() - 1 };
        serie.extend_from_slice(&points[..keep]);
    }

    let catmull_indices = locate_controls(catmull, &serie);
    let tangents = (0..n).map(|i| catmull_tangent(catmull, i)).collect();

    Ok(ReferenceLine {
        catmull: catmull.to_vec(),
        serie,
        catmull_indices,
        tangents,
    })
}

/// Serie index of every control point. The ends map to the serie ends;
/// interior points are searched forward from the previous match so the
/// indices stay monotonic.
pub fn locate_controls(catmull: &[Vec3], serie: &[Vec3]) -> Vec<usize> {
    let n = catmull.len();
    let last = serie.len().saturating_sub(1);
    let mut indices = Vec::with_capacity(n);
    let mut cursor = 0;
    for (i, p) in catmull.iter().enumerate() {
        let idx = if i == 0 {
            0
        } else if i == n - 1 {
            last
        } else {
            nearest_index_from(serie, *p, cursor).unwrap_or(cursor)
        };
        cursor = idx;
        indices.push(idx);
    }
    indices
}

impl ReferenceLine {
    /// Move control point `index` and regenerate only its adjacent segments.
    ///
    /// Neighbour tangents are kept from the stored tangent sequence so the
    /// untouched segments stay C1-continuous with the new ones.
    pub fn move_control_point(&mut self, index: usize, to: Vec3, config: &CurveConfig) -> Result<()> {
        let n = self.catmull.len();
        if index >= n {
            return Err(RoadError::Precondition(format!(
                "control point {} out of range (0..{})",
                index, n
            )));
        }
        self.catmull[index] = to;
        self.tangents[index] = catmull_tangent(&self.catmull, index);
        let first = index.saturating_sub(1);
        let last = (index + 1).min(n - 1);
        self.splice_segments(first, last, config);
        Ok(())
    }

    /// Insert a control point into the segment nearest to it. Returns the
    /// index of the new control point.
    pub fn insert_control_point(&mut self, point: Vec3, config: &CurveConfig) -> Result<usize> {
        let k = self.segment_near(point);
        let at = k + 1;
        self.catmull.insert(at, point);
        let tangent = catmull_tangent(&self.catmull, at);
        self.tangents.insert(at, tangent);
        self.catmull_indices.insert(at, 0);
        self.splice_segments(k, k + 2, config);
        Ok(at)
    }

    /// Remove interior control point `index`, joining its neighbours.
    pub fn remove_control_point(&mut self, index: usize, config: &CurveConfig) -> Result<()> {
        let n = self.catmull.len();
        if n <= 2 {
            return Err(RoadError::Precondition(
                "a curve keeps at least 2 control points".into(),
            ));
        }
        if index == 0 || index >= n - 1 {
            return Err(RoadError::Precondition(format!(
                "only interior control points can be removed, got {} of {}",
                index, n
            )));
        }
        self.catmull.remove(index);
        self.tangents.remove(index);
        self.catmull_indices.remove(index);
        self.splice_segments(index - 1, index, config);
        Ok(())
    }

    /// Regenerate the segments between control points `first..=last` and
    /// splice them over the serie range `catmull_indices[first]..=catmull_indices[last]`.
    ///
    /// On entry the catmull and tangent sequences are final, and the two
    /// bounding indices still hold their old serie positions.
    fn splice_segments(&mut self, first: usize, last: usize, config: &CurveConfig) {
        if first >= last {
            return;
        }
        let start = self.catmull_indices[first];
        let end = self.catmull_indices[last];

        let mut fresh = Vec::new();
        let mut local = Vec::with_capacity(last - first + 1);
        for k in first..last {
            let points = sample_hermite_segment(
                self.catmull[k],
                self.tangents[k],
                self.catmull[k + 1],
                self.tangents[k + 1],
                config,
            );
            local.push(start + fresh.len());
            fresh.extend_from_slice(&points[..points.len() - 1]);
        }
        local.push(start + fresh.len());
        fresh.push(self.catmull[last]);

        let delta = fresh.len() as isize - (end - start + 1) as isize;
        self.serie.splice(start..=end, fresh);

        for (offset, idx) in local.into_iter().enumerate() {
            self.catmull_indices[first + offset] = idx;
        }
        for idx in &mut self.catmull_indices[last + 1..] {
            *idx = (*idx as isize + delta) as usize;
        }
    }
}
