//! Ground-plane curve math.
//!
//! Pure functions over `Vec3` points. Anything that has to ignore altitude
//! projects onto the x/z plane explicitly through `Vec3::ground`.

use crate::{Vec2, Vec3};

/// Default tolerance for ground-plane intersection tests.
pub const EPSILON: f64 = 1e-9;

/// Straight-line distance in 3D.
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    a.distance(&b)
}

/// Distance on the ground plane, ignoring altitude.
pub fn ground_distance(a: Vec3, b: Vec3) -> f64 {
    (a.ground() - b.ground()).length()
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Vec3]) -> f64 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Unit tangent at `index`, central difference in the interior and
/// one-sided at the ends. Zero for a degenerate polyline.
pub fn tangent_at(points: &[Vec3], index: usize) -> Vec3 {
    let n = points.len();
    if n < 2 || index >= n {
        return Vec3::ZERO;
    }
    let (a, b) = if index == 0 {
        (points[0], points[1])
    } else if index == n - 1 {
        (points[n - 2], points[n - 1])
    } else {
        (points[index - 1], points[index + 1])
    };
    (b - a).normalized()
}

/// Unit normal on the ground plane pointing to the left of travel.
pub fn ground_normal(tangent: Vec3) -> Vec3 {
    Vec3::UP.cross(&tangent).with_y(0.0).normalized()
}

/// Closest point on segment `[a, b]` to `p`, with its clamped parameter.
pub fn project_to_segment(p: Vec3, a: Vec3, b: Vec3) -> (Vec3, f64) {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq <= 0.0 {
        return (a, 0.0);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Index of the point in `points` nearest to `p`. Ties keep the first.
pub fn nearest_index(points: &[Vec3], p: Vec3) -> Option<usize> {
    nearest_index_from(points, p, 0)
}

/// Like `nearest_index` but only considers `points[start..]`.
pub fn nearest_index_from(points: &[Vec3], p: Vec3, start: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, q) in points.iter().enumerate().skip(start) {
        let d = distance(*q, p);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Intersect a bounded ray `origin + dir * u` (u in `[0, 1]`) with segment
/// `[a, b]` on the ground plane. Returns `(u, v)` where `v` is the segment
/// parameter. Parallel and collinear inputs never intersect.
pub fn ray_segment_intersection(
    origin: Vec2,
    dir: Vec2,
    a: Vec2,
    b: Vec2,
    eps: f64,
) -> Option<(f64, f64)> {
    let seg = b - a;
    let denom = dir.perp_dot(&seg);
    if denom.abs() < eps {
        return None;
    }
    let diff = a - origin;
    let u = diff.perp_dot(&seg) / denom;
    let v = diff.perp_dot(&dir) / denom;
    let within = |x: f64| x >= -eps && x <= 1.0 + eps;
    if within(u) && within(v) {
        Some((u, v))
    } else {
        None
    }
}

/// Whether segments `[a0, a1]` and `[b0, b1]` cross on the ground plane.
///
/// Segments that share their start point or their end point are not
/// considered crossing.
pub fn ground_segments_cross(a0: Vec3, a1: Vec3, b0: Vec3, b1: Vec3, eps: f64) -> bool {
    if ground_distance(a0, b0) <= eps || ground_distance(a1, b1) <= eps {
        return false;
    }
    let origin = a0.ground();
    ray_segment_intersection(origin, a1.ground() - origin, b0.ground(), b1.ground(), eps)
        .is_some()
}

/// Capability interface for code that only needs curve math.
///
/// Every method has a default that calls the free function of the same
/// name, so implementors opt in with an empty `impl`.
pub trait CurveMath {
    fn distance(&self, a: Vec3, b: Vec3) -> f64 {
        distance(a, b)
    }

    fn polyline_length(&self, points: &[Vec3]) -> f64 {
        polyline_length(points)
    }

    fn tangent_at(&self, points: &[Vec3], index: usize) -> Vec3 {
        tangent_at(points, index)
    }

    fn ground_normal(&self, tangent: Vec3) -> Vec3 {
        ground_normal(tangent)
    }

    fn nearest_index(&self, points: &[Vec3], p: Vec3) -> Option<usize> {
        nearest_index(points, p)
    }

    fn segments_cross(&self, a0: Vec3, a1: Vec3, b0: Vec3, b1: Vec3) -> bool {
        ground_segments_cross(a0, a1, b0, b1, EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_distance_ignores_altitude() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 100.0, 4.0);
        assert!((ground_distance(a, b) - 5.0).abs() < 1e-12);
        assert!(distance(a, b) > 100.0);
    }

    #[test]
    fn test_polyline_length() {
        let pts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 4.0),
        ];
        assert!((polyline_length(&pts) - 7.0).abs() < 1e-12);
        assert_eq!(polyline_length(&pts[..1]), 0.0);
    }

    #[test]
    fn test_tangent_and_normal_are_perpendicular() {
        let pts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.5, 1.0),
            Vec3::new(2.0, 1.0, 0.0),
        ];
        for i in 0..pts.len() {
            let t = tangent_at(&pts, i);
            let n = ground_normal(t);
            assert!((n.length() - 1.0).abs() < 1e-12);
            assert_eq!(n.y, 0.0);
            assert!((n.ground().x * t.x + n.ground().y * t.z).abs() < 1e-12);
        }
    }

    #[test]
    fn test_project_to_segment_clamps() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 0.0, 0.0);
        let (p, t) = project_to_segment(Vec3::new(4.0, 0.0, 3.0), a, b);
        assert_eq!(p, Vec3::new(4.0, 0.0, 0.0));
        assert!((t - 0.4).abs() < 1e-12);

        let (p, t) = project_to_segment(Vec3::new(-5.0, 0.0, 1.0), a, b);
        assert_eq!(p, a);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_nearest_index_from_respects_start() {
        let pts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(nearest_index(&pts, Vec3::new(0.1, 0.0, 0.0)), Some(0));
        assert_eq!(nearest_index_from(&pts, Vec3::new(0.1, 0.0, 0.0), 1), Some(1));
        assert_eq!(nearest_index(&[], Vec3::ZERO), None);
    }

    #[test]
    fn test_crossing_segments() {
        let a0 = Vec3::new(0.0, 0.0, 0.0);
        let a1 = Vec3::new(2.0, 0.0, 2.0);
        let b0 = Vec3::new(0.0, 5.0, 2.0);
        let b1 = Vec3::new(2.0, 5.0, 0.0);
        assert!(ground_segments_cross(a0, a1, b0, b1, EPSILON));
    }

    #[test]
    fn test_parallel_segments_do_not_cross() {
        let a0 = Vec3::new(0.0, 0.0, 0.0);
        let a1 = Vec3::new(0.0, 0.0, 2.0);
        let b0 = Vec3::new(1.0, 0.0, 0.0);
        let b1 = Vec3::new(1.0, 0.0, 2.0);
        assert!(!ground_segments_cross(a0, a1, b0, b1, EPSILON));
    }

    #[test]
    fn test_shared_endpoint_is_not_a_crossing() {
        let a0 = Vec3::new(0.0, 0.0, 0.0);
        let shared = Vec3::new(1.0, 0.0, 2.0);
        let b0 = Vec3::new(2.0, 0.0, 0.0);
        assert!(!ground_segments_cross(a0, shared, b0, shared, EPSILON));
    }
}
