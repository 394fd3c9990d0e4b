//! Lane geometry repair.
//!
//! A lane is a pair of equal-length boundaries. The "rib" at index `i`
//! joins `inner[i]` to `outer[i]`; when two ribs cross on the ground plane
//! the lane surface folds over itself (typically an outer boundary offset
//! further than the curve radius). Repair only ever moves the outer
//! boundary; the inner boundary is authoritative.

use crate::config::RepairConfig;
use roadnet_core::math::ground_segments_cross;
use roadnet_core::Vec3;

/// Whether rib `l` and rib `r` cross.
pub fn ribs_cross(inner: &[Vec3], outer: &[Vec3], l: usize, r: usize, eps: f64) -> bool {
    ground_segments_cross(inner[l], outer[l], inner[r], outer[r], eps)
}

/// Number of consecutive rib pairs `[i-1, i]` that cross.
pub fn count_crossings(inner: &[Vec3], outer: &[Vec3], eps: f64) -> usize {
    let n = inner.len().min(outer.len());
    (1..n)
        .filter(|&i| ribs_cross(inner, outer, i - 1, i, eps))
        .count()
}

/// Precondition for `repair_outer`: matching lengths and a crossing count
/// within the configured tolerance.
pub fn should_adjust(inner: &[Vec3], outer: &[Vec3], config: &RepairConfig) -> bool {
    inner.len() == outer.len()
        && count_crossings(inner, outer, config.epsilon) <= config.max_crossings
}

/// Sweep left to right removing folds from the outer boundary.
///
/// From each `left` bound the sweep looks for the first `right` whose rib
/// does not cross rib `left`. Outer points strictly between the two are
/// interpolated; if no such `right` exists the tail is held at
/// `outer[left]`. Returns the number of outer points that changed.
pub fn repair_outer(inner: &[Vec3], outer: &mut [Vec3], eps: f64) -> usize {
    let n = inner.len().min(outer.len());
    let mut changed = 0;
    let mut left = 0;

    while left + 1 < n {
        let mut right = left + 1;
        while right < n && ribs_cross(inner, outer, left, right, eps) {
            right += 1;
        }

        if right == n {
            let hold = outer[left];
            for p in &mut outer[left + 1..n] {
                if *p != hold {
                    *p = hold;
                    changed += 1;
                }
            }
            break;
        }

        if right > left + 1 {
            let from = outer[left];
            let to = outer[right];
            let span = (right - left) as f64;
            for k in left + 1..right {
                let p = from.lerp(&to, (k - left) as f64 / span);
                if outer[k] != p {
                    outer[k] = p;
                    changed += 1;
                }
            }
        }

        left = right;
    }

    changed
}
