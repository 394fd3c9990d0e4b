//! Lane boundary construction from a reference serie.

use crate::config::RepairConfig;
use crate::repair::{count_crossings, repair_outer, should_adjust};
use roadnet_core::math::{ground_normal, tangent_at};
use roadnet_core::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of the reference line a lane sits on, looking along travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Inner and outer edge of one lane, equal length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryPair {
    pub inner: Vec<Vec3>,
    pub outer: Vec<Vec3>,
}

/// A lane whose boundaries fold more often than the repair tolerance allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("lane {lane_index} folds {crossings} times (tolerance {tolerance})")]
pub struct RepairRejection {
    /// Position of the lane counted outward from the reference line
    pub lane_index: usize,
    pub crossings: usize,
    pub tolerance: usize,
}

/// Offset every serie point sideways on the ground plane, keeping altitude.
pub fn offset_serie(serie: &[Vec3], offset: f64, side: Side) -> Vec<Vec3> {
    let signed = offset * side.sign();
    (0..serie.len())
        .map(|i| serie[i] + ground_normal(tangent_at(serie, i)) * signed)
        .collect()
}

/// Check and repair one boundary pair in place.
pub fn repair_pair(
    pair: &mut BoundaryPair,
    lane_index: usize,
    config: &RepairConfig,
) -> Result<usize, RepairRejection> {
    if !should_adjust(&pair.inner, &pair.outer, config) {
        return Err(RepairRejection {
            lane_index,
            crossings: count_crossings(&pair.inner, &pair.outer, config.epsilon),
            tolerance: config.max_crossings,
        });
    }
    Ok(repair_outer(&pair.inner, &mut pair.outer, config.epsilon))
}

/// Build the boundary pairs of one side, lanes ordered outward.
///
/// Each lane's inner boundary is the previous lane's repaired outer
/// boundary, so a repair on lane `k` carries into lane `k + 1`.
pub fn build_side(
    serie: &[Vec3],
    widths: &[f64],
    side: Side,
    config: &RepairConfig,
) -> Result<Vec<BoundaryPair>, RepairRejection> {
    let normals: Vec<Vec3> = (0..serie.len())
        .map(|i| ground_normal(tangent_at(serie, i)) * side.sign())
        .collect();

    let mut pairs = Vec::with_capacity(widths.len());
    let mut inner = serie.to_vec();
    let mut offset = 0.0;
    for (lane_index, width) in widths.iter().enumerate() {
        offset += width;
        let outer = serie
            .iter()
            .zip(&normals)
            .map(|(p, n)| *p + *n * offset)
            .collect();
        let mut pair = BoundaryPair { inner, outer };
        repair_pair(&mut pair, lane_index, config)?;
        inner = pair.outer.clone();
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Re-run repair from lane `start` outward after its outer boundary was
/// edited directly.
pub fn refit_from(
    pairs: &mut [BoundaryPair],
    start: usize,
    config: &RepairConfig,
) -> Result<usize, RepairRejection> {
    let mut changed = 0;
    for lane_index in start..pairs.len() {
        if lane_index > start {
            pairs[lane_index].inner = pairs[lane_index - 1].outer.clone();
        }
        changed += repair_pair(&mut pairs[lane_index], lane_index, config)?;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(n: usize) -> Vec<Vec3> {
        (0..n).map(|k| Vec3::new(k as f64, 0.5, 0.0)).collect()
    }

    #[test]
    fn offset_sides_are_opposite() {
        let serie = straight(5);
        let left = offset_serie(&serie, 2.0, Side::Left);
        let right = offset_serie(&serie, 2.0, Side::Right);
        for i in 0..serie.len() {
            assert!((left[i].z + right[i].z).abs() < 1e-12);
            assert!((left[i].z.abs() - 2.0).abs() < 1e-12);
            assert_eq!(left[i].y, 0.5);
        }
    }

    #[test]
    fn lanes_chain_outward() {
        let serie = straight(6);
        let pairs = build_side(&serie, &[3.0, 1.5], Side::Right, &RepairConfig::default()).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].inner, serie);
        assert_eq!(pairs[1].inner, pairs[0].outer);
        let gap = pairs[1].outer[2].z - serie[2].z;
        assert!((gap.abs() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn tight_curve_is_repaired_on_the_inside() {
        // Quarter circle of radius 2; a 3 wide lane on the inside folds.
        let serie: Vec<Vec3> = (0..=16)
            .map(|i| {
                let a = std::f64::consts::FRAC_PI_2 * i as f64 / 16.0;
                Vec3::new(2.0 * a.cos(), 0.0, 2.0 * a.sin())
            })
            .collect();
        let inside = if offset_serie(&serie, 1.0, Side::Left)[8].length() < 2.0 {
            Side::Left
        } else {
            Side::Right
        };

        let config = RepairConfig {
            max_crossings: 32,
            ..RepairConfig::default()
        };
        let pairs = build_side(&serie, &[3.0], inside, &config).unwrap();
        assert_eq!(count_crossings(&pairs[0].inner, &pairs[0].outer, config.epsilon), 0);
    }

    #[test]
    fn rejection_reports_lane_position() {
        let serie: Vec<Vec3> = (0..=16)
            .map(|i| {
                let a = std::f64::consts::FRAC_PI_2 * i as f64 / 16.0;
                Vec3::new(2.0 * a.cos(), 0.0, 2.0 * a.sin())
            })
            .collect();
        let config = RepairConfig {
            max_crossings: 0,
            ..RepairConfig::default()
        };
        let left = build_side(&serie, &[0.5, 3.0], Side::Left, &config);
        let right = build_side(&serie, &[0.5, 3.0], Side::Right, &config);
        let rejection = left.err().or(right.err()).unwrap();
        assert_eq!(rejection.lane_index, 1);
        assert_eq!(rejection.tolerance, 0);
        assert!(rejection.crossings > 0);
    }
}
