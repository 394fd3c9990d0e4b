//! Curve synthesis and repair tuning

use roadnet_core::{Result, RoadError};
use serde::{Deserialize, Serialize};

/// One bucket of the step table: chord or arc lengths strictly below
/// `below` are sampled with `points` points (both segment ends included).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepBucket {
    pub below: f64,
    pub points: usize,
}

/// Reference line synthesis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// A neighbour farther than `neighbor_ratio * |A-B|` from its segment
    /// end is replaced by a mirror point
    #[serde(default = "default_neighbor_ratio")]
    pub neighbor_ratio: f64,
    /// Ascending length buckets
    #[serde(default = "default_step_table")]
    pub step_table: Vec<StepBucket>,
    /// Points per whole unit of length past the last bucket
    #[serde(default = "default_far_points_per_unit")]
    pub far_points_per_unit: usize,
    /// Upper bound on the points of one segment
    #[serde(default = "default_max_segment_points")]
    pub max_segment_points: usize,
}

fn default_neighbor_ratio() -> f64 {
    3.0
}

fn default_step_table() -> Vec<StepBucket> {
    [
        (1.0, 2),
        (2.0, 3),
        (4.0, 6),
        (6.0, 10),
        (10.0, 20),
        (15.0, 30),
        (20.0, 40),
    ]
    .into_iter()
    .map(|(below, points)| StepBucket { below, points })
    .collect()
}

fn default_far_points_per_unit() -> usize {
    2
}

fn default_max_segment_points() -> usize {
    10_000
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            neighbor_ratio: default_neighbor_ratio(),
            step_table: default_step_table(),
            far_points_per_unit: default_far_points_per_unit(),
            max_segment_points: default_max_segment_points(),
        }
    }
}

impl CurveConfig {
    /// Number of points for a segment of the given length, in
    /// `2..=max_segment_points`. A NaN length gets the minimum and an
    /// infinite one the maximum.
    pub fn step_count(&self, length: f64) -> usize {
        let max = self.max_segment_points.max(2);
        if length.is_nan() {
            return 2;
        }
        for bucket in &self.step_table {
            if length < bucket.below {
                return bucket.points.clamp(2, max);
            }
        }
        let far = self.far_points_per_unit as f64 * length.floor();
        if far >= max as f64 {
            max
        } else {
            (far as usize).max(2)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.neighbor_ratio > 0.0) {
            return Err(RoadError::Config(format!(
                "curve.neighbor_ratio must be positive, got {}",
                self.neighbor_ratio
            )));
        }
        if self.step_table.is_empty() {
            return Err(RoadError::Config("curve.step_table is empty".into()));
        }
        if self
            .step_table
            .windows(2)
            .any(|w| w[1].below <= w[0].below || w[1].points < w[0].points)
        {
            return Err(RoadError::Config(
                "curve.step_table must be ascending in both length and points".into(),
            ));
        }
        let largest = self.step_table.last().map_or(2, |b| b.points).max(2);
        if self.max_segment_points < largest {
            return Err(RoadError::Config(format!(
                "curve.max_segment_points must be at least {}, got {}",
                largest, self.max_segment_points
            )));
        }
        if self.far_points_per_unit == 0 {
            return Err(RoadError::Config(
                "curve.far_points_per_unit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Lane boundary repair settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairConfig {
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Highest rib crossing count that is still repaired; above it the
    /// edit is rejected
    #[serde(default = "default_max_crossings")]
    pub max_crossings: usize,
}

fn default_epsilon() -> f64 {
    1e-9
}

fn default_max_crossings() -> usize {
    8
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            max_crossings: default_max_crossings(),
        }
    }
}

impl RepairConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon >= 0.0) {
            return Err(RoadError::Config(format!(
                "repair.epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_step_table_buckets() {
        let config = CurveConfig::default();
        assert_eq!(config.step_count(0.5), 2);
        assert_eq!(config.step_count(1.0), 3);
        assert_eq!(config.step_count(1.9), 3);
        assert_eq!(config.step_count(3.0), 6);
        assert_eq!(config.step_count(5.0), 10);
        assert_eq!(config.step_count(9.9), 20);
        assert_eq!(config.step_count(14.0), 30);
        assert_eq!(config.step_count(19.5), 40);
        assert_eq!(config.step_count(20.0), 40);
        assert_eq!(config.step_count(33.7), 66);
    }

    #[test]
    fn test_step_count_is_bounded_for_extreme_lengths() {
        let config = CurveConfig::default();
        assert_eq!(config.step_count(f64::NAN), 2);
        assert_eq!(config.step_count(f64::INFINITY), 10_000);
        assert_eq!(config.step_count(1e300), 10_000);
        assert_eq!(config.step_count(4_999.5), 9_998);
        assert_eq!(config.step_count(f64::NEG_INFINITY), 2);

        let tight = CurveConfig {
            max_segment_points: 50,
            ..CurveConfig::default()
        };
        assert!(tight.validate().is_ok());
        assert_eq!(tight.step_count(1_000.0), 50);
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut config = CurveConfig::default();
        assert!(config.validate().is_ok());

        config.step_table.swap(0, 1);
        assert!(config.validate().is_err());

        let config = CurveConfig {
            neighbor_ratio: 0.0,
            ..CurveConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CurveConfig {
            max_segment_points: 39,
            ..CurveConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CurveConfig = toml::from_str("neighbor_ratio = 5.0").unwrap();
        assert_eq!(config.neighbor_ratio, 5.0);
        assert_eq!(config.step_table.len(), 7);
        assert_eq!(config.far_points_per_unit, 2);
        assert_eq!(config.max_segment_points, 10_000);

        let repair: RepairConfig = toml::from_str("max_crossings = 3").unwrap();
        assert_eq!(repair.max_crossings, 3);
        assert_eq!(repair.epsilon, 1e-9);
    }
}
