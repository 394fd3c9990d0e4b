use roadnet_curve::CurveModel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Road categories. Each one fixes how the reference line is built and
/// how many control points it may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadCategory {
    TwoStraightLine,
    QuadraticBezier,
    CubicBezier,
    CatmullSerie,
    Connection,
}

/// Curve model and control point bounds of a road category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadProfile {
    pub model: CurveModel,
    pub min_points: usize,
    /// `None` means unbounded
    pub max_points: Option<usize>,
    /// Whether interior control points may be inserted or removed
    pub resizable: bool,
}

impl RoadProfile {
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_points && self.max_points.map_or(true, |max| count <= max)
    }
}

impl RoadCategory {
    pub const ALL: [RoadCategory; 5] = [
        RoadCategory::TwoStraightLine,
        RoadCategory::QuadraticBezier,
        RoadCategory::CubicBezier,
        RoadCategory::CatmullSerie,
        RoadCategory::Connection,
    ];

    pub fn profile(self) -> RoadProfile {
        let (model, min, max, resizable) = match self {
            RoadCategory::TwoStraightLine => (CurveModel::CatmullRom, 2, Some(2), false),
            RoadCategory::QuadraticBezier => (CurveModel::Bezier, 3, Some(3), false),
            RoadCategory::CubicBezier => (CurveModel::Bezier, 4, Some(4), false),
            RoadCategory::CatmullSerie => (CurveModel::CatmullRom, 2, None, true),
            RoadCategory::Connection => (CurveModel::Bezier, 4, Some(4), false),
        };
        RoadProfile {
            model,
            min_points: min,
            max_points: max,
            resizable,
        }
    }

    /// Name used in event names, e.g. `TwoStraightLineRoad`.
    pub fn name(self) -> &'static str {
        match self {
            RoadCategory::TwoStraightLine => "TwoStraightLineRoad",
            RoadCategory::QuadraticBezier => "QuadraticBezierRoad",
            RoadCategory::CubicBezier => "CubicBezierRoad",
            RoadCategory::CatmullSerie => "CatmullSerieRoad",
            RoadCategory::Connection => "ConnectionRoad",
        }
    }
}

impl fmt::Display for RoadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three entity collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Road,
    Junction,
    Signal,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Road => "road",
            EntityKind::Junction => "junction",
            EntityKind::Signal => "signal",
        }
    }
}

/// Category half of an edit's dispatch key. Roads are split by road
/// category since each one synthesizes its reference line differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Road(RoadCategory),
    Junction,
    Signal,
}

impl EntityCategory {
    pub fn kind(self) -> EntityKind {
        match self {
            EntityCategory::Road(_) => EntityKind::Road,
            EntityCategory::Junction => EntityKind::Junction,
            EntityCategory::Signal => EntityKind::Signal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityCategory::Road(category) => category.name(),
            EntityCategory::Junction => "Junction",
            EntityCategory::Signal => "Signal",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_bound_control_points() {
        assert!(RoadCategory::TwoStraightLine.profile().accepts(2));
        assert!(!RoadCategory::TwoStraightLine.profile().accepts(3));
        assert!(!RoadCategory::QuadraticBezier.profile().accepts(2));
        assert!(RoadCategory::CubicBezier.profile().accepts(4));
        assert!(RoadCategory::CatmullSerie.profile().accepts(40));
        assert!(!RoadCategory::CatmullSerie.profile().accepts(1));
    }

    #[test]
    fn test_only_catmull_series_resize() {
        let resizable: Vec<_> = RoadCategory::ALL
            .iter()
            .filter(|c| c.profile().resizable)
            .collect();
        assert_eq!(resizable, vec![&RoadCategory::CatmullSerie]);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(
            EntityCategory::Road(RoadCategory::TwoStraightLine).name(),
            "TwoStraightLineRoad"
        );
        assert_eq!(EntityCategory::Junction.to_string(), "Junction");
        assert_eq!(EntityCategory::Signal.kind(), EntityKind::Signal);
    }
}
