//! Measurement records - committed distance, area and angle measurements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::geometry::Point;
use crate::core::identity::EntityId;

/// What a measurement session collects and computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Straight-line distance between two points
    Distance,
    /// Area of the closed polygon through three or more points
    Area,
    /// Angle at the middle of three points, in degrees
    Angle,
}

/// How many points a kind needs before it can commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCount {
    Exactly(usize),
    AtLeast(usize),
}

impl PointCount {
    pub fn is_satisfied_by(&self, n: usize) -> bool {
        match *self {
            PointCount::Exactly(k) => n == k,
            PointCount::AtLeast(k) => n >= k,
        }
    }

    /// Fewest points that can satisfy the requirement
    pub fn minimum(&self) -> usize {
        match *self {
            PointCount::Exactly(k) | PointCount::AtLeast(k) => k,
        }
    }
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 3] = [
        MeasurementKind::Distance,
        MeasurementKind::Area,
        MeasurementKind::Angle,
    ];

    pub fn required_points(&self) -> PointCount {
        match self {
            MeasurementKind::Distance => PointCount::Exactly(2),
            MeasurementKind::Area => PointCount::AtLeast(3),
            MeasurementKind::Angle => PointCount::Exactly(3),
        }
    }

    /// Unit label used when configuration does not override it
    pub fn default_unit(&self) -> &'static str {
        match self {
            MeasurementKind::Distance => "m",
            MeasurementKind::Area => "m²",
            MeasurementKind::Angle => "°",
        }
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasurementKind::Distance => write!(f, "distance"),
            MeasurementKind::Area => write!(f, "area"),
            MeasurementKind::Angle => write!(f, "angle"),
        }
    }
}

impl std::str::FromStr for MeasurementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distance" | "dist" | "length" => Ok(MeasurementKind::Distance),
            "area" => Ok(MeasurementKind::Area),
            "angle" => Ok(MeasurementKind::Angle),
            _ => Err(format!(
                "Invalid measurement kind: '{}'. Use 'distance', 'area' or 'angle'",
                s
            )),
        }
    }
}

/// A committed measurement
///
/// Its visual representation in the scene is owned by the engine that
/// committed it and is released when the record is deleted or cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: EntityId,

    pub kind: MeasurementKind,

    /// Points in collection order; for angles the vertex is `points[1]`
    pub points: Vec<Point>,

    /// Length, area or degrees depending on `kind`
    pub value: f64,

    pub unit: String,

    /// Precomputed display string, e.g. `5.00 m` or `90.00°`
    pub label: String,

    pub created: DateTime<Utc>,
}

impl Measurement {
    /// Where the label sits in the scene
    pub fn label_anchor(&self) -> Point {
        match self.kind {
            MeasurementKind::Distance => self.points[1],
            MeasurementKind::Area => crate::core::geometry::centroid(&self.points),
            MeasurementKind::Angle => self.points[1],
        }
    }
}
