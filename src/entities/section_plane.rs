//! Section plane records and the plane equation handed to the renderer

use serde::{Deserialize, Serialize};

use crate::core::geometry::{Point, Vector};
use crate::core::identity::EntityId;

/// Orientation of a section plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionAxis {
    X,
    Y,
    Z,
    /// Arbitrary orientation, set through an explicit normal update
    #[serde(rename = "custom", alias = "Custom")]
    Custom,
}

impl SectionAxis {
    /// Unit normal for axis-aligned planes
    pub fn unit_normal(&self) -> Option<Vector> {
        match self {
            SectionAxis::X => Some(Vector::x()),
            SectionAxis::Y => Some(Vector::y()),
            SectionAxis::Z => Some(Vector::z()),
            SectionAxis::Custom => None,
        }
    }

    pub fn is_axis_aligned(&self) -> bool {
        !matches!(self, SectionAxis::Custom)
    }
}

impl std::fmt::Display for SectionAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionAxis::X => write!(f, "X"),
            SectionAxis::Y => write!(f, "Y"),
            SectionAxis::Z => write!(f, "Z"),
            SectionAxis::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for SectionAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" => Ok(SectionAxis::X),
            "y" => Ok(SectionAxis::Y),
            "z" => Ok(SectionAxis::Z),
            "custom" => Ok(SectionAxis::Custom),
            _ => Err(format!(
                "Invalid section axis: '{}'. Use 'x', 'y', 'z' or 'custom'",
                s
            )),
        }
    }
}

/// Plane `{p : normal·p + constant = 0}` as given to the renderer
///
/// Geometry on the negative side (`normal·p + constant < 0`) is clipped away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipPlane {
    pub normal: Vector,
    pub constant: f64,
}

impl ClipPlane {
    pub fn new(normal: Vector, constant: f64) -> Self {
        Self { normal, constant }
    }

    /// Same plane, opposite half-space
    pub fn negate(&self) -> Self {
        Self {
            normal: -self.normal,
            constant: -self.constant,
        }
    }

    pub fn signed_distance(&self, point: &Point) -> f64 {
        self.normal.dot(&point.coords) + self.constant
    }

    /// Whether the renderer discards geometry at `point`
    pub fn clips(&self, point: &Point) -> bool {
        self.signed_distance(point) < 0.0
    }
}

/// A user-created section plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPlane {
    pub id: EntityId,

    pub name: String,

    pub axis: SectionAxis,

    /// Offset along the axis; only meaningful for X/Y/Z planes
    pub position: f64,

    /// Unit normal of the stored plane
    pub normal: Vector,

    pub constant: f64,

    /// Whether the plane contributes to clipping
    pub enabled: bool,

    /// Flip the clipped half-space at apply time
    pub inverted: bool,
}

impl SectionPlane {
    /// The stored plane equation, ignoring `inverted`
    pub fn plane(&self) -> ClipPlane {
        ClipPlane::new(self.normal, self.constant)
    }

    /// The plane equation the renderer should use
    pub fn effective_plane(&self) -> ClipPlane {
        let plane = self.plane();
        if self.inverted {
            plane.negate()
        } else {
            plane
        }
    }
}
