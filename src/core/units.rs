//! Display units for measurement results
//!
//! Scene coordinates are meters. A `LengthUnit` converts lengths and areas
//! into the unit the user asked to see.

use serde::{Deserialize, Serialize};

use crate::entities::measurement::MeasurementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Mm,
    Cm,
    #[default]
    M,
    Km,
    In,
    Ft,
}

impl LengthUnit {
    /// Meters in one of this unit
    pub fn meters(&self) -> f64 {
        match self {
            LengthUnit::Mm => 0.001,
            LengthUnit::Cm => 0.01,
            LengthUnit::M => 1.0,
            LengthUnit::Km => 1000.0,
            LengthUnit::In => 0.0254,
            LengthUnit::Ft => 0.3048,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::M => "m",
            LengthUnit::Km => "km",
            LengthUnit::In => "in",
            LengthUnit::Ft => "ft",
        }
    }

    /// Convert a scene-unit result of `kind` into this unit
    ///
    /// Areas scale by the square of the length factor; angles pass through.
    pub fn convert(&self, value: f64, kind: MeasurementKind) -> f64 {
        match kind {
            MeasurementKind::Distance => value / self.meters(),
            MeasurementKind::Area => value / (self.meters() * self.meters()),
            MeasurementKind::Angle => value,
        }
    }

    /// Unit label for a result of `kind`
    pub fn label_for(&self, kind: MeasurementKind) -> String {
        match kind {
            MeasurementKind::Distance => self.symbol().to_string(),
            MeasurementKind::Area => format!("{}²", self.symbol()),
            MeasurementKind::Angle => kind.default_unit().to_string(),
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mm" | "millimeter" => Ok(LengthUnit::Mm),
            "cm" | "centimeter" => Ok(LengthUnit::Cm),
            "m" | "meter" => Ok(LengthUnit::M),
            "km" | "kilometer" => Ok(LengthUnit::Km),
            "in" | "inch" => Ok(LengthUnit::In),
            "ft" | "foot" | "feet" => Ok(LengthUnit::Ft),
            _ => Err(format!(
                "Invalid length unit: '{}'. Use mm, cm, m, km, in or ft",
                s
            )),
        }
    }
}
