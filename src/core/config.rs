//! Toolkit configuration
//!
//! Loaded from YAML. Lookup order: an explicit path (`--config` or
//! `BIMTK_CONFIG`), then `config.yaml` in the user's config directory,
//! then built-in defaults. Every section and field is optional.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::units::LengthUnit;
use crate::yaml::{parse_yaml_file, YamlError};

const CONFIG_FILE: &str = "config.yaml";

/// Measurement session options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Round picked points to the grid
    pub snap_to_grid: bool,

    /// Grid spacing in scene units
    pub grid_size: f64,

    /// Snap picked points onto nearby surface geometry (not active yet)
    pub snap_to_geometry: bool,

    /// Search radius for geometry snapping
    pub snap_threshold: f64,

    /// Unit results are converted to
    pub length_unit: LengthUnit,

    /// Label override for distance and area units (angles always use `°`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Decimal places in labels
    pub precision: usize,

    /// Marker and line color (0xRRGGBB)
    pub color: u32,

    /// Marker sphere radius
    pub marker_size: f64,

    /// Keep collecting area points until the polygon is closed explicitly
    pub explicit_polygon_close: bool,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            grid_size: 0.1,
            snap_to_geometry: false,
            snap_threshold: 0.1,
            length_unit: LengthUnit::M,
            unit: None,
            precision: 2,
            color: 0xff0000,
            marker_size: 0.1,
            explicit_polygon_close: false,
        }
    }
}

/// Section plane options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionConfig {
    /// Most planes the registry holds at once
    pub max_planes: usize,

    /// Whether plane helpers start visible
    pub show_helpers: bool,

    /// Edge length of the helper square
    pub helper_size: f64,

    pub helper_color: u32,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            max_planes: 6,
            show_helpers: true,
            helper_size: 10.0,
            helper_color: 0xff0000,
        }
    }
}

/// Quantity take-off options
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuantityConfig {
    /// Fold identical elements into one item with a count
    pub fold_identical: bool,

    /// Include price columns in exports
    pub pricing: bool,

    /// Unit prices keyed by IFC type or category
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub prices: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub measurement: MeasurementConfig,
    pub section: SectionConfig,
    pub quantity: QuantityConfig,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("Config file not found: {0}")]
    #[diagnostic(code(bimtk::config::not_found))]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(bimtk::config::invalid))]
    Invalid(String),
}

impl Config {
    /// `config.yaml` in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "bimtk")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit path must exist; the default path is used only if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)?
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading config");
        Ok(parse_yaml_file(path)?)
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.measurement;
        if !m.grid_size.is_finite() || m.grid_size < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "measurement.grid_size must be a non-negative number (got {})",
                m.grid_size
            )));
        }
        if !m.snap_threshold.is_finite() || m.snap_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "measurement.snap_threshold must be a non-negative number (got {})",
                m.snap_threshold
            )));
        }
        if m.precision > 10 {
            return Err(ConfigError::Invalid(format!(
                "measurement.precision must be at most 10 (got {})",
                m.precision
            )));
        }
        if self.section.max_planes == 0 {
            return Err(ConfigError::Invalid(
                "section.max_planes must be at least 1".to_string(),
            ));
        }
        if let Some((key, price)) = self
            .quantity
            .prices
            .iter()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "quantity.prices.{} must be a non-negative number (got {})",
                key, price
            )));
        }
        Ok(())
    }

    /// Serialize for `bimtk config show`
    pub fn to_yaml(&self) -> Result<String, serde_yml::Error> {
        serde_yml::to_string(self)
    }
}
