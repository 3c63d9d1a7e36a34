//! Parsed model data - the flat element list produced by a model parser

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A property value attached to a model element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl PropertyValue {
    /// Display text for values that carry information
    ///
    /// Empty strings, zero, `false` and null yield `None`.
    pub fn as_label(&self) -> Option<String> {
        match self {
            PropertyValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
            PropertyValue::Number(n) if *n != 0.0 => Some(n.to_string()),
            PropertyValue::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::Null => Ok(()),
        }
    }
}

/// Quantities reported directly by the model (base quantities)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementQuantities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl ElementQuantities {
    pub fn is_empty(&self) -> bool {
        self.length.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.area.is_none()
            && self.volume.is_none()
    }
}

/// Triangulated element geometry in model coordinates (meters)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementGeometry {
    /// Flat `x, y, z` triples
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

/// One building element from the parsed model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelElement {
    pub express_id: u64,

    /// IFC entity type, e.g. `IFCWALL`
    #[serde(rename = "type")]
    pub ifc_type: String,

    #[serde(default)]
    pub guid: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantities: Option<ElementQuantities>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<ElementGeometry>,
}

impl ModelElement {
    /// First informative value among the given property keys
    pub fn first_property(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.properties.get(*k))
            .find_map(PropertyValue::as_label)
    }
}

/// A parsed model: project metadata plus the flat element list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub elements: Vec<ModelElement>,
}
