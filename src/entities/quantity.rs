//! Quantity take-off records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::model::PropertyValue;

/// Quantities for one element, or for identical elements folded together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityItem {
    pub id: String,

    pub name: String,

    /// IFC type, e.g. `IFCWALL`
    #[serde(rename = "type")]
    pub item_type: String,

    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    /// Construction phase or status, when the model records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

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

    /// Number of equivalent elements this item stands for
    pub count: u32,

    /// Unit the item is billed in (`m²`, `m`, `un`)
    pub unit: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    /// `unit_price * count`, present only when `unit_price` is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl QuantityItem {
    /// Set the unit price and derive the total
    pub fn with_unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = Some(unit_price);
        self.total_price = Some(unit_price * self.count as f64);
        self
    }
}

/// Items sharing a category, with their aggregated totals
///
/// A total is `None` when no item in the group carries that field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantificationGroup {
    pub category: String,
    pub items: Vec<QuantityItem>,
    pub total_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

/// Totals across a whole item set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantificationSummary {
    pub groups: Vec<QuantificationGroup>,
    pub total_items: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    /// Item count per IFC type
    pub by_type: BTreeMap<String, u64>,
    /// Item count per material, for items that have one
    pub by_material: BTreeMap<String, u64>,
    /// Item count per phase, for items that have one
    pub by_phase: BTreeMap<String, u64>,
}
