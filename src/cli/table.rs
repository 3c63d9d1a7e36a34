//! Table rendering for list output

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{format_opt, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::quantity::{QuantificationGroup, QuantityItem};

#[derive(Tabled)]
pub struct ItemRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "TYPE")]
    pub item_type: String,
    #[tabled(rename = "CATEGORY")]
    pub category: String,
    #[tabled(rename = "MATERIAL")]
    pub material: String,
    #[tabled(rename = "AREA")]
    pub area: String,
    #[tabled(rename = "VOLUME")]
    pub volume: String,
    #[tabled(rename = "COUNT")]
    pub count: u32,
    #[tabled(rename = "UNIT")]
    pub unit: String,
    #[tabled(rename = "TOTAL")]
    pub total_price: String,
}

impl From<&QuantityItem> for ItemRow {
    fn from(item: &QuantityItem) -> Self {
        Self {
            id: item.id.clone(),
            name: truncate_str(&item.name, 30),
            item_type: item.item_type.clone(),
            category: item.category.clone(),
            material: item.material.as_deref().map(|m| truncate_str(m, 20)).unwrap_or_default(),
            area: format_opt(item.area),
            volume: format_opt(item.volume),
            count: item.count,
            unit: item.unit.clone(),
            total_price: format_opt(item.total_price),
        }
    }
}

#[derive(Tabled)]
pub struct GroupRow {
    #[tabled(rename = "CATEGORY")]
    pub category: String,
    #[tabled(rename = "ITEMS")]
    pub items: usize,
    #[tabled(rename = "COUNT")]
    pub count: u64,
    #[tabled(rename = "AREA (m²)")]
    pub area: String,
    #[tabled(rename = "VOLUME (m³)")]
    pub volume: String,
    #[tabled(rename = "LENGTH (m)")]
    pub length: String,
    #[tabled(rename = "COST")]
    pub cost: String,
}

impl From<&QuantificationGroup> for GroupRow {
    fn from(group: &QuantificationGroup) -> Self {
        Self {
            category: group.category.clone(),
            items: group.items.len(),
            count: group.total_count,
            area: format_opt(group.total_area),
            volume: format_opt(group.total_volume),
            length: format_opt(group.total_length),
            cost: format_opt(group.total_cost),
        }
    }
}

/// Two-column key/value row
#[derive(Tabled)]
pub struct KeyValueRow {
    #[tabled(rename = "FIELD")]
    pub key: String,
    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl KeyValueRow {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

/// Render rows as a rounded table, or markdown for `OutputFormat::Md`
pub fn render<T: Tabled>(rows: Vec<T>, format: OutputFormat) -> String {
    let mut table = Table::new(rows);
    match format {
        OutputFormat::Md => table.with(Style::markdown()),
        _ => table.with(Style::rounded()),
    };
    table.to_string()
}
