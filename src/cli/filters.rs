//! Filters for quantity listings
//!
//! Pure predicates over `QuantityItem`; applying a filter to an already
//! filtered subset narrows it further.

use clap::Args;

use crate::entities::quantity::QuantityItem;

/// Item filter for `qty` commands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantityFilter {
    /// Case-insensitive text search in name and type
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only items in this category (exact match)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Only items of this IFC type (exact match)
    #[arg(long = "type", short = 't')]
    pub item_type: Option<String>,
}

impl QuantityFilter {
    /// Check if an item passes every set criterion
    pub fn matches(&self, item: &QuantityItem) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !item.name.to_lowercase().contains(&needle)
                && !item.item_type.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if item.category != *category {
                return false;
            }
        }
        if let Some(item_type) = &self.item_type {
            if item.item_type != *item_type {
                return false;
            }
        }
        true
    }

    /// Items that pass, in input order
    pub fn apply(&self, items: &[QuantityItem]) -> Vec<QuantityItem> {
        items.iter().filter(|i| self.matches(i)).cloned().collect()
    }
}
