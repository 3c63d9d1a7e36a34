//! CLI command implementations

pub mod completions;
pub mod config;
pub mod measure;
pub mod qty;
pub mod section;
