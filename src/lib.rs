//! bimtk: BIM viewport toolkit
//!
//! The computational core behind a 3D building-model viewer: interactive
//! measurement sessions, section (clipping) planes, and quantity take-off
//! over parsed model data.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
