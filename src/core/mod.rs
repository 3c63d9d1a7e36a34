//! Core module - engines, geometry and the viewport boundary

pub mod config;
pub mod export;
pub mod geometry;
pub mod identity;
pub mod loader;
pub mod measurement;
pub mod quantity;
pub mod scene;
pub mod section;
pub mod units;

pub use config::{Config, ConfigError, MeasurementConfig, QuantityConfig, SectionConfig};
pub use export::{export_to_csv, export_to_excel, read_export, ExportError, ExportOptions};
pub use geometry::{BoundingBox, Point, Vector};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use loader::{load_model, LoadError};
pub use measurement::{MeasureError, MeasurementEngine, SessionState, Step, SurfaceGeometry};
pub use quantity::{
    apply_pricing, extract_quantities, generate_summary, group_quantities, ExtractOptions,
};
pub use scene::{
    ClippingRenderer, InMemoryViewport, ObjectHandle, Scene, SceneObject, Viewport,
};
pub use section::SectionPlaneManager;
pub use units::LengthUnit;
