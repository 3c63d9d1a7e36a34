//! Domain records - measurements, section planes, model elements, quantities

pub mod measurement;
pub mod model;
pub mod quantity;
pub mod section_plane;

pub use measurement::{Measurement, MeasurementKind};
pub use model::{ElementGeometry, ElementQuantities, ModelData, ModelElement, PropertyValue};
pub use quantity::{QuantificationGroup, QuantificationSummary, QuantityItem};
pub use section_plane::{ClipPlane, SectionAxis, SectionPlane};
