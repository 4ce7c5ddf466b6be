mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from shapecam for tests
pub use shapecam::config::{CircleConfig, ClassifierConfig, DetectorConfig};
pub use shapecam::models::{Contour, Detection, Geometry, Point, ShapeLabel};
