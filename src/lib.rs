pub mod config;
pub mod detection;
pub mod models;
pub mod pipeline;
pub mod video;

pub use config::DetectorConfig;
pub use detection::{ShapeDetector, build_standard_pipeline};
pub use models::{
    AnnotatedFrame, BoundingBox, Circle, Contour, Detection, FrameStats, Geometry, Point,
    ShapeLabel,
};
pub use pipeline::{
    DebugConfig, FrameProcessor, MetadataValue, Pipeline, PipelineContext, PipelineData,
    PipelineStep,
};
pub use video::{FrameSink, FrameSource, QuitSignal, RunSummary, run_loop};
