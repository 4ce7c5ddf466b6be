use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::models::{AnnotatedFrame, Contour, Detection, FrameStats};

/// Data that flows through the pipeline for one frame
#[derive(Clone)]
pub struct PipelineData {
    /// Output image of the last step (what gets dumped in debug mode)
    pub image: DynamicImage,

    /// The untouched input frame, shared with every step
    pub original: Arc<DynamicImage>,

    /// Binary edge map, once edge detection has run
    pub edges: Option<GrayImage>,

    /// Traced outer contours, in tracing order
    pub contours: Vec<Contour>,

    /// Labelled results, polygons first then circles
    pub detections: Vec<Detection>,

    pub stats: FrameStats,

    /// Free-form values steps attach for later steps or for inspection
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f32),
    Int(i64),
}

impl PipelineData {
    /// Start a pipeline pass on a full frame
    pub fn from_frame(frame: DynamicImage) -> Self {
        let original = Arc::new(frame);
        Self {
            image: original.as_ref().clone(),
            original,
            edges: None,
            contours: Vec::new(),
            detections: Vec::new(),
            stats: FrameStats::default(),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// The edge map, or an error naming the step that needed it
    pub fn require_edges(&self, step: &str) -> Result<&GrayImage> {
        self.edges
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("{} needs an edge map; run Edge Detection first", step))
    }

    /// Final result of a complete pass
    pub fn into_annotated(self) -> AnnotatedFrame {
        AnnotatedFrame {
            image: self.image.to_rgb8(),
            detections: self.detections,
            stats: self.stats,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// One stage of the per-frame pipeline
pub trait PipelineStep: Send + Sync {
    /// Transform the frame data
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name (used for logging and debug directory names)
    fn name(&self) -> &str;
}

/// Anything that turns a frame into an annotated frame
pub trait FrameProcessor {
    fn process(&self, frame: &DynamicImage, index: u64) -> Result<AnnotatedFrame>;
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        ensure_empty_dir(&output_dir)?;
        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step on one frame
    pub fn run(&self, input: DynamicImage, frame_index: u64) -> Result<PipelineData> {
        self.run_partial(input, frame_index, self.steps.len())
    }

    /// Run the first `num_steps` steps (useful for inspecting intermediate stages)
    pub fn run_partial(
        &self,
        input: DynamicImage,
        frame_index: u64,
        num_steps: usize,
    ) -> Result<PipelineData> {
        self.save_debug_image(&input, "00_input", frame_index)?;

        let mut data = PipelineData::from_frame(input);
        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let step_name = step.name();
            debug!(frame = frame_index, step = step_name, "running step");
            data = step
                .process(data, &self.context)
                .with_context(|| format!("step '{}' failed on frame {}", step_name, frame_index))?;

            let step_dir_name = format!(
                "{:02}_{}",
                step_idx + 1,
                step_name.to_lowercase().replace(' ', "_")
            );
            self.save_debug_image(&data.image, &step_dir_name, frame_index)?;
        }

        Ok(data)
    }

    fn save_debug_image(&self, image: &DynamicImage, step_dir_name: &str, frame_index: u64) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };
        let step_dir = debug_config.output_dir.join(step_dir_name);
        std::fs::create_dir_all(&step_dir)?;
        let filename = format!("{:05}.png", frame_index);
        image
            .save(step_dir.join(&filename))
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        debug!("Debug: saved {}/{}", step_dir_name, filename);
        Ok(())
    }
}

impl FrameProcessor for Pipeline {
    fn process(&self, frame: &DynamicImage, index: u64) -> Result<AnnotatedFrame> {
        Ok(self.run(frame.clone(), index)?.into_annotated())
    }
}

/// Accept a directory only if it is empty, creating it when missing
pub fn ensure_empty_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        let entries = std::fs::read_dir(dir)?;
        if entries.count() > 0 {
            anyhow::bail!("Directory is not empty: {}", dir.display());
        }
    } else {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}
