pub mod annotate;
pub mod circles;
pub mod classify;
pub mod contours;
pub mod geometry;
pub mod preprocessing;
pub mod steps;

use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::models::{AnnotatedFrame, Detection, FrameStats, Geometry, ShapeLabel};
use crate::pipeline::{FrameProcessor, Pipeline};
use circles::CircleDetector;
use classify::{ShapeClassifier, Verdict};

/// Stateless per-frame shape detector
///
/// Holds only thresholds. Every call to [`ShapeDetector::process_frame`]
/// starts from scratch, so nothing from one frame can show up in the next.
#[derive(Debug, Clone, Default)]
pub struct ShapeDetector {
    config: DetectorConfig,
}

impl ShapeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline on one frame
    ///
    /// Grayscale, edges, contours, shape classification, circles, then
    /// annotation onto a copy of `frame`. Degenerate contours are skipped and
    /// counted in the returned stats; nothing here fails.
    pub fn process_frame(&self, frame: &DynamicImage) -> AnnotatedFrame {
        let gray = preprocessing::to_grayscale(frame);
        let edges = preprocessing::detect_edges(&gray, &self.config.edges);
        let closed = preprocessing::close_gaps(&edges, self.config.edges.gap_radius);
        let traced = contours::find_external_contours(&closed);

        let mut stats = FrameStats {
            contours: traced.len(),
            ..FrameStats::default()
        };

        let classifier = ShapeClassifier::new(self.config.classifier.clone());
        let mut detections = Vec::new();
        for contour in traced {
            let verdict = classifier.classify(&contour);
            verdict.record(&mut stats);
            if let Verdict::Shape {
                label,
                approximation,
            } = verdict
            {
                detections.push(Detection {
                    label,
                    geometry: Geometry::Polygon {
                        contour,
                        approximation,
                    },
                });
            }
        }

        let circles = CircleDetector::new(self.config.circles.clone()).detect(&edges);
        stats.circles = circles.len();
        detections.extend(circles.into_iter().map(|circle| Detection {
            label: ShapeLabel::Circle,
            geometry: Geometry::Circle(circle),
        }));

        debug!(
            contours = stats.contours,
            shapes = stats.shapes,
            circles = stats.circles,
            "frame processed"
        );

        AnnotatedFrame {
            image: annotate::annotate(frame, &detections),
            detections,
            stats,
        }
    }
}

impl FrameProcessor for ShapeDetector {
    fn process(&self, frame: &DynamicImage, _index: u64) -> Result<AnnotatedFrame> {
        Ok(self.process_frame(frame))
    }
}

/// Build the standard six-step pipeline using the composable pipeline system
pub fn build_standard_pipeline(config: &DetectorConfig) -> Pipeline {
    use steps::*;

    Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(EdgeDetectionStep {
            config: config.edges.clone(),
        }))
        .add_step(Arc::new(ContourDetectionStep {
            gap_radius: config.edges.gap_radius,
        }))
        .add_step(Arc::new(ShapeClassificationStep {
            config: config.classifier.clone(),
        }))
        .add_step(Arc::new(CircleDetectionStep {
            config: config.circles.clone(),
        }))
        .add_step(Arc::new(AnnotationStep))
}
