use crate::config::{CircleConfig, ClassifierConfig, EdgeConfig};
use crate::detection::annotate;
use crate::detection::circles::CircleDetector;
use crate::detection::classify::{ShapeClassifier, Verdict};
use crate::detection::{contours, preprocessing};
use crate::models::{Detection, Geometry, ShapeLabel};
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};
use anyhow::Result;
use image::DynamicImage;
use tracing::debug;

/// Convert the frame to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = preprocessing::to_grayscale(&data.image);
        data.image = DynamicImage::ImageLuma8(gray);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub config: EdgeConfig,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let edges = preprocessing::detect_edges(&gray, &self.config);
        let edge_pixels = preprocessing::edge_pixel_count(&edges);
        let (width, height) = edges.dimensions();
        let density = edge_pixels as f32 / (width as f32 * height as f32).max(1.0);
        debug!(edge_pixels, density, "edge map ready");

        data.image = DynamicImage::ImageLuma8(edges.clone());
        data.edges = Some(edges);
        Ok(data
            .with_metadata("edge_pixels", MetadataValue::Int(edge_pixels as i64))
            .with_metadata("edge_density", MetadataValue::Float(density)))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Trace outer contours of the edge map after closing corner gaps
pub struct ContourDetectionStep {
    pub gap_radius: u8,
}

impl PipelineStep for ContourDetectionStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let edges = data.require_edges(self.name())?;
        let closed = preprocessing::close_gaps(edges, self.gap_radius);
        let traced = contours::find_external_contours(&closed);
        let (width, height) = edges.dimensions();

        data.stats.contours = traced.len();
        data.image = DynamicImage::ImageLuma8(annotate::render_contours(width, height, &traced));
        data.contours = traced;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Contour Detection"
    }
}

/// Label each contour by the vertex count of its polygon approximation
pub struct ShapeClassificationStep {
    pub config: ClassifierConfig,
}

impl PipelineStep for ShapeClassificationStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let classifier = ShapeClassifier::new(self.config.clone());
        for contour in &data.contours {
            let verdict = classifier.classify(contour);
            verdict.record(&mut data.stats);
            if let Verdict::Shape {
                label,
                approximation,
            } = verdict
            {
                data.detections.push(Detection {
                    label,
                    geometry: Geometry::Polygon {
                        contour: contour.clone(),
                        approximation,
                    },
                });
            }
        }
        debug!(
            shapes = data.stats.shapes,
            unclassified = data.stats.unclassified,
            too_small = data.stats.rejected_small,
            non_convex = data.stats.rejected_non_convex,
            "classified contours"
        );
        Ok(data)
    }

    fn name(&self) -> &str {
        "Shape Classification"
    }
}

/// Hough circle detection on the same edge map the contours came from
pub struct CircleDetectionStep {
    pub config: CircleConfig,
}

impl PipelineStep for CircleDetectionStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let circles = CircleDetector::new(self.config.clone()).detect(data.require_edges(self.name())?);
        data.stats.circles = circles.len();
        data.detections.extend(circles.into_iter().map(|circle| Detection {
            label: ShapeLabel::Circle,
            geometry: Geometry::Circle(circle),
        }));
        Ok(data)
    }

    fn name(&self) -> &str {
        "Circle Detection"
    }
}

/// Draw all detections onto a copy of the original frame
pub struct AnnotationStep;

impl PipelineStep for AnnotationStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let annotated = annotate::annotate(&data.original, &data.detections);
        data.image = DynamicImage::ImageRgb8(annotated);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Annotation"
    }
}
