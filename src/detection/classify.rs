use crate::config::ClassifierConfig;
use crate::detection::geometry;
use crate::models::{Contour, FrameStats, Point, ShapeLabel};

/// Why a contour produced no label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Fewer than three points or a zero-length boundary.
    Degenerate,
    TooSmall { area: f64 },
    /// The polygon approximation is not convex.
    NonConvex,
}

/// Outcome of classifying one contour.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Triangle through hexagon.
    Shape {
        label: ShapeLabel,
        approximation: Vec<Point>,
    },
    /// Convex and large enough, but the vertex count names no shape.
    Unclassified { approximation: Vec<Point> },
    Rejected(Rejection),
}

impl Verdict {
    pub fn label(&self) -> ShapeLabel {
        match self {
            Verdict::Shape { label, .. } => *label,
            _ => ShapeLabel::Unclassified,
        }
    }

    pub fn approximation(&self) -> Option<&[Point]> {
        match self {
            Verdict::Shape { approximation, .. } | Verdict::Unclassified { approximation } => {
                Some(approximation.as_slice())
            }
            Verdict::Rejected(_) => None,
        }
    }

    /// Count this verdict in the frame statistics.
    pub fn record(&self, stats: &mut FrameStats) {
        match self {
            Verdict::Shape { .. } => stats.shapes += 1,
            Verdict::Unclassified { .. } => stats.unclassified += 1,
            Verdict::Rejected(Rejection::Degenerate) => stats.rejected_degenerate += 1,
            Verdict::Rejected(Rejection::TooSmall { .. }) => stats.rejected_small += 1,
            Verdict::Rejected(Rejection::NonConvex) => stats.rejected_non_convex += 1,
        }
    }
}

/// Names polygonal contours by the vertex count of their approximation.
///
/// The approximation tolerance scales with the perimeter, so the same shape
/// classifies the same way at any distance from the camera.
#[derive(Debug, Clone, Default)]
pub struct ShapeClassifier {
    config: ClassifierConfig,
}

impl ShapeClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify a single contour. Pure: the same contour always yields the
    /// same verdict.
    pub fn classify(&self, contour: &Contour) -> Verdict {
        if contour.len() < 3 {
            return Verdict::Rejected(Rejection::Degenerate);
        }
        let perimeter = contour.perimeter();
        if perimeter <= 0.0 {
            return Verdict::Rejected(Rejection::Degenerate);
        }

        let approximation =
            geometry::approximate_polygon(contour.points(), perimeter * self.config.epsilon_ratio);

        let area = contour.area();
        if area < self.config.min_area {
            return Verdict::Rejected(Rejection::TooSmall { area });
        }
        if !geometry::is_convex(&approximation) {
            return Verdict::Rejected(Rejection::NonConvex);
        }

        match ShapeLabel::from_vertex_count(approximation.len()) {
            ShapeLabel::Unclassified => Verdict::Unclassified { approximation },
            label => Verdict::Shape {
                label,
                approximation,
            },
        }
    }
}
