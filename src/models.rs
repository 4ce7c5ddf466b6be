use image::{Rgb, RgbImage};
use std::fmt;

use crate::detection::geometry;

/// Integer pixel coordinate.
pub type Point = imageproc::point::Point<i32>;

/// Axis-aligned bounding box in frame coordinates.
///
/// `x`/`y` may be negative for geometry that leaves the frame (a circle near
/// the border).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }
}

/// Closed outer boundary traced from an edge map.
///
/// Only the vertices needed to rebuild the boundary from straight segments
/// are stored. The point order is the tracing order and is never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of the closed boundary.
    pub fn perimeter(&self) -> f64 {
        imageproc::geometry::arc_length(&self.points, true)
    }

    /// Enclosed area (absolute shoelace area).
    pub fn area(&self) -> f64 {
        imageproc::geometry::contour_area(&self.points)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        geometry::bounding_rect(&self.points)
    }
}

/// Circle found by the Hough transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    /// Accumulator score of the center.
    pub votes: u32,
}

impl Circle {
    /// Center rounded to the pixel grid.
    pub fn center(&self) -> Point {
        Point::new(self.center_x.round() as i32, self.center_y.round() as i32)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let r = self.radius.round() as i32;
        let c = self.center();
        let side = (2 * r + 1).max(1) as u32;
        BoundingBox {
            x: c.x - r,
            y: c.y - r,
            width: side,
            height: side,
        }
    }
}

/// Label attached to a detection for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeLabel {
    Triangle,
    Quadrilateral,
    Pentagon,
    Hexagon,
    Circle,
    Unclassified,
}

impl ShapeLabel {
    pub const ALL: [ShapeLabel; 6] = [
        ShapeLabel::Triangle,
        ShapeLabel::Quadrilateral,
        ShapeLabel::Pentagon,
        ShapeLabel::Hexagon,
        ShapeLabel::Circle,
        ShapeLabel::Unclassified,
    ];

    /// Polygon label for an approximation with `count` vertices.
    pub fn from_vertex_count(count: usize) -> Self {
        match count {
            3 => ShapeLabel::Triangle,
            4 => ShapeLabel::Quadrilateral,
            5 => ShapeLabel::Pentagon,
            6 => ShapeLabel::Hexagon,
            _ => ShapeLabel::Unclassified,
        }
    }

    /// Text drawn onto the frame.
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeLabel::Triangle => "TRI",
            ShapeLabel::Quadrilateral => "RECT",
            ShapeLabel::Pentagon => "PENTA",
            ShapeLabel::Hexagon => "HEXA",
            ShapeLabel::Circle => "CIR",
            ShapeLabel::Unclassified => "?",
        }
    }

    /// Contour outline color, for the labels that get one.
    pub fn outline_color(&self) -> Option<Rgb<u8>> {
        match self {
            ShapeLabel::Quadrilateral => Some(Rgb([0, 255, 255])),
            ShapeLabel::Pentagon => Some(Rgb([0, 255, 0])),
            ShapeLabel::Hexagon => Some(Rgb([0, 0, 255])),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeLabel::Triangle => "triangle",
            ShapeLabel::Quadrilateral => "quadrilateral",
            ShapeLabel::Pentagon => "pentagon",
            ShapeLabel::Hexagon => "hexagon",
            ShapeLabel::Circle => "circle",
            ShapeLabel::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// Geometry a label is attached to.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon {
        contour: Contour,
        approximation: Vec<Point>,
    },
    Circle(Circle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: ShapeLabel,
    pub geometry: Geometry,
}

impl Detection {
    pub fn bounding_box(&self) -> BoundingBox {
        match &self.geometry {
            Geometry::Polygon { contour, .. } => contour.bounding_box(),
            Geometry::Circle(circle) => circle.bounding_box(),
        }
    }
}

/// Per-frame counters, mostly for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub contours: usize,
    pub shapes: usize,
    pub unclassified: usize,
    pub rejected_degenerate: usize,
    pub rejected_small: usize,
    pub rejected_non_convex: usize,
    pub circles: usize,
}

/// Output of one pass over a frame.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    pub image: RgbImage,
    pub detections: Vec<Detection>,
    pub stats: FrameStats,
}

impl AnnotatedFrame {
    pub fn count(&self, label: ShapeLabel) -> usize {
        self.detections.iter().filter(|d| d.label == label).count()
    }
}
