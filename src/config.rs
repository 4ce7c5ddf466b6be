//! Fixed detection thresholds.
//!
//! The values are tuned for a handheld webcam under indoor lighting. They are
//! grouped in [`DetectorConfig`] so a different camera can use its own set
//! without touching the stages.

/// Canny hysteresis low threshold.
pub const CANNY_LOW_THRESHOLD: f32 = 80.0;
/// Canny hysteresis high threshold.
pub const CANNY_HIGH_THRESHOLD: f32 = 240.0;
/// Edge pixels are grown by this many pixels (chessboard distance) before
/// contour tracing. Canny leaves small breaks at sharp corners.
pub const CONTOUR_GAP_RADIUS: u8 = 1;

/// Contours enclosing less than this many square pixels are noise.
pub const MIN_CONTOUR_AREA: f64 = 100.0;
/// Polygon approximation tolerance as a fraction of the contour perimeter.
pub const APPROX_EPSILON_RATIO: f64 = 0.02;

/// Accumulator score a circle center has to exceed.
pub const CIRCLE_CENTER_THRESHOLD: u32 = 200;
/// Number of edge pixels that have to agree on a radius.
pub const CIRCLE_RADIUS_THRESHOLD: u32 = 100;
/// Minimum center distance between circles is `height / CIRCLE_MIN_DIST_DIVISOR`.
pub const CIRCLE_MIN_DIST_DIVISOR: u32 = 8;
/// Smallest radius that receives votes.
pub const CIRCLE_MIN_RADIUS: u32 = 5;
/// Half-size of the square of neighbouring edge pixels used to estimate the
/// edge normal.
pub const CIRCLE_ORIENTATION_WINDOW: u32 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Growth applied to the edge map used for contours only. Circle
    /// detection always sees the thin Canny edges.
    pub gap_radius: u8,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            low_threshold: CANNY_LOW_THRESHOLD,
            high_threshold: CANNY_HIGH_THRESHOLD,
            gap_radius: CONTOUR_GAP_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub min_area: f64,
    pub epsilon_ratio: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_area: MIN_CONTOUR_AREA,
            epsilon_ratio: APPROX_EPSILON_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleConfig {
    pub center_threshold: u32,
    pub radius_threshold: u32,
    pub min_dist_divisor: u32,
    pub min_radius: u32,
    /// `None` limits the radius to half of the larger frame dimension.
    pub max_radius: Option<u32>,
    pub orientation_window: u32,
}

impl CircleConfig {
    /// Minimum distance between two accepted circle centers for an edge map
    /// of the given height.
    pub fn min_center_distance(&self, height: u32) -> f32 {
        height as f32 / self.min_dist_divisor.max(1) as f32
    }

    /// Largest radius that receives votes in a `width` x `height` edge map.
    pub fn max_radius_for(&self, width: u32, height: u32) -> u32 {
        self.max_radius.unwrap_or(width.max(height) / 2)
    }
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            center_threshold: CIRCLE_CENTER_THRESHOLD,
            radius_threshold: CIRCLE_RADIUS_THRESHOLD,
            min_dist_divisor: CIRCLE_MIN_DIST_DIVISOR,
            min_radius: CIRCLE_MIN_RADIUS,
            max_radius: None,
            orientation_window: CIRCLE_ORIENTATION_WINDOW,
        }
    }
}

/// All thresholds used by one detector instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorConfig {
    pub edges: EdgeConfig,
    pub classifier: ClassifierConfig,
    pub circles: CircleConfig,
}
