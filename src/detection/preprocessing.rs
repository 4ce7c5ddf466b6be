use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;

use crate::config::EdgeConfig;

/// Convert a frame to single-channel intensity
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Binary edge map (0 or 255) of the same size as `img`.
///
/// Canny with a 3x3 Sobel aperture. A blank frame yields an all-zero map.
pub fn detect_edges(img: &GrayImage, config: &EdgeConfig) -> GrayImage {
    canny(img, config.low_threshold, config.high_threshold)
}

/// Number of "on" pixels in an edge map
pub fn edge_pixel_count(edges: &GrayImage) -> usize {
    edges.pixels().filter(|p| p[0] > 0).count()
}

/// Close small breaks in an edge map by growing every edge pixel into a
/// `(2 * radius + 1)` square. A radius of zero returns a copy.
pub fn close_gaps(edges: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return edges.clone();
    }
    dilate(edges, Norm::LInf, radius)
}
