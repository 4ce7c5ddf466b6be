use image::GrayImage;
use imageproc::contours::{self, BorderType};

use crate::models::{Contour, Point};

/// Trace the outermost closed boundaries of an edge map.
///
/// Borders nested inside another border are not returned. Every contour is
/// chain-compressed and has at least three vertices; shorter traces (single
/// pixels, straight strokes) are dropped. All contours share the tracing
/// direction of the border follower.
pub fn find_external_contours(edges: &GrayImage) -> Vec<Contour> {
    contours::find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| compress_chain(&c.points))
        .filter(|points| points.len() >= 3)
        .map(Contour::new)
        .collect()
}

/// Drop every boundary pixel that continues a straight run.
///
/// A pixel is kept only where the step direction into it differs from the
/// step direction out of it, so horizontal, vertical and diagonal runs
/// collapse to their end points.
pub fn compress_chain(points: &[Point]) -> Vec<Point> {
    let mut chain: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if chain.last() != Some(&p) {
            chain.push(p);
        }
    }
    while chain.len() > 1 && chain.first() == chain.last() {
        chain.pop();
    }

    let n = chain.len();
    if n < 3 {
        return chain;
    }

    (0..n)
        .filter(|&i| {
            let prev = chain[(i + n - 1) % n];
            let cur = chain[i];
            let next = chain[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| chain[i])
        .collect()
}

fn step(from: Point, to: Point) -> (i32, i32) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}
