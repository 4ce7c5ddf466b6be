//! Planar geometry on closed integer point sequences.
//!
//! Length and area come from `imageproc::geometry`; this module adds what
//! the classifier needs on top of them.

use std::f64::consts::TAU;

use crate::models::{BoundingBox, Point};

/// Number of farthest-point refinements used to pick the split pair of a
/// closed curve.
const SPLIT_PAIR_ITERATIONS: usize = 3;

/// Inclusive pixel bounding rectangle.
pub fn bounding_rect(points: &[Point]) -> BoundingBox {
    let Some(first) = points.first() else {
        return BoundingBox {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    BoundingBox {
        x: min_x,
        y: min_y,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    }
}

/// Whether the closed polygon is convex.
///
/// Collinear vertices are allowed. All turns must have the same direction
/// and the boundary must wind exactly once, which rules out self-crossing
/// stars.
pub fn is_convex(polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut orientation = 0i64;
    let mut turning = 0.0f64;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let c = polygon[(i + 2) % n];
        let (e1x, e1y) = ((b.x - a.x) as i64, (b.y - a.y) as i64);
        let (e2x, e2y) = ((c.x - b.x) as i64, (c.y - b.y) as i64);

        let cross = e1x * e2y - e1y * e2x;
        let dot = e1x * e2x + e1y * e2y;
        if cross != 0 {
            if orientation == 0 {
                orientation = cross.signum();
            } else if cross.signum() != orientation {
                return false;
            }
        }
        turning += (cross as f64).atan2(dot as f64);
    }

    orientation != 0 && (turning.abs() - TAU).abs() < 1e-6
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is split at its two mutually farthest points and both halves
/// are simplified independently, so the result does not depend on where the
/// tracer happened to start. Vertices keep their original order. A final
/// pass drops vertices that sit on the chord of their neighbours. An
/// `epsilon` of zero or less returns the curve unchanged.
pub fn approximate_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let (a, b) = split_pair(points);
    if points[a] == points[b] {
        return vec![points[a]];
    }

    let mut keep = vec![false; n];
    keep[a] = true;
    keep[b] = true;

    // Segments are (start, end) offsets along the ring, end > start.
    let b_offset = if b > a { b } else { b + n };
    let mut stack = vec![(a, b_offset), (b_offset, a + n)];
    while let Some((start, end)) = stack.pop() {
        if end - start < 2 {
            continue;
        }
        let p0 = points[start % n];
        let p1 = points[end % n];

        let mut farthest = start;
        let mut max_dist = 0.0;
        for k in start + 1..end {
            let d = line_distance(points[k % n], p0, p1);
            if d > max_dist {
                max_dist = d;
                farthest = k;
            }
        }

        if max_dist > epsilon {
            keep[farthest % n] = true;
            stack.push((start, farthest));
            stack.push((farthest, end));
        }
    }

    let mut polygon: Vec<Point> = points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect();
    drop_chord_vertices(&mut polygon, epsilon);
    polygon
}

/// Remove vertices lying within `epsilon / sqrt(2)` of the chord between
/// their neighbours, repeating until nothing changes.
///
/// Douglas-Peucker keeps a vertex as soon as it leaves the tolerance band of
/// the segment being split. On a rotated polygon that is often a point a few
/// pixels past a corner, so the corner ends up represented twice. A triangle
/// is never reduced further.
fn drop_chord_vertices(polygon: &mut Vec<Point>, epsilon: f64) {
    let limit = epsilon * epsilon / 2.0;
    let mut changed = true;
    while changed && polygon.len() > 3 {
        changed = false;
        let mut i = 0;
        while i < polygon.len() && polygon.len() > 3 {
            let n = polygon.len();
            let prev = polygon[(i + n - 1) % n];
            let next = polygon[(i + 1) % n];
            if on_chord(polygon[i], prev, next, limit) {
                polygon.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }
}

/// Whether `p` lies between `a` and `b` and its squared distance to the
/// line through them is at most `limit`.
fn on_chord(p: Point, a: Point, b: Point, limit: f64) -> bool {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let (px, py) = ((p.x - a.x) as f64, (p.y - a.y) as f64);
    let cross = px * dy - py * dx;
    let between = px * (b.x - p.x) as f64 + py * (b.y - p.y) as f64;
    cross * cross <= limit * (dx * dx + dy * dy) && between >= 0.0
}

fn split_pair(points: &[Point]) -> (usize, usize) {
    let mut a = 0;
    let mut b = farthest_from(points, a);
    for _ in 1..SPLIT_PAIR_ITERATIONS {
        let next = farthest_from(points, b);
        if next == a {
            break;
        }
        a = b;
        b = next;
    }
    (a, b)
}

fn farthest_from(points: &[Point], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_dist = 0i64;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        let d = dx * dx + dy * dy;
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

fn distance(a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    dx.hypot(dy)
}

/// Distance from `p` to the infinite line through `a` and `b`.
fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return distance(p, a);
    }
    ((p.x - a.x) as f64 * dy - (p.y - a.y) as f64 * dx).abs() / len
}
