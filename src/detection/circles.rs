//! Circle detection on a binary edge map with a normal-directed Hough transform.
//!
//! Every edge pixel casts votes along its normal, in both directions, for all
//! radii in range. Centers are peaks of the vote accumulator; each center
//! then gets the radius most edge pixels agree on.

use image::GrayImage;
use std::f64::consts::FRAC_PI_2;
use tracing::debug;

use crate::config::CircleConfig;
use crate::models::Circle;

/// Edge pixels whose neighbourhood has no dominant direction (corners,
/// clutter) do not vote. Coherence is 1 for a straight run of pixels and 0
/// for an isotropic cloud.
const MIN_COHERENCE: f64 = 0.5;

/// Upper bound on the center candidates checked for a radius per frame.
const MAX_CANDIDATES: usize = 256;

#[derive(Debug, Clone, Copy)]
struct OrientedEdge {
    x: i32,
    y: i32,
    nx: f32,
    ny: f32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    score: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CircleDetector {
    config: CircleConfig,
}

impl CircleDetector {
    pub fn new(config: CircleConfig) -> Self {
        Self { config }
    }

    /// Circles in descending order of center score. Empty when no edge
    /// configuration reaches the vote thresholds.
    pub fn detect(&self, edges: &GrayImage) -> Vec<Circle> {
        let (width, height) = edges.dimensions();
        let min_radius = self.config.min_radius.max(1);
        let max_radius = self.config.max_radius_for(width, height);
        if width == 0 || height == 0 || min_radius > max_radius {
            return Vec::new();
        }

        let edge_points: Vec<(i32, i32)> = edges
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 0)
            .map(|(x, y, _)| (x as i32, y as i32))
            .collect();
        if edge_points.is_empty() {
            return Vec::new();
        }

        let oriented = orient_edges(edges, &edge_points, self.config.orientation_window as i32);
        let accumulator = cast_votes(&oriented, width, height, min_radius, max_radius);
        let scores = neighbourhood_sums(&accumulator, width, height);
        let candidates = center_candidates(&scores, width, height, self.config.center_threshold);

        let min_dist = self.config.min_center_distance(height);
        let mut circles: Vec<Circle> = Vec::new();
        for candidate in candidates.iter().take(MAX_CANDIDATES) {
            let (cx, cy) = weighted_center(&accumulator, width, height, candidate.index);
            let far_enough = circles.iter().all(|c| {
                (c.center_x - cx).hypot(c.center_y - cy) >= min_dist
            });
            if !far_enough {
                continue;
            }

            let Some((radius, support)) =
                estimate_radius(&edge_points, cx, cy, min_radius, max_radius)
            else {
                continue;
            };
            if support <= self.config.radius_threshold {
                continue;
            }

            circles.push(Circle {
                center_x: cx,
                center_y: cy,
                radius,
                votes: candidate.score,
            });
        }

        debug!(
            edge_pixels = edge_points.len(),
            oriented = oriented.len(),
            candidates = candidates.len(),
            circles = circles.len(),
            "Hough circle pass"
        );
        circles
    }
}

/// Edge normals from the principal axis of nearby edge pixels.
///
/// The edge pixels inside the `(2 * window + 1)` square around a pixel are
/// treated as a point cloud. Along a smooth curve the cloud is elongated in
/// the tangent direction, so the normal is the axis of least spread. Pixel
/// positions are exact, which keeps the estimate free of the bias gradient
/// filters show on one pixel wide staircase edges.
fn orient_edges(edges: &GrayImage, points: &[(i32, i32)], window: i32) -> Vec<OrientedEdge> {
    let (width, height) = edges.dimensions();

    let mut oriented = Vec::with_capacity(points.len());
    let mut cloud: Vec<(f64, f64)> = Vec::new();
    for &(x, y) in points {
        cloud.clear();
        for wy in (y - window).max(0)..=(y + window).min(height as i32 - 1) {
            for wx in (x - window).max(0)..=(x + window).min(width as i32 - 1) {
                if edges.get_pixel(wx as u32, wy as u32)[0] > 0 {
                    cloud.push((wx as f64, wy as f64));
                }
            }
        }

        let count = cloud.len() as f64;
        let mean_x = cloud.iter().map(|p| p.0).sum::<f64>() / count;
        let mean_y = cloud.iter().map(|p| p.1).sum::<f64>() / count;
        let (mut sxx, mut sxy, mut syy) = (0.0f64, 0.0f64, 0.0f64);
        for &(px, py) in &cloud {
            let (dx, dy) = (px - mean_x, py - mean_y);
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        let spread = sxx + syy;
        if spread <= 0.0 {
            continue;
        }
        let coherence = ((sxx - syy).powi(2) + 4.0 * sxy * sxy).sqrt() / spread;
        if coherence < MIN_COHERENCE {
            continue;
        }

        // Major axis is the tangent; the normal is perpendicular to it
        let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy) + FRAC_PI_2;
        oriented.push(OrientedEdge {
            x,
            y,
            nx: theta.cos() as f32,
            ny: theta.sin() as f32,
        });
    }
    oriented
}

fn cast_votes(
    edges: &[OrientedEdge],
    width: u32,
    height: u32,
    min_radius: u32,
    max_radius: u32,
) -> Vec<u32> {
    let mut accumulator = vec![0u32; width as usize * height as usize];
    for edge in edges {
        for sign in [1.0f32, -1.0] {
            let (dx, dy) = (edge.nx * sign, edge.ny * sign);
            for r in min_radius..=max_radius {
                let x = (edge.x as f32 + dx * r as f32).round() as i64;
                let y = (edge.y as f32 + dy * r as f32).round() as i64;
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    break;
                }
                accumulator[y as usize * width as usize + x as usize] += 1;
            }
        }
    }
    accumulator
}

/// 3x3 neighbourhood sum of every accumulator cell.
fn neighbourhood_sums(accumulator: &[u32], width: u32, height: u32) -> Vec<u32> {
    let (w, h) = (width as i64, height as i64);
    let mut sums = vec![0u32; accumulator.len()];
    for y in 0..h {
        for x in 0..w {
            let mut total = 0u32;
            for ny in (y - 1).max(0)..=(y + 1).min(h - 1) {
                for nx in (x - 1).max(0)..=(x + 1).min(w - 1) {
                    total += accumulator[(ny * w + nx) as usize];
                }
            }
            sums[(y * w + x) as usize] = total;
        }
    }
    sums
}

/// Local score maxima above `threshold`, best first.
fn center_candidates(scores: &[u32], width: u32, height: u32, threshold: u32) -> Vec<Candidate> {
    let (w, h) = (width as i64, height as i64);
    let mut candidates = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let score = scores[(y * w + x) as usize];
            if score <= threshold {
                continue;
            }
            let mut is_peak = true;
            'neighbours: for ny in (y - 1).max(0)..=(y + 1).min(h - 1) {
                for nx in (x - 1).max(0)..=(x + 1).min(w - 1) {
                    if scores[(ny * w + nx) as usize] > score {
                        is_peak = false;
                        break 'neighbours;
                    }
                }
            }
            if is_peak {
                candidates.push(Candidate {
                    index: (y * w + x) as usize,
                    score,
                });
            }
        }
    }
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)));
    candidates
}

/// Vote-weighted centroid of the 3x3 window around a cell.
fn weighted_center(accumulator: &[u32], width: u32, height: u32, index: usize) -> (f32, f32) {
    let (w, h) = (width as i64, height as i64);
    let (x, y) = (index as i64 % w, index as i64 / w);
    let (mut sx, mut sy, mut total) = (0.0f64, 0.0f64, 0.0f64);
    for ny in (y - 1).max(0)..=(y + 1).min(h - 1) {
        for nx in (x - 1).max(0)..=(x + 1).min(w - 1) {
            let v = accumulator[(ny * w + nx) as usize] as f64;
            sx += v * nx as f64;
            sy += v * ny as f64;
            total += v;
        }
    }
    if total == 0.0 {
        return (x as f32, y as f32);
    }
    ((sx / total) as f32, (sy / total) as f32)
}

/// Radius with the largest edge support around a center.
///
/// Edge distances are binned to whole pixels and the best run of three
/// adjacent bins wins. Returns the mean distance inside that run together
/// with the number of supporting pixels.
fn estimate_radius(
    points: &[(i32, i32)],
    cx: f32,
    cy: f32,
    min_radius: u32,
    max_radius: u32,
) -> Option<(f32, u32)> {
    let bins = max_radius as usize + 2;
    let mut counts = vec![0u32; bins];
    let mut sums = vec![0.0f64; bins];
    for &(x, y) in points {
        let d = (x as f32 - cx).hypot(y as f32 - cy);
        let bin = d.round() as usize;
        if bin + 1 < min_radius as usize || bin >= bins {
            continue;
        }
        counts[bin] += 1;
        sums[bin] += d as f64;
    }

    let mut best: Option<(usize, u32)> = None;
    for r in min_radius as usize..=max_radius as usize {
        let support = counts[r - 1] + counts[r] + counts[r + 1];
        if best.is_none_or(|(_, s)| support > s) {
            best = Some((r, support));
        }
    }

    let (r, support) = best?;
    if support == 0 {
        return None;
    }
    let total: f64 = sums[r - 1] + sums[r] + sums[r + 1];
    Some(((total / support as f64) as f32, support))
}
