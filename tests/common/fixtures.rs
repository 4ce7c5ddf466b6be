#![allow(dead_code)]

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut,
};
use shapecam::models::{Contour, Point};
use std::f64::consts::{FRAC_PI_2, TAU};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

pub fn pt(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

/// Black RGB frame
pub fn blank_frame(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, BLACK))
}

/// Black frame with a filled white polygon
pub fn polygon_frame(width: u32, height: u32, vertices: &[Point]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, BLACK);
    draw_polygon_mut(&mut img, vertices, WHITE);
    DynamicImage::ImageRgb8(img)
}

/// Black frame with a filled white disk
pub fn disk_frame(width: u32, height: u32, center: (i32, i32), radius: i32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, BLACK);
    draw_filled_circle_mut(&mut img, center, radius, WHITE);
    DynamicImage::ImageRgb8(img)
}

/// Axis-aligned filled square frame, corners at `min` and `max`
pub fn square_frame(width: u32, height: u32, min: i32, max: i32) -> DynamicImage {
    polygon_frame(
        width,
        height,
        &[pt(min, min), pt(max, min), pt(max, max), pt(min, max)],
    )
}

/// Edge map holding a one pixel wide circle
pub fn ring_edges(width: u32, height: u32, center: (i32, i32), radius: i32) -> GrayImage {
    let mut edges = GrayImage::new(width, height);
    draw_hollow_circle_mut(&mut edges, center, radius, Luma([255u8]));
    edges
}

/// Edge map holding the closed outline through `vertices`
pub fn outline_edges(width: u32, height: u32, vertices: &[Point]) -> GrayImage {
    let mut edges = GrayImage::new(width, height);
    add_outline(&mut edges, vertices);
    edges
}

pub fn add_outline(edges: &mut GrayImage, vertices: &[Point]) {
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        draw_line_segment_mut(
            edges,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            Luma([255u8]),
        );
    }
}

/// Vertices of a regular polygon with one vertex pointing up
pub fn regular_polygon(sides: usize, radius: f64, center: (i32, i32)) -> Vec<Point> {
    rotated_polygon(sides, radius, center, 0.0)
}

/// Regular polygon turned clockwise by `degrees` from the vertex-up pose
pub fn rotated_polygon(sides: usize, radius: f64, center: (i32, i32), degrees: f64) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = -FRAC_PI_2 + degrees.to_radians() + TAU * i as f64 / sides as f64;
            pt(
                center.0 + (radius * angle.cos()).round() as i32,
                center.1 + (radius * angle.sin()).round() as i32,
            )
        })
        .collect()
}

/// Every integer point along the closed outline through `vertices`, as a
/// contour tracer would report it before compression
pub fn densify(vertices: &[Point]) -> Vec<Point> {
    let mut points = Vec::new();
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).max(1);
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            let x = a.x as f64 + (b.x - a.x) as f64 * t;
            let y = a.y as f64 + (b.y - a.y) as f64 * t;
            let p = pt(x.round() as i32, y.round() as i32);
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
    }
    points
}

/// Densified contour of a regular polygon
pub fn polygon_contour(sides: usize, radius: f64, center: (i32, i32)) -> Contour {
    Contour::new(densify(&regular_polygon(sides, radius, center)))
}

/// Densified contour of a rotated regular polygon
pub fn rotated_contour(sides: usize, radius: f64, center: (i32, i32), degrees: f64) -> Contour {
    Contour::new(densify(&rotated_polygon(sides, radius, center, degrees)))
}

/// Square frame filled white from `min` to `max` with a black ring band
/// of `radius +- half_width` painted inside it
pub fn ringed_square_frame(
    size: u32,
    min: i32,
    max: i32,
    center: (i32, i32),
    radius: f64,
    half_width: f64,
) -> DynamicImage {
    let mut img = square_frame(size, size, min, max).to_rgb8();
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let d = (x as f64 - center.0 as f64).hypot(y as f64 - center.1 as f64);
        if (d - radius).abs() <= half_width {
            *pixel = BLACK;
        }
    }
    DynamicImage::ImageRgb8(img)
}

/// Number of pixels exactly equal to `color`
pub fn count_color(img: &RgbImage, color: Rgb<u8>) -> usize {
    img.pixels().filter(|p| **p == color).count()
}
