//! Drawing detections onto a copy of the frame.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

use crate::models::{BoundingBox, Circle, Contour, Detection, Geometry, Point, ShapeLabel};

const OUTLINE_THICKNESS: i32 = 3;
const LABEL_PADDING: i32 = 2;
const CIRCLE_MARKER_RADIUS: i32 = 3;
const CIRCLE_OUTLINE: Rgb<u8> = Rgb([255, 0, 0]);
const CIRCLE_MARKER: Rgb<u8> = Rgb([0, 255, 0]);
const LABEL_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_TEXT: Rgb<u8> = Rgb([0, 0, 0]);

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;

/// Copy of `frame` with every detection drawn on it, in order.
///
/// Later detections are drawn over earlier ones. A circle's center marker is
/// drawn over its own label. With no detections the
/// result equals the RGB conversion of the frame.
pub fn annotate(frame: &DynamicImage, detections: &[Detection]) -> RgbImage {
    let mut canvas = frame.to_rgb8();
    for detection in detections {
        let bounds = detection.bounding_box();
        match &detection.geometry {
            Geometry::Polygon { contour, .. } => {
                if let Some(color) = detection.label.outline_color() {
                    draw_contour(&mut canvas, contour, color);
                }
                draw_label(&mut canvas, detection.label, &bounds);
            }
            // The label box sits on the center, so the marker goes on top
            Geometry::Circle(circle) => {
                draw_label(&mut canvas, detection.label, &bounds);
                draw_circle(&mut canvas, circle);
            }
        }
    }
    canvas
}

/// Closed outline through the contour points, `OUTLINE_THICKNESS` wide.
pub fn draw_contour(canvas: &mut RgbImage, contour: &Contour, color: Rgb<u8>) {
    draw_closed_polyline(canvas, contour.points(), color);
}

pub fn draw_circle(canvas: &mut RgbImage, circle: &Circle) {
    let c = circle.center();
    let r = circle.radius.round() as i32;
    draw_filled_circle_mut(canvas, (c.x, c.y), CIRCLE_MARKER_RADIUS, CIRCLE_MARKER);
    let half = OUTLINE_THICKNESS / 2;
    for offset in -half..=half {
        if r + offset > 0 {
            draw_hollow_circle_mut(canvas, (c.x, c.y), r + offset, CIRCLE_OUTLINE);
        }
    }
}

/// Label text on a filled box, centered in `bounds`.
pub fn draw_label(canvas: &mut RgbImage, label: ShapeLabel, bounds: &BoundingBox) {
    let text = label.tag();
    let (text_w, text_h) = text_size(text);
    let x = bounds.x + (bounds.width as i32 - text_w) / 2;
    let y = bounds.y + (bounds.height as i32 - text_h) / 2;

    let background = Rect::at(x - LABEL_PADDING, y - LABEL_PADDING)
        .of_size((text_w + 2 * LABEL_PADDING) as u32, (text_h + 2 * LABEL_PADDING) as u32);
    draw_filled_rect_mut(canvas, background, LABEL_BACKGROUND);
    draw_text(canvas, text, x, y, LABEL_TEXT);
}

/// Pixel size of `text` in the built-in glyph set.
pub fn text_size(text: &str) -> (i32, i32) {
    let n = text.chars().count() as i32;
    if n == 0 {
        return (0, GLYPH_HEIGHT);
    }
    (n * GLYPH_ADVANCE - 1, GLYPH_HEIGHT)
}

fn draw_text(canvas: &mut RgbImage, text: &str, x: i32, y: i32, color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    for (i, ch) in text.chars().enumerate() {
        let origin_x = x + i as i32 * GLYPH_ADVANCE;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = origin_x + col;
                let py = y + row as i32;
                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

fn draw_closed_polyline(canvas: &mut RgbImage, points: &[Point], color: Rgb<u8>) {
    let n = points.len();
    if n < 2 {
        return;
    }
    let half = OUTLINE_THICKNESS / 2;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        for dy in -half..=half {
            for dx in -half..=half {
                draw_line_segment_mut(
                    canvas,
                    ((a.x + dx) as f32, (a.y + dy) as f32),
                    ((b.x + dx) as f32, (b.y + dy) as f32),
                    color,
                );
            }
        }
    }
}

/// White-on-black rendering of traced contours, used for stage dumps.
pub fn render_contours(width: u32, height: u32, contours: &[Contour]) -> GrayImage {
    let mut canvas = GrayImage::new(width, height);
    for contour in contours {
        let points = contour.points();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            draw_line_segment_mut(
                &mut canvas,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                Luma([255u8]),
            );
        }
    }
    canvas
}

/// 5x7 bitmap rows, most significant of the low five bits is the left column.
///
/// Only the letters of the label tags are defined. Labels are fixed strings,
/// so this is not meant as a general font; any other character renders as
/// `?`.
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        ' ' => [0; 7],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}
