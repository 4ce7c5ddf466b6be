mod common;

use common::*;
use shapecam::detection::steps::{CircleDetectionStep, EdgeDetectionStep, GrayscaleStep};
use shapecam::{FrameProcessor, Pipeline, ShapeDetector, build_standard_pipeline};
use std::sync::Arc;

#[test]
fn test_filled_square_is_a_quadrilateral() {
    let frame = square_frame(200, 200, 50, 150);
    let result = ShapeDetector::default().process_frame(&frame);

    assert_eq!(result.detections.len(), 1);
    assert_eq!(result.count(ShapeLabel::Quadrilateral), 1);
    assert_eq!(result.count(ShapeLabel::Circle), 0);
    assert_eq!(result.stats.shapes, 1);
}

#[test]
fn test_filled_polygons_are_labelled() {
    let cases = [
        (3, ShapeLabel::Triangle),
        (4, ShapeLabel::Quadrilateral),
        (5, ShapeLabel::Pentagon),
        (6, ShapeLabel::Hexagon),
    ];
    let detector = ShapeDetector::default();
    for (sides, expected) in cases {
        let frame = polygon_frame(300, 300, &regular_polygon(sides, 100.0, (150, 160)));
        let result = detector.process_frame(&frame);
        assert_eq!(result.count(expected), 1, "{} sides: {:?}", sides, result.stats);
    }
}

#[test]
fn test_rotated_off_axis_polygons_are_labelled() {
    let cases = [
        (3, ShapeLabel::Triangle),
        (4, ShapeLabel::Quadrilateral),
        (5, ShapeLabel::Pentagon),
        (6, ShapeLabel::Hexagon),
    ];
    let detector = ShapeDetector::default();
    for (radius, width, height, center) in [(60.0, 240, 220, (110, 118)), (120.0, 330, 300, (160, 150))] {
        for (sides, expected) in cases {
            for degrees in [0.0, 17.0, 33.0, 50.0, 71.0] {
                let vertices = rotated_polygon(sides, radius, center, degrees);
                let result = detector.process_frame(&polygon_frame(width, height, &vertices));
                assert_eq!(
                    result.count(expected),
                    1,
                    "{} sides, radius {}, {} degrees: {:?}",
                    sides,
                    radius,
                    degrees,
                    result.stats
                );
                assert_eq!(result.detections.len(), 1);
            }
        }
    }
}

#[test]
fn test_rotated_hexagon_label_does_not_depend_on_size() {
    let detector = ShapeDetector::default();
    let small = detector.process_frame(&polygon_frame(
        160,
        160,
        &rotated_polygon(6, 40.0, (80, 84), 17.0),
    ));
    let large = detector.process_frame(&polygon_frame(
        240,
        240,
        &rotated_polygon(6, 80.0, (120, 124), 17.0),
    ));

    assert_eq!(small.count(ShapeLabel::Hexagon), 1, "{:?}", small.stats);
    assert_eq!(large.count(ShapeLabel::Hexagon), 1, "{:?}", large.stats);
}

#[test]
fn test_region_can_be_polygon_and_circle() {
    // A white square with a dark ring painted inside it: the square is the
    // outer contour, the ring only shows up in the Hough pass.
    let frame = ringed_square_frame(400, 60, 340, (200, 200), 100.0, 3.0);
    let result = ShapeDetector::default().process_frame(&frame);

    assert_eq!(result.count(ShapeLabel::Quadrilateral), 1, "{:?}", result.stats);
    assert_eq!(result.count(ShapeLabel::Circle), 1, "{:?}", result.stats);

    let Some(Geometry::Circle(circle)) = result
        .detections
        .iter()
        .find(|d| d.label == ShapeLabel::Circle)
        .map(|d| &d.geometry)
    else {
        panic!("expected circle geometry");
    };
    assert!((circle.center_x - 200.0).abs() <= 3.0, "{:?}", circle);
    assert!((circle.center_y - 200.0).abs() <= 3.0, "{:?}", circle);
    assert!((circle.radius - 100.0).abs() <= 6.0, "{:?}", circle);
}

#[test]
fn test_circle_annotation_colors() {
    let frame = disk_frame(400, 400, (200, 200), 100);
    let result = ShapeDetector::default().process_frame(&frame);
    assert_eq!(result.count(ShapeLabel::Circle), 1);

    // Red outline around the disk, green center marker on top of the label
    assert!(count_color(&result.image, image::Rgb([255, 0, 0])) > 500);
    let marker = (196..=204)
        .flat_map(|y| (196..=204).map(move |x| (x, y)))
        .filter(|&(x, y)| *result.image.get_pixel(x, y) == image::Rgb([0, 255, 0]))
        .count();
    assert!(marker > 20, "{} marker pixels", marker);
}

#[test]
fn test_disk_is_a_circle_only() {
    let frame = disk_frame(400, 400, (200, 200), 100);
    let result = ShapeDetector::default().process_frame(&frame);

    assert_eq!(result.count(ShapeLabel::Circle), 1);
    assert_eq!(result.detections.len(), 1);
    assert_eq!(result.stats.unclassified, 1);

    let Geometry::Circle(circle) = &result.detections[0].geometry else {
        panic!("expected circle geometry");
    };
    assert!((circle.center_x - 200.0).abs() <= 3.0);
    assert!((circle.center_y - 200.0).abs() <= 3.0);
    assert!((circle.radius - 100.0).abs() <= 3.0);
}

#[test]
fn test_blank_frame_is_unchanged() {
    let frame = blank_frame(120, 90);
    let result = ShapeDetector::default().process_frame(&frame);

    assert!(result.detections.is_empty());
    assert_eq!(result.stats.contours, 0);
    assert_eq!(result.image, frame.to_rgb8());
}

#[test]
fn test_nothing_carries_over_between_frames() {
    let detector = ShapeDetector::default();
    let busy = detector.process_frame(&square_frame(200, 200, 50, 150));
    assert!(!busy.detections.is_empty());

    let blank = detector.process_frame(&blank_frame(200, 200));
    assert!(blank.detections.is_empty());
    assert_eq!(blank.stats, Default::default());
}

#[test]
fn test_annotation_draws_outline_and_label() {
    let frame = square_frame(200, 200, 50, 150);
    let result = ShapeDetector::default().process_frame(&frame);

    assert!(count_color(&result.image, image::Rgb([0, 255, 255])) > 0);
    // The square is white, so black pixels inside it are label text
    let text_pixels = (90..110)
        .flat_map(|y| (70..130).map(move |x| (x, y)))
        .filter(|&(x, y)| *result.image.get_pixel(x, y) == BLACK)
        .count();
    assert!(text_pixels > 0);

    // Input frame is untouched
    assert_eq!(count_color(&frame.to_rgb8(), image::Rgb([0, 255, 255])), 0);
}

#[test]
fn test_pipeline_matches_detector() -> anyhow::Result<()> {
    let config = DetectorConfig::default();
    let frame = polygon_frame(300, 300, &regular_polygon(5, 100.0, (150, 160)));

    let direct = ShapeDetector::new(config.clone()).process(&frame, 0)?;
    let staged = build_standard_pipeline(&config).process(&frame, 0)?;

    assert_eq!(staged.detections, direct.detections);
    assert_eq!(staged.stats, direct.stats);
    assert_eq!(staged.image, direct.image);
    Ok(())
}

#[test]
fn test_debug_dumps_every_stage() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");
    let pipeline = build_standard_pipeline(&DetectorConfig::default()).with_debug(debug_dir.clone())?;

    pipeline.run(square_frame(200, 200, 50, 150), 7)?;

    for stage in [
        "00_input",
        "01_grayscale_conversion",
        "02_edge_detection",
        "03_contour_detection",
        "04_shape_classification",
        "05_circle_detection",
        "06_annotation",
    ] {
        let path = debug_dir.join(stage).join("00007.png");
        assert!(path.exists(), "missing {}", path.display());
    }
    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;

    let result = Pipeline::new().with_debug(dir.path().to_path_buf());
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_partial_run_stops_after_edges() -> anyhow::Result<()> {
    let pipeline = build_standard_pipeline(&DetectorConfig::default());
    assert_eq!(pipeline.step_names().len(), 6);

    let data = pipeline.run_partial(square_frame(200, 200, 50, 150), 0, 2)?;
    assert!(data.edges.is_some());
    assert!(data.detections.is_empty());
    assert!(data.get_int("edge_pixels").unwrap_or(0) > 0);
    let density = data.get_float("edge_density").unwrap_or(0.0);
    assert!(density > 0.0 && density < 0.1, "{}", density);
    Ok(())
}

#[test]
fn test_misordered_steps_fail() {
    let pipeline = Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(CircleDetectionStep {
            config: CircleConfig::default(),
        }))
        .add_step(Arc::new(EdgeDetectionStep {
            config: Default::default(),
        }));

    let Err(err) = pipeline.run(square_frame(100, 100, 20, 80), 0) else {
        panic!("circle detection without edges must fail");
    };
    let message = format!("{:#}", err);
    assert!(message.contains("Circle Detection"), "{}", message);
    assert!(message.contains("edge map"), "{}", message);
}
