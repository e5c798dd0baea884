//! Tests for geometry and the in-memory frame context

use super::*;
use image::Rgb;
use std::time::Duration;

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

#[test]
fn test_rect_from_corners() {
    let rect = Rect::from_corners((10, 20), (30, 60));
    assert_eq!(rect, Rect::new(10, 20, 20, 40));
    assert_eq!(rect.center(), Point::new(20, 40));
}

#[test]
fn test_rect_clips_to_screen_bounds() {
    let rect = Rect::new(1000, 700, 200, 200).clip_to_screen(1080, 720);
    assert_eq!(rect.x, 1000);
    assert_eq!(rect.width, 80);
    assert_eq!(rect.y, 700);
    assert_eq!(rect.height, 20);
}

#[test]
fn test_random_point_stays_inside() {
    let rect = Rect::new(5, 5, 3, 4);
    for _ in 0..200 {
        assert!(rect.contains_point(rect.random_point()));
    }
    let empty = Rect::new(7, 9, 0, 0);
    assert_eq!(empty.random_point(), Point::new(7, 9));
}

#[test]
fn test_rgb_from_hex_and_distance() {
    assert_eq!(rgb_from_hex(0xFF8000), Rgb([255, 128, 0]));
    assert_eq!(color_distance(&Rgb([10, 20, 30]), &Rgb([12, 15, 30])), 5);
}

#[test]
fn test_frame_sample_and_bounds() {
    let ctx = FrameContext::solid(4, 4, RED);
    assert_eq!(ctx.screen_dimensions(), (4, 4));
    assert_eq!(ctx.sample_pixel(Point::new(3, 3)).unwrap(), RED);
    assert!(matches!(
        ctx.sample_pixel(Point::new(4, 0)),
        Err(CaptureError::OutOfBounds { x: 4, .. })
    ));
    assert!(ctx.click(Point::new(9, 9)).is_err());
    assert!(ctx.clicks().is_empty(), "Out of bounds click must not be recorded");
}

#[test]
fn test_frame_click_hook_repaints() {
    let ctx = FrameContext::solid(2, 2, RED);
    ctx.on_click(|_, frame| frame.put_pixel(0, 0, BLUE)).unwrap();

    ctx.click(Point::new(1, 1)).unwrap();

    assert_eq!(ctx.sample_pixel(Point::new(0, 0)).unwrap(), BLUE);
    assert_eq!(ctx.clicks(), vec![Point::new(1, 1)]);
}

#[test]
fn test_frame_screenshot_crops() {
    let ctx = FrameContext::solid(10, 10, RED);
    ctx.fill_rect(Rect::new(2, 2, 3, 3), BLUE).unwrap();

    let shot = ctx.screenshot(Rect::new(2, 2, 3, 3)).unwrap();
    assert_eq!(shot.dimensions(), (3, 3));
    assert!(shot.pixels().all(|p| *p == BLUE));

    assert!(matches!(
        ctx.screenshot(Rect::new(0, 0, 0, 5)),
        Err(CaptureError::EmptyRegion { .. })
    ));
}

#[test]
fn test_frame_records_drag() {
    let ctx = FrameContext::solid(10, 10, RED);
    ctx.drag(Point::new(1, 1), Point::new(8, 8), Duration::from_millis(300))
        .unwrap();
    assert_eq!(
        ctx.events(),
        vec![InputEvent::Drag {
            from: Point::new(1, 1),
            to: Point::new(8, 8),
            duration: Duration::from_millis(300)
        }]
    );
}
