// Capture context: the only way the automation observes or touches the game
use super::error::{CaptureError, CaptureResult};
use super::geometry::{Point, Rect};
use image::{Rgb, RgbImage};
use std::time::Duration;

/// Synthetic input emitted by an action
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Click(Point),
    Drag {
        from: Point,
        to: Point,
        duration: Duration,
    },
}

// Trait defining what a capture backend must provide (window capture, emulator bridge, replay).
// Calls are blocking; async callers run them on the blocking pool.
pub trait CaptureContext: Send + Sync {
    fn screen_dimensions(&self) -> (u32, u32);

    fn sample_pixel(&self, point: Point) -> CaptureResult<Rgb<u8>>;

    fn screenshot(&self, rect: Rect) -> CaptureResult<RgbImage>;

    fn click(&self, point: Point) -> CaptureResult<()>;

    fn drag(&self, from: Point, to: Point, duration: Duration) -> CaptureResult<()>;

    fn device_name(&self) -> &str {
        "capture"
    }

    fn full_screenshot(&self) -> CaptureResult<RgbImage> {
        let (w, h) = self.screen_dimensions();
        self.screenshot(Rect::full_screen(w, h))
    }

    /// Reject points outside the screen before they reach the backend.
    fn check_bounds(&self, point: Point) -> CaptureResult<()> {
        let (width, height) = self.screen_dimensions();
        if point.x >= width || point.y >= height {
            return Err(CaptureError::OutOfBounds {
                x: point.x,
                y: point.y,
                width,
                height,
            });
        }
        Ok(())
    }
}
