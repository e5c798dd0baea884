//! In-memory capture context backed by a single frame, for screenshot replay and tests

use super::error::{CaptureError, CaptureResult};
use super::geometry::{Point, Rect};
use super::types::{CaptureContext, InputEvent};
use image::{Rgb, RgbImage};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

type ClickHook = Box<dyn Fn(Point, &mut RgbImage) + Send + Sync>;

pub struct FrameContext {
    name: String,
    frame: Mutex<RgbImage>,
    events: Mutex<Vec<InputEvent>>,
    click_hooks: Mutex<Vec<ClickHook>>,
}

impl FrameContext {
    pub fn new(frame: RgbImage) -> Self {
        Self {
            name: "frame".to_string(),
            frame: Mutex::new(frame),
            events: Mutex::new(Vec::new()),
            click_hooks: Mutex::new(Vec::new()),
        }
    }

    /// Frame filled with a single color
    pub fn solid(width: u32, height: u32, color: Rgb<u8>) -> Self {
        Self::new(RgbImage::from_pixel(width, height, color))
    }

    /// Load a PNG/JPEG screenshot from disk
    pub fn open(path: &Path) -> CaptureResult<Self> {
        let frame = image::open(path)?.to_rgb8();
        log::info!(
            "🖼️ Loaded frame {} ({}x{})",
            path.display(),
            frame.width(),
            frame.height()
        );
        let mut ctx = Self::new(frame);
        ctx.name = path.display().to_string();
        Ok(ctx)
    }

    pub fn set_frame(&self, frame: RgbImage) -> CaptureResult<()> {
        *lock(&self.frame)? = frame;
        Ok(())
    }

    /// Mutate the current frame in place
    pub fn paint<F: FnOnce(&mut RgbImage)>(&self, f: F) -> CaptureResult<()> {
        let mut frame = lock(&self.frame)?;
        f(&mut frame);
        Ok(())
    }

    pub fn fill_rect(&self, rect: Rect, color: Rgb<u8>) -> CaptureResult<()> {
        self.paint(|frame| {
            let clipped = rect.clip_to_screen(frame.width(), frame.height());
            for y in clipped.y..clipped.bottom() {
                for x in clipped.x..clipped.right() {
                    frame.put_pixel(x, y, color);
                }
            }
        })
    }

    /// Register a reaction to clicks; hooks run in registration order.
    pub fn on_click<F>(&self, hook: F) -> CaptureResult<()>
    where
        F: Fn(Point, &mut RgbImage) + Send + Sync + 'static,
    {
        lock(&self.click_hooks)?.push(Box::new(hook));
        Ok(())
    }

    pub fn events(&self) -> Vec<InputEvent> {
        lock(&self.events).map(|e| e.clone()).unwrap_or_default()
    }

    pub fn clicks(&self) -> Vec<Point> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::Click(p) => Some(p),
                InputEvent::Drag { .. } => None,
            })
            .collect()
    }

    fn record(&self, event: InputEvent) -> CaptureResult<()> {
        lock(&self.events)?.push(event);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> CaptureResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|e| CaptureError::Unavailable {
        description: format!("frame lock poisoned: {e}"),
    })
}

impl CaptureContext for FrameContext {
    fn screen_dimensions(&self) -> (u32, u32) {
        lock(&self.frame)
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0))
    }

    fn sample_pixel(&self, point: Point) -> CaptureResult<Rgb<u8>> {
        let frame = lock(&self.frame)?;
        frame
            .get_pixel_checked(point.x, point.y)
            .copied()
            .ok_or(CaptureError::OutOfBounds {
                x: point.x,
                y: point.y,
                width: frame.width(),
                height: frame.height(),
            })
    }

    fn screenshot(&self, rect: Rect) -> CaptureResult<RgbImage> {
        let frame = lock(&self.frame)?;
        let clipped = rect.clip_to_screen(frame.width(), frame.height());
        if !clipped.is_valid() {
            return Err(CaptureError::EmptyRegion {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            });
        }
        Ok(image::imageops::crop_imm(
            &*frame,
            clipped.x,
            clipped.y,
            clipped.width,
            clipped.height,
        )
        .to_image())
    }

    fn click(&self, point: Point) -> CaptureResult<()> {
        self.check_bounds(point)?;
        self.record(InputEvent::Click(point))?;
        let hooks = lock(&self.click_hooks)?;
        let mut frame = lock(&self.frame)?;
        for hook in hooks.iter() {
            hook(point, &mut frame);
        }
        log::debug!("👆 click {point} on {}", self.name);
        Ok(())
    }

    fn drag(&self, from: Point, to: Point, duration: Duration) -> CaptureResult<()> {
        self.check_bounds(from)?;
        self.check_bounds(to)?;
        log::debug!("👉 drag {from} -> {to} ({duration:?}) on {}", self.name);
        self.record(InputEvent::Drag { from, to, duration })
    }

    fn device_name(&self) -> &str {
        &self.name
    }
}
