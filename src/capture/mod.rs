// Capture module - screen sampling and synthetic input
// The real backend (window capture, emulator bridge) lives outside this crate;
// everything here talks to it through the CaptureContext trait.

pub mod error;
pub mod frame;
pub mod geometry;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{CaptureError, CaptureResult};
pub use frame::FrameContext;
pub use geometry::{Fingerprint, Point, Rect, color_distance, rgb_from_hex};
pub use types::{CaptureContext, InputEvent};
