//! Read-only predicates deciding whether a scene is on screen

use crate::capture::{CaptureContext, Fingerprint, Rect, color_distance};
use crate::vision::match_single_template;
use image::RgbImage;
use std::fmt;
use std::sync::Arc;

pub type Predicate = Arc<dyn Fn(&dyn CaptureContext) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Recognizer {
    /// Every fingerprint matches within `tolerance` per channel
    Pixels {
        points: Vec<Fingerprint>,
        tolerance: u8,
    },
    /// At least `min_ratio` of the fingerprints match
    Fraction {
        points: Vec<Fingerprint>,
        tolerance: u8,
        min_ratio: f32,
    },
    /// Normalized correlation of the captured `rect` against `template` reaches `threshold`
    Template {
        rect: Rect,
        template: Arc<RgbImage>,
        threshold: f32,
    },
    AllOf(Vec<Recognizer>),
    AnyOf(Vec<Recognizer>),
    Not(Box<Recognizer>),
    Custom(Predicate),
    Never,
}

impl Recognizer {
    pub fn pixels(points: Vec<Fingerprint>) -> Self {
        Recognizer::Pixels {
            points,
            tolerance: 0,
        }
    }

    pub fn pixels_with_tolerance(points: Vec<Fingerprint>, tolerance: u8) -> Self {
        Recognizer::Pixels { points, tolerance }
    }

    pub fn template(rect: Rect, template: Arc<RgbImage>, threshold: f32) -> Self {
        Recognizer::Template {
            rect,
            template,
            threshold,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&dyn CaptureContext) -> bool + Send + Sync + 'static,
    {
        Recognizer::Custom(Arc::new(f))
    }

    pub fn and(self, other: Recognizer) -> Self {
        match self {
            Recognizer::AllOf(mut all) => {
                all.push(other);
                Recognizer::AllOf(all)
            }
            first => Recognizer::AllOf(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Recognizer::Not(Box::new(self))
    }

    /// Evaluate against the capture context. Sampling failures count as a mismatch.
    pub fn matches(&self, ctx: &dyn CaptureContext) -> bool {
        match self {
            Recognizer::Pixels { points, tolerance } => {
                compare_with_pixels(ctx, points, *tolerance)
            }
            Recognizer::Fraction {
                points,
                tolerance,
                min_ratio,
            } => match_ratio(ctx, points, *tolerance) >= *min_ratio,
            Recognizer::Template {
                rect,
                template,
                threshold,
            } => compare_with_template(ctx, *rect, template, *threshold),
            Recognizer::AllOf(all) => all.iter().all(|r| r.matches(ctx)),
            Recognizer::AnyOf(any) => any.iter().any(|r| r.matches(ctx)),
            Recognizer::Not(inner) => !inner.matches(ctx),
            Recognizer::Custom(f) => f(ctx),
            Recognizer::Never => false,
        }
    }

    /// Fingerprints that must all match (at their tolerance) whenever this recognizer is true.
    pub fn necessary_pixels(&self) -> Vec<(Fingerprint, u8)> {
        match self {
            Recognizer::Pixels { points, tolerance } => {
                points.iter().map(|p| (*p, *tolerance)).collect()
            }
            Recognizer::AllOf(all) => all.iter().flat_map(|r| r.necessary_pixels()).collect(),
            _ => Vec::new(),
        }
    }

    /// True when this is a plain fingerprint check that holds whenever `later` holds,
    /// i.e. registering `self` first would hide `later` from recognition.
    pub fn shadows(&self, later: &Recognizer) -> bool {
        let Recognizer::Pixels { points, tolerance } = self else {
            return false;
        };
        let required = later.necessary_pixels();
        if required.is_empty() {
            return false;
        }
        points.iter().all(|mine| {
            required.iter().any(|(theirs, their_tolerance)| {
                theirs.point == mine.point
                    && color_distance(&theirs.color, &mine.color) as u16 + *their_tolerance as u16
                        <= *tolerance as u16
            })
        })
    }
}

impl fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recognizer::Pixels { points, tolerance } => {
                write!(f, "Pixels({} points, tolerance={})", points.len(), tolerance)
            }
            Recognizer::Fraction {
                points, min_ratio, ..
            } => write!(f, "Fraction({} points, min_ratio={})", points.len(), min_ratio),
            Recognizer::Template {
                rect, threshold, ..
            } => write!(f, "Template({rect}, threshold={threshold})"),
            Recognizer::AllOf(all) => f.debug_tuple("AllOf").field(all).finish(),
            Recognizer::AnyOf(any) => f.debug_tuple("AnyOf").field(any).finish(),
            Recognizer::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Recognizer::Custom(_) => write!(f, "Custom"),
            Recognizer::Never => write!(f, "Never"),
        }
    }
}

pub fn compare_with_pixels(ctx: &dyn CaptureContext, points: &[Fingerprint], tolerance: u8) -> bool {
    points.iter().all(|fp| match ctx.sample_pixel(fp.point) {
        Ok(actual) => fp.matches(&actual, tolerance),
        Err(e) => {
            log::debug!("pixel sample at {} failed: {e}", fp.point);
            false
        }
    })
}

/// Fraction of fingerprints that match; an empty set counts as fully matching.
pub fn match_ratio(ctx: &dyn CaptureContext, points: &[Fingerprint], tolerance: u8) -> f32 {
    if points.is_empty() {
        return 1.0;
    }
    let hits = points
        .iter()
        .filter(|fp| {
            ctx.sample_pixel(fp.point)
                .map(|actual| fp.matches(&actual, tolerance))
                .unwrap_or(false)
        })
        .count();
    hits as f32 / points.len() as f32
}

pub fn compare_with_template(
    ctx: &dyn CaptureContext,
    rect: Rect,
    template: &RgbImage,
    threshold: f32,
) -> bool {
    let shot = match ctx.screenshot(rect) {
        Ok(shot) => shot,
        Err(e) => {
            log::debug!("screenshot of {rect} failed: {e}");
            return false;
        }
    };
    match_single_template(&shot, template)
        .map(|best| best.score >= threshold)
        .unwrap_or(false)
}
