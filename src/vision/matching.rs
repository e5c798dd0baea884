//! Template matching and point de-duplication over screenshots

use crate::capture::Point;
use image::{GrayImage, RgbImage};
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Normalized cross correlation, higher is better (1.0 = identical)
    CorrelationNormed,
    /// Normalized squared difference, lower is better (0.0 = identical)
    SquaredDifferenceNormed,
}

impl MatchMethod {
    fn imageproc_method(&self) -> MatchTemplateMethod {
        match self {
            MatchMethod::CorrelationNormed => MatchTemplateMethod::CrossCorrelationNormalized,
            MatchMethod::SquaredDifferenceNormed => {
                MatchTemplateMethod::SumOfSquaredErrorsNormalized
            }
        }
    }

    pub fn accepts(&self, score: f32, threshold: f32) -> bool {
        match self {
            MatchMethod::CorrelationNormed => score >= threshold,
            MatchMethod::SquaredDifferenceNormed => score <= threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub location: Point,
    pub score: f32,
}

fn to_gray_pair(image: &RgbImage, template: &RgbImage) -> Option<(GrayImage, GrayImage)> {
    if template.width() == 0
        || template.height() == 0
        || template.width() > image.width()
        || template.height() > image.height()
    {
        return None;
    }
    Some((
        image::imageops::grayscale(image),
        image::imageops::grayscale(template),
    ))
}

/// Best normalized-correlation match of `template` in `image`.
/// Returns `None` when the template does not fit inside the image.
pub fn match_single_template(image: &RgbImage, template: &RgbImage) -> Option<MatchScore> {
    let (image_gray, template_gray) = to_gray_pair(image, template)?;
    let result = match_template(
        &image_gray,
        &template_gray,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );
    let extremes = find_extremes(&result);
    let (x, y) = extremes.max_value_location;
    Some(MatchScore {
        location: Point::new(x, y),
        score: extremes.max_value,
    })
}

/// Every top-left location where `template` scores past `threshold`, row-major order.
/// With `dedup` set, nearby hits are collapsed by [`combine_similar_points`].
pub fn match_multi_template(
    image: &RgbImage,
    template: &RgbImage,
    method: MatchMethod,
    threshold: f32,
    dedup: Option<f64>,
) -> Vec<Point> {
    let Some((image_gray, template_gray)) = to_gray_pair(image, template) else {
        return Vec::new();
    };
    let result = match_template(&image_gray, &template_gray, method.imageproc_method());

    let hits: Vec<Point> = result
        .enumerate_pixels()
        .filter(|(_, _, score)| method.accepts(score[0], threshold))
        .map(|(x, y, _)| Point::new(x, y))
        .collect();

    log::debug!(
        "🔍 match_multi_template: {} raw hits (method={:?}, threshold={:.3})",
        hits.len(),
        method,
        threshold
    );

    match dedup {
        Some(distance) if distance > 0.0 && !hits.is_empty() => {
            combine_similar_points(&hits, distance)
        }
        _ => hits,
    }
}

/// Collapse points closer than `threshold` into one representative each.
/// Each point joins the first `(x, y)`-sorted point within reach of it.
pub fn combine_similar_points(points: &[Point], threshold: f64) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort();

    let mut representatives: Vec<usize> = sorted
        .iter()
        .map(|p| {
            sorted
                .iter()
                .position(|q| q.distance(p) < threshold)
                .unwrap_or(0)
        })
        .collect();
    representatives.sort_unstable();
    representatives.dedup();

    representatives.into_iter().map(|i| sorted[i]).collect()
}
