//! Tests for template matching, point de-duplication and phrase matching

use super::*;
use crate::capture::Point;
use image::{Rgb, RgbImage};

/// Noise-free background with a distinctive 3x3 cross painted at each origin
fn scene_with_crosses(origins: &[(u32, u32)]) -> (RgbImage, RgbImage) {
    let mut image = RgbImage::from_fn(40, 40, |x, y| Rgb([(x * 3) as u8, (y * 5) as u8, 60]));
    let mut template = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
    for (dx, dy) in [(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)] {
        template.put_pixel(dx, dy, Rgb([255, 255, 255]));
    }
    for &(ox, oy) in origins {
        for y in 0..3 {
            for x in 0..3 {
                image.put_pixel(ox + x, oy + y, *template.get_pixel(x, y));
            }
        }
    }
    (image, template)
}

#[test]
fn test_combine_similar_points_two_clusters() {
    let points = [Point::new(10, 10), Point::new(12, 11), Point::new(100, 100)];
    let combined = combine_similar_points(&points, 5.0);
    assert_eq!(combined, vec![Point::new(10, 10), Point::new(100, 100)]);
}

#[test]
fn test_combine_similar_points_sorts_before_grouping() {
    let points = [Point::new(100, 100), Point::new(12, 11), Point::new(10, 10)];
    let combined = combine_similar_points(&points, 5.0);
    assert_eq!(combined, vec![Point::new(10, 10), Point::new(100, 100)]);
}

#[test]
fn test_combine_similar_points_empty() {
    assert!(combine_similar_points(&[], 5.0).is_empty());
}

#[test]
fn test_match_single_template_finds_location() {
    let (image, template) = scene_with_crosses(&[(20, 7)]);
    let best = match_single_template(&image, &template).unwrap();
    assert_eq!(best.location, Point::new(20, 7));
    assert!(best.score > 0.99, "score was {}", best.score);
}

#[test]
fn test_match_single_template_too_large() {
    let image = RgbImage::new(4, 4);
    let template = RgbImage::new(5, 2);
    assert!(match_single_template(&image, &template).is_none());
}

#[test]
fn test_match_multi_template_with_dedup() {
    let (image, template) = scene_with_crosses(&[(5, 5), (30, 30)]);

    let hits = match_multi_template(
        &image,
        &template,
        MatchMethod::SquaredDifferenceNormed,
        0.01,
        Some(10.0),
    );
    assert_eq!(hits, vec![Point::new(5, 5), Point::new(30, 30)]);
}

#[test]
fn test_similarity_bounds() {
    assert_eq!(similarity("", ""), 1.0);
    assert_eq!(similarity("abc", "abc"), 1.0);
    assert_eq!(similarity("abc", "xyz"), 0.0);
    assert!((similarity("abcd", "abxd") - 0.75).abs() < 1e-9);
}

#[test]
fn test_find_most_match_prefers_first_on_tie() {
    let phrases = ["ab", "ba", "zz"];
    let (best, score) = find_most_match("a", phrases).unwrap();
    assert_eq!(best, "ab");
    assert!((score - 2.0 / 3.0).abs() < 1e-9);

    assert!(find_most_match("a", Vec::<&str>::new()).is_none());
}

#[test]
fn test_find_most_match_picks_closest_title() {
    let titles = ["Tora! Tora! Tora!", "Coral Sea Debut", "Midway Showdown"];
    let (best, _) = find_most_match("Cora1 Sea Debvt", titles).unwrap();
    assert_eq!(best, "Coral Sea Debut");
}

#[test]
fn test_unique_chars_sorted() {
    assert_eq!(unique_chars(["bca", "ab"]), "abc");
}

#[test]
fn test_unavailable_recognizer() {
    let ocr = UnavailableTextRecognizer;
    assert!(matches!(
        ocr.recognize_text(&RgbImage::new(1, 1), None),
        Err(TextError::Unavailable)
    ));
}

#[test]
fn test_presets() {
    assert_eq!(MatchConfig::default().method, MatchMethod::CorrelationNormed);
    let enemies = create_game_object_config();
    assert!(enemies.method.accepts(0.05, enemies.threshold));
    assert!(!enemies.method.accepts(0.5, enemies.threshold));
    assert!(create_ui_config().threshold > create_label_config().threshold);
}
