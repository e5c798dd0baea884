//! OCR seam and fuzzy phrase matching

use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("No text recognizer is configured")]
    Unavailable,

    #[error("Text recognition failed: {description}")]
    Failed { description: String },
}

/// OCR engine. Implementations are external; `charset` restricts the output alphabet.
pub trait TextRecognizer: Send + Sync {
    fn recognize_text(&self, image: &RgbImage, charset: Option<&str>) -> Result<String, TextError>;
}

/// Default recognizer used when no OCR engine is wired in
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableTextRecognizer;

impl TextRecognizer for UnavailableTextRecognizer {
    fn recognize_text(&self, _image: &RgbImage, _charset: Option<&str>) -> Result<String, TextError> {
        Err(TextError::Unavailable)
    }
}

/// Normalized indel similarity in `[0, 1]`: `2 * LCS / (|a| + |b|)`, over chars.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    // single-row LCS table
    let mut row = vec![0usize; b.len() + 1];
    for ca in &a {
        let mut diagonal = 0;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    2.0 * row[b.len()] as f64 / total as f64
}

/// Phrase most similar to `text`, with its score. Ties keep the earliest phrase.
pub fn find_most_match<'a, I>(text: &str, phrases: I) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for phrase in phrases {
        let score = similarity(text, phrase);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((phrase, score));
        }
    }
    best
}

/// Sorted unique characters of the given phrases, for restricting an OCR charset.
pub fn unique_chars<'a, I>(phrases: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut chars: Vec<char> = phrases.into_iter().flat_map(str::chars).collect();
    chars.sort_unstable();
    chars.dedup();
    chars.into_iter().collect()
}
