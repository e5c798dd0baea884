// Vision module - template matching, match de-duplication and fuzzy text matching.
// The OCR engine is external and plugs in through TextRecognizer.

pub mod config;
pub mod matching;
pub mod text;

#[cfg(test)]
mod tests;

pub use config::{MatchConfig, create_game_object_config, create_label_config, create_ui_config};
pub use matching::{
    MatchMethod, MatchScore, combine_similar_points, match_multi_template, match_single_template,
};
pub use text::{
    TextError, TextRecognizer, UnavailableTextRecognizer, find_most_match, similarity,
    unique_chars,
};
