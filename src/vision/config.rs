//! Configuration for image matching operations

use super::matching::MatchMethod;

#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Score threshold, interpreted per `method`
    pub threshold: f32,
    pub method: MatchMethod,
    /// Hits closer than this many pixels are merged (`None` keeps every hit)
    pub dedup_distance: Option<f64>,
    /// Per-channel tolerance for pixel fingerprints
    pub pixel_tolerance: u8,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            method: MatchMethod::CorrelationNormed,
            dedup_distance: None,
            pixel_tolerance: 0,
        }
    }
}

/// Configuration preset for UI elements (buttons, toggles)
pub fn create_ui_config() -> MatchConfig {
    MatchConfig {
        threshold: 0.999,
        method: MatchMethod::CorrelationNormed,
        dedup_distance: None,
        pixel_tolerance: 0,
    }
}

/// Configuration preset for map objects (enemy fleets)
pub fn create_game_object_config() -> MatchConfig {
    MatchConfig {
        threshold: 0.1,
        method: MatchMethod::SquaredDifferenceNormed,
        dedup_distance: Some(50.0),
        pixel_tolerance: 0,
    }
}

/// Configuration preset for repeated labels in list views
pub fn create_label_config() -> MatchConfig {
    MatchConfig {
        threshold: 0.9,
        method: MatchMethod::CorrelationNormed,
        dedup_distance: Some(20.0),
        pixel_tolerance: 0,
    }
}
