// Delegation book and delegation list reading
//
// The book is a TOML file of known delegations grouped by category. Keys other
// than the fixed fields are rewards; `Name_T2` carries a tier, `[min, max]` a
// range and `"?1"` a chance drop:
//
//   [[Daily]]
//   Name = "日常資源開發I"
//   Level = 1
//   Duration = "00:30:00"
//   Exp = 10
//   Oil = [10, 20]
//   Cube_T2 = "?1"

use super::assets::DelegationAssets;
use super::helpers::{binarize, crop_to_ink};
use crate::capture::{Point, Rect};
use crate::vision::{
    MatchConfig, TextRecognizer, create_label_config, find_most_match, match_multi_template,
    match_single_template,
};
use image::{DynamicImage, RgbImage};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::{Table, Value};

const FIXED_FIELDS: [&str; 6] = ["Name", "Duration", "Level", "Exp", "OilCost", "TimeLimit"];
const PROTOTYPE: &str = "__Proto__";

// time limit box relative to the level label: dx, dy, width, height
const TIME_LIMIT_OFFSET: (i64, i64, u32, u32) = (-75, 132, 140, 40);
// entries this close to the bottom edge are cut off
const TIME_LIMIT_CLEARANCE: u32 = 180;
const PROCESSING_THRESHOLD: f32 = 0.9;

#[derive(Debug, Error)]
pub enum DelegationError {
    #[error("Failed to read delegation book {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid delegation book: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },

    #[error("Delegation '{name}' is missing {field}")]
    MissingField { name: String, field: &'static str },

    #[error("Invalid delegation value {key} = {value}")]
    InvalidValue { key: String, value: String },
}

pub type DelegationResult<T> = Result<T, DelegationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub rank: u8,
    pub min: u32,
    pub max: u32,
    pub chance: bool,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.rank > 0 {
            write!(f, "(T{})", self.rank)?;
        }
        if self.chance {
            write!(f, "[?]")?;
        }
        if self.min == self.max {
            write!(f, ": {}", self.min)
        } else {
            write!(f, ": {}~{}", self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub name: String,
    /// Roman numeral suffix of the name, empty when there is none
    pub rank: String,
    pub level: u32,
    /// (hours, minutes, seconds)
    pub duration: (u32, u32, u32),
    pub exp: u32,
    /// Sorted by name
    pub rewards: Vec<Resource>,
    pub oil_cost: u32,
    pub time_limit: Option<String>,
}

impl fmt::Display for Delegation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, _) = self.duration;
        write!(
            f,
            "{}(lv:{}; duration: {hours:02}:{minutes:02})",
            self.name, self.level
        )?;
        for reward in &self.rewards {
            write!(f, " {reward}")?;
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &impl fmt::Display) -> DelegationError {
    DelegationError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn amount(key: &str, value: &Value) -> DelegationResult<u32> {
    value
        .as_integer()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(key, value))
}

/// Reward from one book entry: `Oil = [10, 20]`, `Cube_T2 = "?1"`, `Coin = 30`.
pub fn parse_resource_value(key: &str, value: &Value) -> DelegationResult<Resource> {
    let (name, rank) = match key.rsplit_once('_') {
        Some((name, tier)) => match tier.strip_prefix('T').and_then(|n| n.parse().ok()) {
            Some(rank) => (name, rank),
            None => (key, 0),
        },
        None => (key, 0),
    };
    let (min, max, chance) = match value {
        Value::Integer(_) => {
            let n = amount(key, value)?;
            (n, n, false)
        }
        Value::Array(bounds) => match bounds.as_slice() {
            [low, high] => (amount(key, low)?, amount(key, high)?, false),
            _ => return Err(invalid(key, value)),
        },
        Value::String(raw) => {
            let (chance, digits) = match raw.strip_prefix('?') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let n = if digits.is_empty() {
                0
            } else {
                digits.parse().map_err(|_| invalid(key, value))?
            };
            (n, n, chance)
        }
        _ => return Err(invalid(key, value)),
    };
    Ok(Resource {
        name: name.to_string(),
        rank,
        min,
        max,
        chance,
    })
}

fn roman_rank(name: &str) -> String {
    let stem = name.trim_end_matches(['I', 'V']).len();
    name[stem..].to_string()
}

fn parse_duration(raw: &str) -> DelegationResult<(u32, u32, u32)> {
    let mut parts = [0u32; 3];
    for (slot, part) in parts.iter_mut().zip(raw.splitn(3, ':')) {
        *slot = part.trim().parse().map_err(|_| invalid("Duration", &raw))?;
    }
    Ok((parts[0], parts[1], parts[2]))
}

pub fn parse_delegation(entry: &Table) -> DelegationResult<Delegation> {
    let name = entry
        .get("Name")
        .and_then(Value::as_str)
        .ok_or_else(|| DelegationError::MissingField {
            name: "?".to_string(),
            field: "Name",
        })?;
    let required = |field: &'static str| {
        entry.get(field).ok_or_else(|| DelegationError::MissingField {
            name: name.to_string(),
            field,
        })
    };
    let duration = required("Duration")?;
    let duration = parse_duration(duration.as_str().ok_or_else(|| invalid("Duration", duration))?)?;

    let mut rewards = entry
        .iter()
        .filter(|(key, _)| !FIXED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| parse_resource_value(key, value))
        .collect::<DelegationResult<Vec<_>>>()?;
    rewards.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Delegation {
        name: name.to_string(),
        rank: roman_rank(name),
        level: amount("Level", required("Level")?)?,
        duration,
        exp: amount("Exp", required("Exp")?)?,
        rewards,
        oil_cost: entry
            .get("OilCost")
            .map(|v| amount("OilCost", v))
            .transpose()?
            .unwrap_or(0),
        time_limit: entry
            .get("TimeLimit")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Every known delegation, in category order
#[derive(Debug, Clone, Default)]
pub struct DelegationBook {
    delegations: Vec<Delegation>,
}

impl DelegationBook {
    pub fn load(path: &Path) -> DelegationResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| DelegationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let book = Self::from_toml_str(&raw)?;
        log::info!("📒 Loaded {} delegations from {}", book.len(), path.display());
        Ok(book)
    }

    pub fn from_toml_str(raw: &str) -> DelegationResult<Self> {
        let root: Table = toml::from_str(raw)?;
        let mut delegations = Vec::new();
        for (category, entries) in root.iter().filter(|(key, _)| *key != PROTOTYPE) {
            let entries = entries
                .as_array()
                .ok_or_else(|| invalid(category, &"expected [[category]] entries"))?;
            for entry in entries {
                let table = entry
                    .as_table()
                    .ok_or_else(|| invalid(category, entry))?;
                delegations.push(parse_delegation(table)?);
            }
        }
        Ok(Self { delegations })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Delegation> {
        self.delegations.iter()
    }

    pub fn len(&self) -> usize {
        self.delegations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegations.is_empty()
    }

    /// Known delegation whose name is closest to an OCR reading.
    pub fn find_most_similar(&self, text: &str) -> Option<(&Delegation, f64)> {
        let (name, score) = find_most_match(text, self.delegations.iter().map(|d| d.name.as_str()))?;
        let delegation = self.delegations.iter().find(|d| d.name == name)?;
        Some((delegation, score))
    }
}

/// `"123456"` with any noise between digits becomes `"12:34:56"`; anything
/// without exactly six digits is unreadable and becomes empty.
pub fn rectify_time_limit(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 6 {
        return String::new();
    }
    format!("{}:{}:{}", &digits[..2], &digits[2..4], &digits[4..])
}

/// One row of the delegation list as read from a screenshot
#[derive(Debug, Clone, PartialEq)]
pub struct DelegationEntry {
    pub anchor: Point,
    pub name: Option<String>,
    pub time_limit: Option<String>,
    pub processing: bool,
}

pub fn label_level_config() -> MatchConfig {
    MatchConfig {
        threshold: 0.85,
        dedup_distance: Some(50.0),
        ..create_label_config()
    }
}

/// Top-left corners of every level label, one per listed delegation.
pub fn label_level_locations(image: &RgbImage, assets: &DelegationAssets) -> Vec<Point> {
    let config = label_level_config();
    match_multi_template(
        image,
        &assets.label_level,
        config.method,
        config.threshold,
        config.dedup_distance,
    )
}

fn crop(image: &RgbImage, rect: Rect) -> Option<RgbImage> {
    if rect.right() > image.width() || rect.bottom() > image.height() || !rect.is_valid() {
        return None;
    }
    Some(image::imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
}

fn relative(anchor: Point, offset: Rect) -> Rect {
    Rect::new(anchor.x, anchor.y, offset.width, offset.height)
        .translate(i64::from(offset.x), i64::from(offset.y))
}

pub fn time_limit(image: &RgbImage, anchor: Point, text: &dyn TextRecognizer) -> Option<String> {
    let (dx, dy, width, height) = TIME_LIMIT_OFFSET;
    let rect = Rect::new(anchor.x, anchor.y, width, height).translate(dx, dy);
    if rect.y + TIME_LIMIT_CLEARANCE > image.height() {
        return None;
    }
    let shot = crop(image, rect)?;
    let ink = DynamicImage::ImageLuma8(binarize(&shot, 210)).to_rgb8();
    match text.recognize_text(&ink, Some("0123456789:")) {
        Ok(raw) => Some(rectify_time_limit(&raw)),
        Err(e) => {
            log::debug!("time limit at {anchor} unreadable: {e}");
            Some(String::new())
        }
    }
}

pub fn is_processing(image: &RgbImage, anchor: Point, assets: &DelegationAssets) -> bool {
    let template = &assets.label_processing;
    let offset = assets.processing_offset;
    let rect = relative(
        anchor,
        Rect::new(offset.x, offset.y, template.width(), template.height()),
    );
    crop(image, rect)
        .and_then(|shot| match_single_template(&shot, template))
        .is_some_and(|best| best.score > PROCESSING_THRESHOLD)
}

pub fn mission_name(
    image: &RgbImage,
    anchor: Point,
    assets: &DelegationAssets,
    text: &dyn TextRecognizer,
) -> Option<String> {
    let shot = crop(image, relative(anchor, assets.mission_name_offset))?;
    let ink = DynamicImage::ImageLuma8(crop_to_ink(&binarize(&shot, 180), 5)).to_rgb8();
    match text.recognize_text(&ink, None) {
        Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
        Ok(_) => None,
        Err(e) => {
            log::debug!("mission name at {anchor} unreadable: {e}");
            None
        }
    }
}

/// Read every listed delegation off a screenshot of the delegation list.
pub fn read_delegation_list(
    image: &RgbImage,
    assets: &DelegationAssets,
    text: &dyn TextRecognizer,
) -> Vec<DelegationEntry> {
    label_level_locations(image, assets)
        .into_iter()
        .map(|anchor| DelegationEntry {
            anchor,
            name: mission_name(image, anchor, assets, text),
            time_limit: time_limit(image, anchor, text),
            processing: is_processing(image, anchor, assets),
        })
        .collect()
}
