//! Declarative asset catalogue: dotted TOML paths to rectangles, pixel fingerprints and templates

use super::error::{AssetError, AssetKind, AssetResult};
use crate::capture::{Fingerprint, Rect};
use image::RgbImage;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use toml::{Table, Value};

pub struct AssetCatalogue {
    root: Table,
    base_dir: PathBuf,
    templates: Mutex<HashMap<String, Arc<RgbImage>>>,
}

impl AssetCatalogue {
    /// Load a catalogue file; template paths resolve relative to its directory.
    pub fn load(path: &Path) -> AssetResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let catalogue = Self::from_toml_str(&raw, base_dir)?;
        log::info!(
            "📦 Loaded asset catalogue {} ({} top-level groups)",
            path.display(),
            catalogue.root.len()
        );
        Ok(catalogue)
    }

    pub fn from_toml_str(raw: &str, base_dir: impl Into<PathBuf>) -> AssetResult<Self> {
        let root: Table = toml::from_str(raw)?;
        Ok(Self {
            root,
            base_dir: base_dir.into(),
            templates: Mutex::new(HashMap::new()),
        })
    }

    pub fn empty() -> Self {
        Self {
            root: Table::new(),
            base_dir: PathBuf::new(),
            templates: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn contains(&self, path: &str) -> bool {
        self.node(path).is_ok()
    }

    fn node(&self, path: &str) -> AssetResult<&Table> {
        let mut table = &self.root;
        for key in path.split('.') {
            table = table
                .get(key)
                .and_then(Value::as_table)
                .ok_or_else(|| AssetError::Missing {
                    path: path.to_string(),
                    kind: AssetKind::Node,
                })?;
        }
        Ok(table)
    }

    fn attribute(&self, path: &str, kind: AssetKind) -> AssetResult<&Value> {
        self.node(path)?
            .get(kind.key())
            .ok_or_else(|| AssetError::Missing {
                path: path.to_string(),
                kind,
            })
    }

    pub fn rect(&self, path: &str) -> AssetResult<Rect> {
        parse_rect(self.attribute(path, AssetKind::Rect)?, path, AssetKind::Rect)
    }

    pub fn image_rect(&self, path: &str) -> AssetResult<Rect> {
        parse_rect(
            self.attribute(path, AssetKind::ImageRect)?,
            path,
            AssetKind::ImageRect,
        )
    }

    pub fn eigen(&self, path: &str) -> AssetResult<Vec<Fingerprint>> {
        let value = self.attribute(path, AssetKind::Eigen)?;
        let rows = value
            .as_array()
            .ok_or_else(|| malformed(path, AssetKind::Eigen, "expected a list of [x, y, color]"))?;
        rows.iter()
            .map(|row| {
                let ints = int_row(row, 3)
                    .ok_or_else(|| malformed(path, AssetKind::Eigen, "expected [x, y, color]"))?;
                Ok(Fingerprint::from_hex(ints[0], ints[1], ints[2]))
            })
            .collect()
    }

    /// Concatenated fingerprints of several nodes, in argument order
    pub fn eigens(&self, paths: &[&str]) -> AssetResult<Vec<Fingerprint>> {
        let mut all = Vec::new();
        for path in paths {
            all.extend(self.eigen(path)?);
        }
        Ok(all)
    }

    pub fn image_path(&self, path: &str) -> AssetResult<PathBuf> {
        let value = self.attribute(path, AssetKind::Image)?;
        let relative = value
            .as_str()
            .ok_or_else(|| malformed(path, AssetKind::Image, "expected a file path"))?;
        Ok(self.base_dir.join(relative))
    }

    /// Template image of a node, loaded once and cached
    pub fn template(&self, path: &str) -> AssetResult<Arc<RgbImage>> {
        let file = self.image_path(path)?;
        self.load_template(path, &file)
    }

    /// Every template listed in the node's `images` table, in key order
    pub fn templates_under(&self, path: &str) -> AssetResult<Vec<Arc<RgbImage>>> {
        let value = self.attribute(path, AssetKind::Images)?;
        let table = value
            .as_table()
            .ok_or_else(|| malformed(path, AssetKind::Images, "expected a table of file paths"))?;
        table
            .iter()
            .map(|(name, file)| {
                let relative = file.as_str().ok_or_else(|| {
                    malformed(path, AssetKind::Images, &format!("'{name}' is not a path"))
                })?;
                self.load_template(&format!("{path}.{name}"), &self.base_dir.join(relative))
            })
            .collect()
    }

    fn load_template(&self, key: &str, file: &Path) -> AssetResult<Arc<RgbImage>> {
        let mut cache = self
            .templates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(hit) = cache.get(key) {
            return Ok(hit.clone());
        }
        let image = image::open(file)
            .map_err(|source| AssetError::Image {
                path: file.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let image = Arc::new(image);
        cache.insert(key.to_string(), image.clone());
        Ok(image)
    }
}

fn malformed(path: &str, kind: AssetKind, description: &str) -> AssetError {
    AssetError::Malformed {
        path: path.to_string(),
        kind,
        description: description.to_string(),
    }
}

fn int_row(value: &Value, len: usize) -> Option<Vec<u32>> {
    let row = value.as_array()?;
    if row.len() < len {
        return None;
    }
    row.iter()
        .take(len)
        .map(|v| v.as_integer().and_then(|i| u32::try_from(i).ok()))
        .collect()
}

fn parse_rect(value: &Value, path: &str, kind: AssetKind) -> AssetResult<Rect> {
    let corners = value
        .as_array()
        .filter(|c| c.len() >= 2)
        .ok_or_else(|| malformed(path, kind, "expected [[left, top], [right, bottom]]"))?;
    let lt = int_row(&corners[0], 2).ok_or_else(|| malformed(path, kind, "bad left-top corner"))?;
    let rb =
        int_row(&corners[1], 2).ok_or_else(|| malformed(path, kind, "bad right-bottom corner"))?;
    Ok(Rect::from_corners((lt[0], lt[1]), (rb[0], rb[1])))
}

/// Collects every missing asset while a scene catalogue is being built,
/// so one run reports all of them instead of the first.
pub struct AssetResolver<'a> {
    catalogue: &'a AssetCatalogue,
    missing: RefCell<Vec<(String, AssetKind)>>,
    errors: RefCell<Vec<String>>,
}

impl<'a> AssetResolver<'a> {
    pub fn new(catalogue: &'a AssetCatalogue) -> Self {
        Self {
            catalogue,
            missing: RefCell::new(Vec::new()),
            errors: RefCell::new(Vec::new()),
        }
    }

    pub fn catalogue(&self) -> &'a AssetCatalogue {
        self.catalogue
    }

    fn record<T>(&self, result: AssetResult<T>, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(AssetError::Missing { path, kind }) => {
                self.missing.borrow_mut().push((path, kind));
                fallback
            }
            Err(other) => {
                self.errors.borrow_mut().push(other.to_string());
                fallback
            }
        }
    }

    pub fn rect(&self, path: &str) -> Rect {
        self.record_kind(path, AssetKind::Rect, self.catalogue.rect(path), Rect::default())
    }

    pub fn image_rect(&self, path: &str) -> Rect {
        self.record_kind(
            path,
            AssetKind::ImageRect,
            self.catalogue.image_rect(path),
            Rect::default(),
        )
    }

    pub fn eigens(&self, paths: &[&str]) -> Vec<Fingerprint> {
        paths
            .iter()
            .flat_map(|p| self.record_kind(p, AssetKind::Eigen, self.catalogue.eigen(p), Vec::new()))
            .collect()
    }

    pub fn template(&self, path: &str) -> Arc<RgbImage> {
        self.record_kind(
            path,
            AssetKind::Image,
            self.catalogue.template(path),
            Arc::new(RgbImage::new(1, 1)),
        )
    }

    pub fn templates_under(&self, path: &str) -> Vec<Arc<RgbImage>> {
        self.record_kind(
            path,
            AssetKind::Images,
            self.catalogue.templates_under(path),
            Vec::new(),
        )
    }

    // A missing parent node is reported against the attribute that was asked for.
    fn record_kind<T>(&self, path: &str, kind: AssetKind, result: AssetResult<T>, fallback: T) -> T {
        let result = result.map_err(|e| match e {
            AssetError::Missing { .. } => AssetError::Missing {
                path: path.to_string(),
                kind,
            },
            other => other,
        });
        self.record(result, fallback)
    }

    /// Missing `(path, kind)` pairs recorded so far
    pub fn missing(&self) -> Vec<(String, AssetKind)> {
        self.missing.borrow().clone()
    }

    pub fn finish(self) -> AssetResult<()> {
        let missing = self.missing.into_inner();
        let errors = self.errors.into_inner();
        if missing.is_empty() && errors.is_empty() {
            return Ok(());
        }
        let mut lines: Vec<String> = missing
            .into_iter()
            .map(|(path, kind)| format!("{path} ({kind})"))
            .collect();
        lines.sort();
        lines.dedup();
        lines.extend(errors);
        Err(AssetError::MissingMany { missing: lines })
    }
}
