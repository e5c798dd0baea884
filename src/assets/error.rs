use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type AssetResult<T> = Result<T, AssetError>;

/// Which attribute of a catalogue node was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Node,
    Rect,
    Eigen,
    Image,
    ImageRect,
    Images,
}

impl AssetKind {
    /// Key used for this attribute inside a catalogue table
    pub fn key(&self) -> &'static str {
        match self {
            AssetKind::Node => "",
            AssetKind::Rect => "rect",
            AssetKind::Eigen => "eigen",
            AssetKind::Image => "image",
            AssetKind::ImageRect => "image_rect",
            AssetKind::Images => "images",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Node => write!(f, "node"),
            other => write!(f, "{}", other.key()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset '{path}' has no {kind}")]
    Missing { path: String, kind: AssetKind },

    #[error("Asset '{path}' has a malformed {kind}: {description}")]
    Malformed {
        path: String,
        kind: AssetKind,
        description: String,
    },

    #[error("{} assets are missing:\n  {}", .missing.len(), .missing.join("\n  "))]
    MissingMany { missing: Vec<String> },

    #[error("Failed to read catalogue {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse catalogue: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },

    #[error("Failed to load template image {path:?}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl AssetError {
    pub fn is_missing(&self) -> bool {
        matches!(self, AssetError::Missing { .. } | AssetError::MissingMany { .. })
    }
}
