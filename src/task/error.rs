use super::config::ConfigError;
use super::gate::GateError;
use crate::assets::AssetError;
use crate::capture::CaptureError;
use crate::scene::SceneError;
use crate::vision::TextError;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for task steps and task management.
pub type TaskResult<T> = Result<T, TaskError>;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task cancelled")]
    Cancelled,

    #[error("Scene error: {source}")]
    Scene {
        #[from]
        source: SceneError,
    },

    #[error("Capture error: {source}")]
    Capture {
        #[from]
        source: CaptureError,
    },

    #[error("Unknown gate '{name}'")]
    UnknownGate { name: String },

    #[error("Asset error: {source}")]
    Asset {
        #[from]
        source: AssetError,
    },

    #[error("Config error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("{what} unavailable after {attempts} attempts: {last_error}")]
    RecognitionUnavailable {
        what: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Unknown task '{name}'")]
    UnknownTask { name: String },

    #[error("Task '{name}' is registered twice")]
    DuplicateTask { name: String },

    #[error("Text recognition failed: {source}")]
    Text {
        #[from]
        source: TextError,
    },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to save image {path:?}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Blocking capture task failed: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl From<GateError> for TaskError {
    fn from(e: GateError) -> Self {
        match e {
            GateError::Cancelled => TaskError::Cancelled,
            GateError::UnknownGate { name } => TaskError::UnknownGate { name },
        }
    }
}

impl TaskError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }

    /// Recognition input was not ready; steps treat this as "not yet".
    pub fn is_recognition_unavailable(&self) -> bool {
        matches!(self, TaskError::RecognitionUnavailable { .. })
    }
}
