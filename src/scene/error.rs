use crate::assets::AssetError;
use crate::capture::CaptureError;
use thiserror::Error;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("No transition from '{from}' to '{to}'")]
    UnreachableTransition { from: String, to: String },

    #[error("Scene '{name}' is not registered")]
    UnknownScene { name: String },

    #[error("Scene '{name}' is registered twice")]
    DuplicateScene { name: String },

    #[error("Scene '{from}' has a transition to unregistered scene '{to}'")]
    DanglingTransition { from: String, to: String },

    #[error(
        "Scene '{later}' can never be recognized: '{earlier}' is registered first and its fingerprints are a subset of '{later}'"
    )]
    ShadowedScene { earlier: String, later: String },

    #[error("Transition out of '{scene}' needs argument '{name}'")]
    MissingArgument { scene: String, name: String },

    #[error("Invalid transition argument {name}='{value}'")]
    InvalidArgument { name: String, value: String },

    #[error("Capture failed during transition: {source}")]
    Capture {
        #[from]
        source: CaptureError,
    },

    #[error("Scene asset lookup failed: {source}")]
    Asset {
        #[from]
        source: AssetError,
    },

    #[error("Blocking capture task failed: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl SceneError {
    /// Errors raised while building the graph rather than while navigating it
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SceneError::DuplicateScene { .. }
                | SceneError::DanglingTransition { .. }
                | SceneError::ShadowedScene { .. }
                | SceneError::Asset { .. }
        )
    }
}
