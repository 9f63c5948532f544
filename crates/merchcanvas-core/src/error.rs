//! Error types for scene operations.

use crate::scene::{ColorId, ViewId};
use crate::storage::StorageError;
use thiserror::Error;

/// Scene engine errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("No product asset for color '{color}' and view '{view}'")]
    AssetNotFound { color: ColorId, view: ViewId },
    #[error("Image failed to load: {0}")]
    ImageLoad(String),
    #[error("Image result for view '{view}' no longer applies")]
    StaleImage { view: ViewId },
    #[error("Malformed design state: {0}")]
    MalformedState(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
