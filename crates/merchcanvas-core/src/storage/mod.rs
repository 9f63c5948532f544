//! Storage backends for saved designs.
//!
//! Backends keep [`PersistedDesign`]s under a caller-chosen design id and can
//! list what they hold as [`DesignSummary`] rows, newest first, without the
//! caller loading every scene.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::persistence::PersistedDesign;
use crate::scene::ViewId;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Design not found: {0}")]
    NotFound(String),
    #[error("Invalid design id: {0:?}")]
    InvalidId(String),
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Stored design is not readable: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// One row of a saved-designs listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSummary {
    pub id: String,
    pub product_id: Option<String>,
    /// Active view when the design was saved.
    pub view: Option<ViewId>,
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Trait for design storage backends.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a design, replacing any design with the same id.
    fn save(&self, id: &str, design: &PersistedDesign) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a design.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PersistedDesign>>;

    /// Delete a design. Returns false if there was nothing to delete.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// Summaries of all saved designs, newest first.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<DesignSummary>>>;

    /// Check if a design exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for design storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save a design, replacing any design with the same id.
    fn save(&self, id: &str, design: &PersistedDesign) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a design.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PersistedDesign>>;

    /// Delete a design. Returns false if there was nothing to delete.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// Summaries of all saved designs, newest first.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<DesignSummary>>>;

    /// Check if a design exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Reject ids that cannot name a design.
pub(crate) fn check_id(id: &str) -> StorageResult<()> {
    if id.trim().is_empty() {
        return Err(StorageError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Newest first; ties by id so listings are stable.
pub(crate) fn sort_newest_first(summaries: &mut [DesignSummary]) {
    summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
}
