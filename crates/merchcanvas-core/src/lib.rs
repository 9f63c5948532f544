//! MerchCanvas Core Library
//!
//! Platform-agnostic scene engine for the print-on-demand design editor:
//! design objects, per-view scenes, selection, undo history, print-area
//! constraints and persistence. Rendering is left to the host.

pub mod config;
pub mod constraint;
pub mod error;
pub mod history;
pub mod loader;
pub mod objects;
pub mod persistence;
pub mod render;
pub mod scene;
pub mod selection;
pub mod storage;
pub mod store;

#[cfg(test)]
mod test_support;

pub use config::{EditorConfig, SceneKeying, StackingPolicy};
pub use error::{SceneError, SceneResult};
pub use history::History;
pub use loader::{ImageLoader, MemoryImageLoader, PendingImage};
pub use objects::{
    BasePatch, ImageDimensions, ObjectId, ObjectKind, ObjectPatch, SceneObject, ShapeKind,
};
pub use persistence::PersistedDesign;
pub use render::{ReadModel, Renderer, RendererEvent, Transform};
pub use scene::{PrintArea, ProductAsset, ProductData, Scene};
pub use selection::{HandleRegistry, SelectionCoordinator};
pub use storage::{DesignSummary, MemoryStorage, Storage, StorageError};
pub use store::{ReorderDirection, SceneStore};

#[cfg(not(target_arch = "wasm32"))]
pub use loader::FileImageLoader;
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
