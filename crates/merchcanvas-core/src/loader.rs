//! Asynchronous bitmap loading for image objects.
//!
//! Loaders only resolve natural pixel dimensions; decoding for display is the
//! renderer's business. A [`PendingImage`] ticket records which view and
//! session a load was started for, so late results can be recognised and
//! dropped instead of landing in the wrong scene.

use crate::error::{SceneError, SceneResult};
use crate::objects::ImageDimensions;
use crate::scene::{ColorId, ViewId};
use crate::storage::BoxFuture;
use std::collections::HashMap;
use std::io::Cursor;

/// Resolves an image source to its natural dimensions.
pub trait ImageLoader {
    /// Load `src` far enough to know its pixel size.
    fn load(&self, src: &str) -> BoxFuture<'_, SceneResult<ImageDimensions>>;
}

/// An image load in flight, tied to the scene and session it was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub(crate) src: String,
    pub(crate) view: ViewId,
    pub(crate) color: ColorId,
    pub(crate) epoch: u64,
}

impl PendingImage {
    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn view(&self) -> &str {
        &self.view
    }
}

/// Read dimensions from encoded image bytes (PNG, JPEG, WebP).
pub fn dimensions_from_bytes(data: &[u8]) -> SceneResult<ImageDimensions> {
    let reader = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| SceneError::ImageLoad(e.to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| SceneError::ImageLoad(e.to_string()))?;
    Ok(ImageDimensions::new(width, height))
}

/// Loader over image bytes already in memory (uploads, pasted data), keyed by source.
#[derive(Debug, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under a source reference.
    pub fn insert(&mut self, src: impl Into<String>, data: Vec<u8>) {
        self.images.insert(src.into(), data);
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, src: &str) -> BoxFuture<'_, SceneResult<ImageDimensions>> {
        let src = src.to_string();
        Box::pin(async move {
            let data = self
                .images
                .get(&src)
                .ok_or_else(|| SceneError::ImageLoad(format!("Unknown image source: {}", src)))?;
            dimensions_from_bytes(data)
        })
    }
}

/// Loader reading image headers from the local filesystem.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FileImageLoader;

#[cfg(not(target_arch = "wasm32"))]
impl ImageLoader for FileImageLoader {
    fn load(&self, src: &str) -> BoxFuture<'_, SceneResult<ImageDimensions>> {
        let path = std::path::PathBuf::from(src);
        Box::pin(async move {
            let (width, height) = image::image_dimensions(&path).map_err(|e| {
                SceneError::ImageLoad(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Ok(ImageDimensions::new(width, height))
        })
    }
}
