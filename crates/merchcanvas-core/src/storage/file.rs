//! One JSON file per design in a local directory.

use super::{check_id, sort_newest_first, BoxFuture, DesignSummary, Storage, StorageError, StorageResult};
use crate::persistence::PersistedDesign;
use crate::scene::ViewId;
use serde::Deserialize;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Metadata read from a stored file without decoding its scenes.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    view: Option<ViewId>,
    #[serde(default)]
    version: u32,
    #[serde(default)]
    timestamp: u64,
}

/// Designs stored as `<encoded id>.json` files.
///
/// Ids are percent-encoded into file names, so every id maps to its own file
/// and listings give back the original ids.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open storage in `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|source| StorageError::Io {
            path: base_path.clone(),
            source,
        })?;
        Ok(Self { base_path })
    }

    /// Per-user designs directory.
    ///
    /// On Unix: `~/.local/share/merchcanvas/designs/`
    /// On Windows: `%LOCALAPPDATA%\merchcanvas\designs\`
    pub fn default_dir() -> StorageResult<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io {
                path: PathBuf::new(),
                source: std::io::Error::new(ErrorKind::NotFound, "no data or home directory"),
            })?;
        Ok(base.join("merchcanvas").join("designs"))
    }

    /// Open storage in [`default_dir`](Self::default_dir).
    pub fn default_location() -> StorageResult<Self> {
        Self::new(Self::default_dir()?)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn design_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", encode_id(id), EXTENSION))
    }

    fn save_now(&self, id: &str, design: &PersistedDesign) -> StorageResult<()> {
        check_id(id)?;
        let path = self.design_path(id);
        let data = serde_json::to_vec_pretty(design)?;

        // Write beside the target and rename so readers never see half a file
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, data).map_err(|source| StorageError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn load_now(&self, id: &str) -> StorageResult<PersistedDesign> {
        let path = self.design_path(id);
        let data = fs::read(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StorageError::NotFound(id.to_string()),
            _ => StorageError::Io { path, source },
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn delete_now(&self, id: &str) -> StorageResult<bool> {
        let path = self.design_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn list_now(&self) -> StorageResult<Vec<DesignSummary>> {
        let entries = fs::read_dir(&self.base_path).map_err(|source| StorageError::Io {
            path: self.base_path.clone(),
            source,
        })?;

        let mut summaries = Vec::new();
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_id) else {
                continue;
            };
            match read_header(&path) {
                Ok(header) => summaries.push(DesignSummary {
                    id,
                    product_id: header.product_id,
                    view: header.view,
                    version: header.version,
                    timestamp: header.timestamp,
                }),
                Err(e) => log::warn!("Skipping unreadable design file {}: {}", path.display(), e),
            }
        }
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }
}

fn read_header(path: &Path) -> StorageResult<Header> {
    let data = fs::read(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&data)?)
}

/// Percent-encode everything outside `[A-Za-z0-9_-]`.
fn encode_id(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{:02X}", byte);
        }
    }
    encoded
}

/// Inverse of [`encode_id`]; None for names this storage did not write.
fn decode_id(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

impl Storage for FileStorage {
    fn save(&self, id: &str, design: &PersistedDesign) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.save_now(id, design);
        Box::pin(async move { result })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PersistedDesign>> {
        let id = id.to_string();
        Box::pin(async move { self.load_now(&id) })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { self.delete_now(&id) })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<DesignSummary>>> {
        Box::pin(async move { self.list_now() })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.design_path(id);
        Box::pin(async move { Ok(path.is_file()) })
    }
}
