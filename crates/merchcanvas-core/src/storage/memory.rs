//! In-memory storage implementation.

use super::{check_id, sort_newest_first, BoxFuture, DesignSummary, Storage, StorageError, StorageResult};
use crate::persistence::PersistedDesign;
use std::collections::BTreeMap;
use std::future::ready;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Designs held in process memory, for tests and sessions without a disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    designs: RwLock<BTreeMap<String, PersistedDesign>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, BTreeMap<String, PersistedDesign>>> {
        self.designs.read().map_err(|_| StorageError::Poisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, BTreeMap<String, PersistedDesign>>> {
        self.designs.write().map_err(|_| StorageError::Poisoned)
    }

    fn save_now(&self, id: &str, design: &PersistedDesign) -> StorageResult<()> {
        check_id(id)?;
        self.write()?.insert(id.to_string(), design.clone());
        Ok(())
    }

    fn load_now(&self, id: &str) -> StorageResult<PersistedDesign> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn list_now(&self) -> StorageResult<Vec<DesignSummary>> {
        let mut summaries: Vec<DesignSummary> = self
            .read()?
            .iter()
            .map(|(id, design)| design.summary(id))
            .collect();
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }
}

// Nothing here suspends, so every future is already resolved.
impl Storage for MemoryStorage {
    fn save(&self, id: &str, design: &PersistedDesign) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(ready(self.save_now(id, design)))
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PersistedDesign>> {
        Box::pin(ready(self.load_now(id)))
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let result = self.write().map(|mut designs| designs.remove(id).is_some());
        Box::pin(ready(result))
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<DesignSummary>>> {
        Box::pin(ready(self.list_now()))
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let result = self.read().map(|designs| designs.contains_key(id));
        Box::pin(ready(result))
    }
}
