//! In-memory design store.

use super::{BoxFuture, DesignRecord, DesignStore, SaveRequest, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory store for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    designs: RwLock<HashMap<String, DesignRecord>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<String, DesignRecord>>> {
        self.designs
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<String, DesignRecord>>> {
        self.designs
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }
}

impl DesignStore for MemoryStore {
    fn save(&self, request: SaveRequest) -> BoxFuture<'_, StorageResult<String>> {
        Box::pin(async move {
            let mut designs = self.write()?;
            let id = match &request.id {
                Some(id) if designs.contains_key(id) => id.clone(),
                Some(id) => return Err(StorageError::NotFound(id.clone())),
                None => Uuid::new_v4().to_string(),
            };
            designs.insert(id.clone(), request.into_record(id.clone()));
            Ok(id)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<DesignRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            self.read()?
                .get(&id)
                .cloned()
                .ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.write()?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move { Ok(self.read()?.keys().cloned().collect()) })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.read()?.contains_key(&id)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    fn request(id: Option<&str>, title: &str) -> SaveRequest {
        SaveRequest {
            id: id.map(str::to_string),
            title: title.to_string(),
            canvas_data: "{}".to_string(),
            thumbnail: "data:image/png;base64,".to_string(),
        }
    }

    #[test]
    fn test_create_and_load() {
        let store = MemoryStore::new();
        let id = block_on(store.save(request(None, "Poster"))).unwrap();
        let loaded = block_on(store.load(&id)).unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.title, "Poster");
    }

    #[test]
    fn test_update_existing() {
        let store = MemoryStore::new();
        let id = block_on(store.save(request(None, "Draft"))).unwrap();
        let updated = block_on(store.save(request(Some(&id), "Final"))).unwrap();
        assert_eq!(updated, id);
        assert_eq!(block_on(store.load(&id)).unwrap().title, "Final");
        assert_eq!(block_on(store.list()).unwrap().len(), 1);
    }

    #[test]
    fn test_update_unknown_fails() {
        let store = MemoryStore::new();
        let result = block_on(store.save(request(Some("missing"), "x")));
        assert!(matches!(result, Err(StorageError::NotFound(id)) if id == "missing"));
        assert!(block_on(store.list()).unwrap().is_empty());
    }

    #[test]
    fn test_not_found() {
        let store = MemoryStore::new();
        let result = block_on(store.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let store = MemoryStore::new();
        let id = block_on(store.save(request(None, "x"))).unwrap();
        assert!(block_on(store.exists(&id)).unwrap());
        block_on(store.delete(&id)).unwrap();
        assert!(!block_on(store.exists(&id)).unwrap());
        // Deleting twice is fine
        block_on(store.delete(&id)).unwrap();
    }
}
