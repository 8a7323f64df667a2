//! File-based design store for native platforms.

use super::{BoxFuture, DesignRecord, DesignStore, SaveRequest, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stores each design as a JSON file in a directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a store in the default location.
    ///
    /// On Unix: `~/.local/share/atelier/designs/`
    /// On Windows: `%LOCALAPPDATA%\atelier\designs\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("atelier").join("designs"))
    }

    /// File path for a design id; ids are sanitized to be safe filenames.
    fn design_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

fn write_record(path: &Path, record: &DesignRecord) -> StorageResult<()> {
    let json = serde_json::to_string(record)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    fs::write(path, json)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

impl DesignStore for FileStore {
    fn save(&self, request: SaveRequest) -> BoxFuture<'_, StorageResult<String>> {
        Box::pin(async move {
            let id = match &request.id {
                Some(id) if self.design_path(id).exists() => id.clone(),
                Some(id) => return Err(StorageError::NotFound(id.clone())),
                None => Uuid::new_v4().to_string(),
            };
            let path = self.design_path(&id);
            write_record(&path, &request.into_record(id.clone()))?;
            log::debug!("Saved design {} to {}", id, path.display());
            Ok(id)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<DesignRecord>> {
        let path = self.design_path(id);
        let id_owned = id.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id_owned));
            }

            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;

            serde_json::from_str(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.design_path(id);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            Ok(entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.design_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}
