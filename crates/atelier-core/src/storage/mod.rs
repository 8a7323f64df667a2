//! Design persistence backends.
//!
//! A save carries the title, the serialized document and a thumbnail. Saves
//! without an id create a record; saves with an id update an existing one.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Design not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A stored design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRecord {
    pub id: String,
    pub title: String,
    /// Serialized document (the snapshot format).
    pub canvas_data: String,
    /// PNG thumbnail as a data URL.
    pub thumbnail: String,
}

/// Body of a save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    /// Existing design to update; `None` creates a new design.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub canvas_data: String,
    pub thumbnail: String,
}

impl SaveRequest {
    /// Record this request describes once stored under `id`.
    pub(crate) fn into_record(self, id: String) -> DesignRecord {
        DesignRecord {
            id,
            title: self.title,
            canvas_data: self.canvas_data,
            thumbnail: self.thumbnail,
        }
    }
}

/// Reply to a save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn saved(design_id: String) -> Self {
        Self {
            success: true,
            design_id: Some(design_id),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            design_id: None,
            error: Some(error.into()),
        }
    }
}

impl From<StorageResult<String>> for SaveResponse {
    fn from(result: StorageResult<String>) -> Self {
        match result {
            Ok(id) => SaveResponse::saved(id),
            Err(e) => SaveResponse::failed(e.to_string()),
        }
    }
}

/// Trait for design storage backends.
pub trait DesignStore: Send + Sync {
    /// Create or update a design, resolving to its id.
    fn save(&self, request: SaveRequest) -> BoxFuture<'_, StorageResult<String>>;

    /// Load a design.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<DesignRecord>>;

    /// Delete a design. Unknown ids are ignored.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all design IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a design exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Minimal executor for driving storage futures in tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
