//! Atelier Core Library
//!
//! Document model, snapshot history, clipboard and persistence for the
//! Atelier design editor. Rendering is delegated to a [`RenderEngine`].

pub mod background;
pub mod clipboard;
pub mod config;
pub mod document;
pub mod engine;
pub mod export;
pub mod history;
pub mod image_loader;
pub mod properties;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod shortcuts;
pub mod storage;
pub mod tools;

pub use background::{Background, BackgroundImage, Gradient, GradientKind, GradientStop};
pub use clipboard::Clipboard;
pub use config::{ConfigError, EditorConfig};
pub use document::{DesignDocument, DocumentError, ZOrder};
pub use engine::{BrushSettings, HeadlessEngine, RasterFormat, RasterOptions, RenderEngine, RendererError};
pub use export::{Download, DownloadFormat, ExportError};
pub use history::{History, HistoryState, Snapshot, SnapshotError};
pub use image_loader::{DecodedImage, ImageLoadError, decode_image};
pub use properties::{Attribute, AttributeError, Dimension, FilterEdit, TextToggle};
pub use selection::{LayerEntry, PropertyPanel, SelectionTracker};
pub use session::{EditorError, EditorEvent, EditorSession, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeKind, ShapeStyle};
pub use shortcuts::{KeyPress, ShortcutAction, ShortcutRegistry};
pub use storage::{DesignRecord, DesignStore, MemoryStore, SaveRequest, SaveResponse, StorageError};
pub use tools::{BrushMode, ShapePreset, TextPreset, ToolKind, ToolManager};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
