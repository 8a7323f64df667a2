//! Editor configuration.

use crate::clipboard::DEFAULT_PASTE_OFFSET;
use crate::export::DEFAULT_DOWNLOAD_NAME;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for an editing session. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub background_color: SerializableColor,
    /// Snapshots retained by the undo timeline.
    pub history_limit: usize,
    pub paste_offset: f64,
    /// Scale of the PNG thumbnail stored with saved designs.
    pub thumbnail_scale: f64,
    pub default_title: String,
    pub download_name: String,
    pub brush_color: SerializableColor,
    pub brush_width: f64,
    pub eraser_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            background_color: SerializableColor::white(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            paste_offset: DEFAULT_PASTE_OFFSET,
            thumbnail_scale: 0.2,
            default_title: "Untitled Design".to_string(),
            download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
            brush_color: SerializableColor::black(),
            brush_width: 5.0,
            eraser_width: 20.0,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config and sanitise it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load config from a file, or the defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Replace out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;

        if !positive(self.canvas_width) || !positive(self.canvas_height) {
            self.canvas_width = defaults.canvas_width;
            self.canvas_height = defaults.canvas_height;
        }
        self.history_limit = self.history_limit.max(1);
        if !non_negative(self.paste_offset) {
            self.paste_offset = defaults.paste_offset;
        }
        if !positive(self.thumbnail_scale) {
            self.thumbnail_scale = defaults.thumbnail_scale;
        }
        if !positive(self.brush_width) {
            self.brush_width = defaults.brush_width;
        }
        if !positive(self.eraser_width) {
            self.eraser_width = defaults.eraser_width;
        }
        if self.download_name.trim().is_empty() {
            self.download_name = defaults.download_name;
        }
        self
    }
}
