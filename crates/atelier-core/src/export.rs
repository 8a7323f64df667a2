//! Downloadable artifacts and thumbnails.

use crate::document::DesignDocument;
use crate::engine::{RasterFormat, RasterOptions, RenderEngine, RendererError};
use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0} export is not supported yet")]
    Unsupported(&'static str),
    #[error("render failed: {0}")]
    Render(#[from] RendererError),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Download formats offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Png,
    Json,
    Pdf,
}

impl DownloadFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(DownloadFormat::Png),
            "json" => Some(DownloadFormat::Json),
            "pdf" => Some(DownloadFormat::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DownloadFormat::Png => "png",
            DownloadFormat::Json => "json",
            DownloadFormat::Pdf => "pdf",
        }
    }
}

/// A file ready to hand to the browser or write to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Build a download of `document`. Rendering is read-only.
pub fn download(
    document: &DesignDocument,
    engine: &impl RenderEngine,
    format: DownloadFormat,
    title: &str,
) -> Result<Download, ExportError> {
    let stem = file_stem(title);
    match format {
        DownloadFormat::Png => {
            let bytes = engine.rasterize(document, RasterOptions::png(1.0))?;
            Ok(Download {
                filename: format!("{stem}.png"),
                mime_type: RasterFormat::Png.mime_type(),
                bytes,
            })
        }
        DownloadFormat::Json => Ok(Download {
            filename: format!("{stem}.json"),
            mime_type: "application/json",
            bytes: document.to_json_pretty()?.into_bytes(),
        }),
        DownloadFormat::Pdf => Err(ExportError::Unsupported("PDF")),
    }
}

/// PNG thumbnail as a `data:` URL.
pub fn thumbnail_data_url(
    document: &DesignDocument,
    engine: &impl RenderEngine,
    scale: f64,
) -> Result<String, ExportError> {
    let bytes = engine.rasterize(document, RasterOptions::png(scale))?;
    Ok(format!(
        "data:{};base64,{}",
        RasterFormat::Png.mime_type(),
        STANDARD.encode(bytes)
    ))
}

/// Download name for a title: trimmed, path separators replaced, and
/// "design" when nothing usable is left.
pub fn file_stem(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        DEFAULT_DOWNLOAD_NAME.to_string()
    } else {
        cleaned
    }
}

/// Stem used when the design has no title.
pub const DEFAULT_DOWNLOAD_NAME: &str = "design";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HeadlessEngine;
    use crate::shapes::ImageFormat;

    #[test]
    fn test_png_download() {
        let doc = DesignDocument::new(80.0, 60.0);
        let download = download(&doc, &HeadlessEngine::new(), DownloadFormat::Png, "Poster").unwrap();
        assert_eq!(download.filename, "Poster.png");
        assert_eq!(download.mime_type, "image/png");
        assert_eq!(ImageFormat::from_magic_bytes(&download.bytes), Some(ImageFormat::Png));
    }

    #[test]
    fn test_json_download_reloads() {
        let doc = DesignDocument::new(80.0, 60.0);
        let download = download(&doc, &HeadlessEngine::new(), DownloadFormat::Json, "").unwrap();
        assert_eq!(download.filename, "design.json");
        let text = String::from_utf8(download.bytes).unwrap();
        assert_eq!(DesignDocument::from_json(&text).unwrap(), doc);
    }

    #[test]
    fn test_pdf_unsupported() {
        let doc = DesignDocument::new(80.0, 60.0);
        let result = download(&doc, &HeadlessEngine::new(), DownloadFormat::Pdf, "x");
        assert!(matches!(result, Err(ExportError::Unsupported("PDF"))));
    }

    #[test]
    fn test_thumbnail_data_url() {
        let doc = DesignDocument::new(800.0, 600.0);
        let url = thumbnail_data_url(&doc, &HeadlessEngine::new(), 0.2).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("  My/Design "), "My_Design");
        assert_eq!(file_stem("   "), "design");
        assert_eq!(DownloadFormat::parse("PDF"), Some(DownloadFormat::Pdf));
    }
}
