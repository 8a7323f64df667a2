//! Image shape for embedding raster images.

use super::{Placement, ShapeId, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        // RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A named image filter with its parameters. Filter math is the engine's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageFilter {
    Grayscale,
    Sepia,
    Invert,
    Blur { amount: f64 },
    /// Brightness offset in `[-1, 1]`.
    Brightness { amount: f64 },
}

impl ImageFilter {
    pub fn name(&self) -> &'static str {
        match self {
            ImageFilter::Grayscale => "grayscale",
            ImageFilter::Sepia => "sepia",
            ImageFilter::Invert => "invert",
            ImageFilter::Blur { .. } => "blur",
            ImageFilter::Brightness { .. } => "brightness",
        }
    }
}

/// One-click filter presets. Applying a preset replaces the filter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPreset {
    Grayscale,
    Sepia,
    Invert,
    Blur,
}

impl FilterPreset {
    pub const BLUR_AMOUNT: f64 = 0.5;

    pub fn filter(&self) -> ImageFilter {
        match self {
            FilterPreset::Grayscale => ImageFilter::Grayscale,
            FilterPreset::Sepia => ImageFilter::Sepia,
            FilterPreset::Invert => ImageFilter::Invert,
            FilterPreset::Blur => ImageFilter::Blur {
                amount: Self::BLUR_AMOUNT,
            },
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "grayscale" => Some(FilterPreset::Grayscale),
            "sepia" => Some(FilterPreset::Sepia),
            "invert" => Some(FilterPreset::Invert),
            "blur" => Some(FilterPreset::Blur),
            _ => None,
        }
    }
}

/// An image object that displays a raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ShapeId,
    pub placement: Placement,
    /// Original image width in pixels (the base width).
    pub source_width: u32,
    /// Original image height in pixels (the base height).
    pub source_height: u32,
    pub format: ImageFormat,
    /// Encoded image bytes as base64 so documents stay plain JSON.
    pub data_base64: String,
    /// Filters in application order.
    #[serde(default)]
    pub filters: Vec<ImageFilter>,
    /// Style properties (stroke used for optional border).
    pub style: ShapeStyle,
}

impl Image {
    /// Create a new image object from encoded image bytes.
    pub fn new(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
        format: ImageFormat,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            placement: Placement::at(position),
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
            filters: Vec::new(),
            style: ShapeStyle {
                fill_color: None,
                stroke_color: None,
                stroke_width: 0.0,
                opacity: 1.0,
            },
        }
    }

    /// Uniform scale that fits the image inside `max_width` x `max_height`.
    pub fn fit_scale(&self, max_width: f64, max_height: f64) -> f64 {
        if self.source_width == 0 || self.source_height == 0 {
            return 1.0;
        }
        (max_width / self.source_width as f64).min(max_height / self.source_height as f64)
    }

    /// Get the raw image data (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }

    /// Data URL usable as an `<img>` source.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data_base64)
    }

    /// Get the size of the image data in bytes.
    pub fn data_size(&self) -> usize {
        // Base64 encodes 3 bytes as 4 characters
        self.data_base64.len() * 3 / 4
    }

    /// Replace any brightness filter with a new one at the end of the list.
    pub fn set_brightness(&mut self, amount: f64) {
        self.filters
            .retain(|f| !matches!(f, ImageFilter::Brightness { .. }));
        self.filters.push(ImageFilter::Brightness {
            amount: amount.clamp(-1.0, 1.0),
        });
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn base_size(&self) -> Size {
        Size::new(self.source_width as f64, self.source_height as f64)
    }

    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn placement_mut(&mut self) -> &mut Placement {
        &mut self.placement
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
