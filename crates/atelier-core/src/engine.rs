//! Rendering engine boundary.
//!
//! The session drives an engine through [`RenderEngine`]; the engine owns
//! painting, filter math and pointer interaction. [`HeadlessEngine`] is a
//! windowless implementation that paints backgrounds only.

use crate::background::{Background, GradientKind, GradientStop};
use crate::document::DesignDocument;
use crate::shapes::{Image, SerializableColor};
use image::{ImageBuffer, Rgba, RgbaImage};
use kurbo::Point;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Filter failed: {0}")]
    FilterFailed(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Raster output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpg",
        }
    }
}

/// Raster export request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub format: RasterFormat,
    /// Output pixels per document unit.
    pub scale: f64,
}

impl RasterOptions {
    pub fn png(scale: f64) -> Self {
        Self {
            format: RasterFormat::Png,
            scale,
        }
    }
}

/// Freehand input settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub color: SerializableColor,
    pub width: f64,
}

/// Largest raster edge, in pixels, [`HeadlessEngine::rasterize`] will allocate.
pub const MAX_RASTER_DIMENSION: f64 = 16384.0;

/// Capabilities the editor needs from a rendering engine.
pub trait RenderEngine {
    /// Repaint the scene from `document`.
    fn request_render(&mut self, document: &DesignDocument) -> RenderResult<()>;

    /// Re-run the filter pipeline of an image after its filter list changed.
    fn apply_filters(&mut self, image: &Image) -> RenderResult<()>;

    /// Enter freehand input with the given brush, or leave it with `None`.
    fn set_drawing_mode(&mut self, brush: Option<&BrushSettings>);

    /// Apply a viewport zoom factor. Affects display only.
    fn set_zoom(&mut self, zoom: f64);

    /// Encode the scene as a raster image. Never mutates the document.
    fn rasterize(&self, document: &DesignDocument, options: RasterOptions) -> RenderResult<Vec<u8>>;
}

/// Windowless engine for tests and server-side thumbnails.
///
/// Counts render and filter requests and can be told to fail, which is how
/// render-failure handling is exercised.
#[derive(Debug)]
pub struct HeadlessEngine {
    renders: usize,
    filter_passes: usize,
    drawing: Option<BrushSettings>,
    zoom: f64,
    fail_renders: bool,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self {
            renders: 0,
            filter_passes: 0,
            drawing: None,
            zoom: 1.0,
            fail_renders: false,
        }
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful render requests.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn filter_passes(&self) -> usize {
        self.filter_passes
    }

    /// Active brush, if in drawing mode.
    pub fn drawing_mode(&self) -> Option<&BrushSettings> {
        self.drawing.as_ref()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Make subsequent render and filter requests fail.
    pub fn set_fail_renders(&mut self, fail: bool) {
        self.fail_renders = fail;
    }
}

impl RenderEngine for HeadlessEngine {
    fn request_render(&mut self, document: &DesignDocument) -> RenderResult<()> {
        if self.fail_renders {
            return Err(RendererError::RenderFailed("render target unavailable".to_string()));
        }
        self.renders += 1;
        log::debug!("Rendered {} object(s)", document.len());
        Ok(())
    }

    fn apply_filters(&mut self, image: &Image) -> RenderResult<()> {
        if self.fail_renders {
            return Err(RendererError::FilterFailed(format!(
                "cannot filter image {}",
                image.id
            )));
        }
        self.filter_passes += 1;
        Ok(())
    }

    fn set_drawing_mode(&mut self, brush: Option<&BrushSettings>) {
        self.drawing = brush.copied();
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    fn rasterize(&self, document: &DesignDocument, options: RasterOptions) -> RenderResult<Vec<u8>> {
        let scale = if options.scale.is_finite() && options.scale > 0.0 {
            options.scale
        } else {
            1.0
        };
        let width = (document.width * scale).round().max(1.0);
        let height = (document.height * scale).round().max(1.0);
        if width > MAX_RASTER_DIMENSION || height > MAX_RASTER_DIMENSION {
            return Err(RendererError::Encode(format!(
                "{width}x{height} exceeds the {MAX_RASTER_DIMENSION}px raster limit"
            )));
        }
        let (width, height) = (width as u32, height as u32);
        let pixels = paint_background(&document.background, width, height, scale);

        match options.format {
            RasterFormat::Png => encode_png(pixels.as_raw(), width, height),
            RasterFormat::Jpeg => encode_jpeg(pixels),
        }
    }
}

fn paint_background(background: &Background, width: u32, height: u32, scale: f64) -> RgbaImage {
    match background {
        Background::Solid { color } => {
            ImageBuffer::from_pixel(width, height, Rgba([color.r, color.g, color.b, color.a]))
        }
        Background::Gradient(gradient) => ImageBuffer::from_fn(width, height, |x, y| {
            // Sample in document units
            let p = Point::new((x as f64 + 0.5) / scale, (y as f64 + 0.5) / scale);
            let t = match gradient.kind {
                GradientKind::Linear { start, end } => {
                    let axis = end - start;
                    let len_sq = axis.hypot2();
                    if len_sq <= f64::EPSILON {
                        0.0
                    } else {
                        (p - start).dot(axis) / len_sq
                    }
                }
                GradientKind::Radial {
                    center,
                    start_radius,
                    end_radius,
                } => {
                    let span = end_radius - start_radius;
                    if span.abs() <= f64::EPSILON {
                        0.0
                    } else {
                        ((p - center).hypot() - start_radius) / span
                    }
                }
            };
            let c = sample_stops(&gradient.stops, t.clamp(0.0, 1.0));
            Rgba([c.r, c.g, c.b, c.a])
        }),
        // Image backgrounds are composited by a full renderer
        Background::Image(_) => ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255])),
    }
}

fn sample_stops(stops: &[GradientStop], t: f64) -> SerializableColor {
    let Some(first) = stops.first() else {
        return SerializableColor::transparent();
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let f = if span <= f64::EPSILON { 1.0 } else { (t - a.offset) / span };
            let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
            return SerializableColor::new(
                lerp(a.color.r, b.color.r),
                lerp(a.color.g, b.color.g),
                lerp(a.color.b, b.color.b),
                lerp(a.color.a, b.color.a),
            );
        }
    }
    stops.last().map_or(first.color, |s| s.color)
}

/// Encode RGBA pixel data to PNG bytes.
fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RendererError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

fn encode_jpeg(pixels: RgbaImage) -> RenderResult<Vec<u8>> {
    const QUALITY: u8 = 90;
    let rgb = image::DynamicImage::ImageRgba8(pixels).to_rgb8();
    let mut jpeg_data = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_data, QUALITY)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ExtendedColorType::Rgb8)
        .map_err(|e| RendererError::Encode(format!("JPEG: {e}")))?;
    Ok(jpeg_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Gradient;
    use crate::shapes::ImageFormat;

    fn decode(bytes: &[u8]) -> RgbaImage {
        image::load_from_memory(bytes).unwrap().to_rgba8()
    }

    #[test]
    fn test_png_matches_scaled_canvas() {
        let engine = HeadlessEngine::new();
        let doc = DesignDocument::new(800.0, 600.0);
        let bytes = engine.rasterize(&doc, RasterOptions::png(0.2)).unwrap();
        assert_eq!(ImageFormat::from_magic_bytes(&bytes), Some(ImageFormat::Png));
        let img = decode(&bytes);
        assert_eq!(img.dimensions(), (160, 120));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_gradient_runs_between_stops() {
        let engine = HeadlessEngine::new();
        let doc = DesignDocument::new(100.0, 100.0)
            .with_background(Background::Gradient(Gradient::linear_preset(100.0, 100.0)));
        let img = decode(&engine.rasterize(&doc, RasterOptions::png(1.0)).unwrap());
        let top_left = img.get_pixel(0, 0);
        let bottom_right = img.get_pixel(99, 99);
        // #6366f1 at the start, #ec4899 at the end
        assert!(top_left[0] < 0x70 && top_left[2] > 0xe0);
        assert!(bottom_right[0] > 0xe0 && bottom_right[2] < 0xa0);
    }

    #[test]
    fn test_oversized_raster_is_rejected() {
        let engine = HeadlessEngine::new();
        let doc = DesignDocument::new(800.0, 600.0);
        let result = engine.rasterize(&doc, RasterOptions::png(1e5));
        assert!(matches!(result, Err(RendererError::Encode(_))));

        let edge = engine.rasterize(&DesignDocument::new(16384.0, 1.0), RasterOptions::png(1.0));
        assert!(edge.is_ok());
    }

    #[test]
    fn test_jpeg_output() {
        let engine = HeadlessEngine::new();
        let doc = DesignDocument::new(32.0, 16.0);
        let options = RasterOptions {
            format: RasterFormat::Jpeg,
            scale: 1.0,
        };
        let bytes = engine.rasterize(&doc, options).unwrap();
        assert_eq!(ImageFormat::from_magic_bytes(&bytes), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_failing_engine() {
        let mut engine = HeadlessEngine::new();
        let doc = DesignDocument::new(10.0, 10.0);
        engine.request_render(&doc).unwrap();
        engine.set_fail_renders(true);
        assert!(matches!(
            engine.request_render(&doc),
            Err(RendererError::RenderFailed(_))
        ));
        assert_eq!(engine.render_count(), 1);
    }

    #[test]
    fn test_sample_stops_edges() {
        let stops = Gradient::linear_preset(1.0, 1.0).stops;
        assert_eq!(sample_stops(&stops, 0.0), stops[0].color);
        assert_eq!(sample_stops(&stops, 1.0), stops[1].color);
        assert_eq!(sample_stops(&[], 0.5), SerializableColor::transparent());
    }
}
