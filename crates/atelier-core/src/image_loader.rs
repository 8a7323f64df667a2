//! Asynchronous image decoding for uploads.
//!
//! Decoding runs as its own future so an upload never blocks editing; the
//! session installs the result with a single continuation.

use crate::shapes::ImageFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("image data is empty")]
    Empty,
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("failed to decode image: {0}")]
    Decode(String),
}

/// An uploaded image that decoded successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Original encoded bytes, stored as-is in the document.
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Detect the format and pixel size of encoded image bytes.
pub async fn decode_image(bytes: Vec<u8>) -> Result<DecodedImage, ImageLoadError> {
    if bytes.is_empty() {
        return Err(ImageLoadError::Empty);
    }
    let format = ImageFormat::from_magic_bytes(&bytes).ok_or(ImageLoadError::UnsupportedFormat)?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| {
        log::warn!("Image decode failed: {}", e);
        ImageLoadError::Decode(e.to_string())
    })?;
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(ImageLoadError::Decode("image has no pixels".to_string()));
    }
    log::debug!("Decoded {:?} image {}x{}", format, width, height);
    Ok(DecodedImage {
        bytes,
        format,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let decoded = block_on(decode_image(png_bytes(4, 3))).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!((decoded.width, decoded.height), (4, 3));
    }

    #[test]
    fn test_rejects_unknown_and_truncated() {
        assert!(matches!(
            block_on(decode_image(Vec::new())),
            Err(ImageLoadError::Empty)
        ));
        assert!(matches!(
            block_on(decode_image(b"GIF89a....".to_vec())),
            Err(ImageLoadError::UnsupportedFormat)
        ));
        let mut truncated = png_bytes(4, 3);
        truncated.truncate(12);
        assert!(matches!(
            block_on(decode_image(truncated)),
            Err(ImageLoadError::Decode(_))
        ));
    }
}
