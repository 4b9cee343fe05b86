//! Thumbnail encoder.
//!
//! Decodes arbitrary image bytes, scales them to cover a fixed square and
//! crops the overflow, then re-encodes as JPEG.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;

use crate::error::ImageError;

/// Thumbnail edge length in pixels.
pub const THUMBNAIL_SIZE: u32 = 50;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Resizes source images into fixed-size JPEG thumbnails.
#[derive(Debug, Clone)]
pub struct ThumbnailEncoder {
    width: u32,
    height: u32,
    quality: u8,
}

impl Default for ThumbnailEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ThumbnailEncoder {
    /// Create an encoder producing `THUMBNAIL_SIZE`² JPEGs at `quality`.
    pub fn new(quality: u8) -> Self {
        Self {
            width: THUMBNAIL_SIZE,
            height: THUMBNAIL_SIZE,
            quality: quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Decode `source`, resize it and encode the result as JPEG.
    ///
    /// The format is sniffed from the content, not taken from any URL or
    /// header.
    pub fn encode(&self, source: &[u8]) -> Result<Bytes, ImageError> {
        let reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(ImageError::Decode("unrecognized image format".to_string()));
        }

        let img = reader
            .decode()
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        // JPEG has no alpha channel
        let thumbnail = img
            .resize_to_fill(self.width, self.height, FilterType::Lanczos3)
            .to_rgb8();

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, self.quality);
        encoder
            .encode_image(&thumbnail)
            .map_err(|e| ImageError::Encode(e.to_string()))?;

        Ok(Bytes::from(output))
    }
}

/// Check if a quality value is in the valid range.
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}
