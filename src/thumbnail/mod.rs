//! Remote image thumbnailing.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                   ThumbnailService                     │
//! │  parse url ─► fetch (timeout) ─► resize (blocking,     │
//! │                                  timeout) ─► JPEG      │
//! └──────────────┬──────────────────────────┬──────────────┘
//!                │                          │
//!                ▼                          ▼
//!      ┌───────────────────┐      ┌───────────────────┐
//!      │ ImageSource trait │      │ ThumbnailEncoder  │
//!      │ (HttpImageSource) │      │ (image crate)     │
//!      └───────────────────┘      └───────────────────┘
//! ```
//!
//! Thumbnails are produced entirely in memory; nothing is written to disk.

mod encoder;
mod http_source;

pub use encoder::{
    is_valid_quality, ThumbnailEncoder, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
    THUMBNAIL_SIZE,
};
pub use http_source::HttpImageSource;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, error};
use url::Url;

use crate::error::{ApiError, FetchError, ImageError};

/// Default timeout for fetching the source image.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for decoding, resizing and encoding.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum size of a fetched image (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Somewhere images can be fetched from.
///
/// The production implementation is [`HttpImageSource`]; tests substitute
/// an in-memory source.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Retrieve the raw bytes behind `url`.
    async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError>;
}

/// An encoded thumbnail ready to be sent.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Bytes,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Fetches remote images and turns them into fixed-size thumbnails.
pub struct ThumbnailService<S: ImageSource> {
    source: Arc<S>,
    encoder: ThumbnailEncoder,
    fetch_timeout: Duration,
    process_timeout: Duration,
}

impl<S: ImageSource + 'static> ThumbnailService<S> {
    /// Create a service with default timeouts and quality.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            encoder: ThumbnailEncoder::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.encoder = ThumbnailEncoder::new(quality);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_process_timeout(mut self, timeout: Duration) -> Self {
        self.process_timeout = timeout;
        self
    }

    /// Fetch `raw_url` and produce its thumbnail.
    ///
    /// # Errors
    ///
    /// - [`FetchError`] if the URL is invalid or the content cannot be retrieved
    /// - [`ImageError`] if the content is not a decodable image
    pub async fn thumbnail(&self, raw_url: &str) -> Result<Thumbnail, ApiError> {
        let url = parse_image_url(raw_url)?;

        let source = tokio::time::timeout(self.fetch_timeout, self.source.fetch(&url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                timeout: self.fetch_timeout,
            })??;

        debug!(url = %url, bytes = source.len(), "resizing fetched image");

        let encoder = self.encoder.clone();
        let work = tokio::task::spawn_blocking(move || encoder.encode(&source));

        let data = tokio::time::timeout(self.process_timeout, work)
            .await
            .map_err(|_| ImageError::Timeout {
                timeout: self.process_timeout,
            })?
            .map_err(|e| {
                error!(url = %url, "thumbnail worker failed: {}", e);
                ImageError::Worker(e.to_string())
            })??;

        let (width, height) = self.encoder.dimensions();
        Ok(Thumbnail {
            data,
            content_type: "image/jpeg",
            width,
            height,
        })
    }
}

/// Parse a caller-supplied URL, accepting only absolute http(s) URLs.
pub fn parse_image_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{} ({})", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FetchError::InvalidUrl(format!(
            "{} (unsupported scheme {})",
            raw, scheme
        ))),
    }
}
