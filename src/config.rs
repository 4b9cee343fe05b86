//! Configuration management.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 3000)
//! - `TOKEN_SECRET` - HMAC secret for session tokens (default: random per process)
//! - `TOKEN_TTL` - Session token lifetime in seconds (default: no expiry)
//! - `FETCH_TIMEOUT` - Remote image fetch timeout in seconds (default: 10)
//! - `PROCESS_TIMEOUT` - Image resize timeout in seconds (default: 10)
//! - `MAX_IMAGE_BYTES` - Largest accepted remote image (default: 10 MiB)
//! - `THUMBNAIL_QUALITY` - JPEG quality of thumbnails (default: 80)
//! - `CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::time::Duration;

use clap::Parser;

use crate::thumbnail::{
    is_valid_quality, DEFAULT_FETCH_TIMEOUT, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_IMAGE_BYTES,
    DEFAULT_PROCESS_TIMEOUT,
};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Longest accepted session token lifetime (ten years).
pub const MAX_TOKEN_TTL: u64 = 10 * 365 * 24 * 60 * 60;

// =============================================================================
// CLI Arguments
// =============================================================================

/// thumbpatch - session login, JSON Patch and remote thumbnails over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "thumbpatch")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    // =========================================================================
    // Session Configuration
    // =========================================================================
    /// Secret key for signing session tokens.
    ///
    /// If not provided, a random secret is generated at startup and tokens
    /// do not survive a restart.
    #[arg(long, env = "TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    /// Session token lifetime in seconds.
    ///
    /// If not provided, tokens stay valid until the next login replaces them.
    #[arg(long, env = "TOKEN_TTL")]
    pub token_ttl: Option<u64>,

    // =========================================================================
    // Thumbnail Configuration
    // =========================================================================
    /// Timeout in seconds for fetching a remote image.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs(), env = "FETCH_TIMEOUT")]
    pub fetch_timeout: u64,

    /// Timeout in seconds for decoding and resizing an image.
    #[arg(long, default_value_t = DEFAULT_PROCESS_TIMEOUT.as_secs(), env = "PROCESS_TIMEOUT")]
    pub process_timeout: u64,

    /// Largest remote image accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_IMAGE_BYTES, env = "MAX_IMAGE_BYTES")]
    pub max_image_bytes: usize,

    /// JPEG quality of generated thumbnails (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "THUMBNAIL_QUALITY")]
    pub thumbnail_quality: u8,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if matches!(self.token_secret.as_deref(), Some("")) {
            return Err(
                "Token secret must not be empty. Unset TOKEN_SECRET to use a random secret"
                    .to_string(),
            );
        }

        match self.token_ttl {
            Some(0) => return Err("token_ttl must be greater than 0".to_string()),
            Some(ttl) if ttl > MAX_TOKEN_TTL => {
                return Err(format!("token_ttl must be at most {} seconds", MAX_TOKEN_TTL));
            }
            _ => {}
        }

        if self.fetch_timeout == 0 {
            return Err("fetch_timeout must be greater than 0".to_string());
        }
        if self.process_timeout == 0 {
            return Err("process_timeout must be greater than 0".to_string());
        }

        if self.max_image_bytes == 0 {
            return Err("max_image_bytes must be greater than 0".to_string());
        }

        if !is_valid_quality(self.thumbnail_quality) {
            return Err("thumbnail_quality must be between 1 and 100".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> Option<Duration> {
        self.token_ttl.map(Duration::from_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout)
    }
}

// =============================================================================
// Tests
// =============================================================================
