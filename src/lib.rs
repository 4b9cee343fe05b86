//! # thumbpatch
//!
//! A small HTTP API exposing three operations: session login, JSON Patch
//! application and remote image thumbnailing.
//!
//! ## Features
//!
//! - **Single-session login**: HS256 session tokens; each login replaces the previous token
//! - **JSON Patch**: RFC 6902 add/remove/replace/move/copy/test applied in order
//! - **Thumbnails**: fetch a remote image and return a 50×50 JPEG, built in memory
//! - **Explicit timeouts**: remote fetch and image processing are both bounded
//!
//! ## Architecture
//!
//! - [`session`] - Token signing and the single-slot session store
//! - [`patch`] - JSON Patch application
//! - [`thumbnail`] - Image fetching and resizing
//! - [`server`] - Axum-based HTTP server, authorization gate and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use thumbpatch::{create_router, AppState, HttpImageSource, RouterConfig};
//! use thumbpatch::{SessionService, ThumbnailService, TokenSigner};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sessions = SessionService::new(TokenSigner::random(None));
//!     let source = HttpImageSource::new(Duration::from_secs(10), 10 * 1024 * 1024).unwrap();
//!     let thumbnails = ThumbnailService::new(source);
//!
//!     let router = create_router(AppState::new(sessions, thumbnails), RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod patch;
pub mod server;
pub mod session;
pub mod thumbnail;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, FetchError, ImageError, PatchError, TokenError, ValidationError};
pub use patch::{apply_operations, apply_patch_request};
pub use server::{
    auth_middleware, create_router, health_handler, login_handler, patch_handler,
    thumbnail_handler, AppState, AuthError, AuthGate, BearerToken, HealthResponse, LoginResponse,
    PatchResponse, Payload, RouterConfig, PATCH_REJECTION, THUMBNAIL_REJECTION,
};
pub use session::{
    AuthFailure, Credentials, IssuedSession, SessionClaims, SessionService, SessionStore,
    TokenSigner,
};
pub use thumbnail::{
    parse_image_url, HttpImageSource, ImageSource, Thumbnail, ThumbnailEncoder, ThumbnailService,
    THUMBNAIL_SIZE,
};
