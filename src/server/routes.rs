//! Router configuration.
//!
//! This module defines the HTTP routes and applies middleware for the
//! authorization gate, CORS and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /health               - Health check (public)
//! /api/login            - Issue session token (public)
//! /api/patch            - JSON Patch (gated, "Invalid Token.")
//! /api/getThumbnail     - Remote thumbnail (gated, "Invalid Token Sent")
//! ```
//!
//! # Example
//!
//! ```ignore
//! use thumbpatch::server::routes::{create_router, RouterConfig};
//!
//! let state = AppState::new(sessions, thumbnails);
//! let router = create_router(state, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{auth_middleware, AuthGate, PATCH_REJECTION, THUMBNAIL_REJECTION};
use super::handlers::{health_handler, login_handler, patch_handler, thumbnail_handler, AppState};
use crate::thumbnail::ImageSource;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default CORS allows any origin and tracing is enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The patch and thumbnail routes each get their own authorization gate so
/// that rejections carry the route's own message. Both gates share the
/// session service held in `state`.
pub fn create_router<S>(state: AppState<S>, config: RouterConfig) -> Router
where
    S: ImageSource + 'static,
{
    let patch_gate = AuthGate::new(state.sessions.clone(), PATCH_REJECTION);
    let thumbnail_gate = AuthGate::new(state.sessions.clone(), THUMBNAIL_REJECTION);

    let patch_routes = Router::new()
        .route("/api/patch", post(patch_handler))
        .route_layer(middleware::from_fn_with_state(patch_gate, auth_middleware));

    let thumbnail_routes = Router::new()
        .route("/api/getThumbnail", post(thumbnail_handler::<S>))
        .route_layer(middleware::from_fn_with_state(
            thumbnail_gate,
            auth_middleware,
        ))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/api/login", post(login_handler::<S>))
        .with_state(state)
        .route("/health", get(health_handler));

    let router = Router::new()
        .merge(public_routes)
        .merge(patch_routes)
        .merge(thumbnail_routes)
        .layer(build_cors_layer(&config));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
