//! HTTP request handlers.
//!
//! # Endpoints
//!
//! - `POST /api/login` - Issue a session token
//! - `POST /api/patch` - Apply a JSON Patch (gated)
//! - `POST /api/getThumbnail` - Fetch and resize a remote image (gated)
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, FetchError, ImageError};
use crate::patch::apply_patch_request;
use crate::session::{Credentials, SessionService};
use crate::thumbnail::{ImageSource, ThumbnailService};

use super::auth::BearerToken;
use super::payload::Payload;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: ImageSource> {
    /// Token issuer and current-session holder
    pub sessions: Arc<SessionService>,

    /// Remote image thumbnailer
    pub thumbnails: Arc<ThumbnailService<S>>,
}

impl<S: ImageSource> AppState<S> {
    pub fn new(sessions: SessionService, thumbnails: ThumbnailService<S>) -> Self {
        Self {
            sessions: Arc::new(sessions),
            thumbnails: Arc::new(thumbnails),
        }
    }
}

impl<S: ImageSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            thumbnails: Arc::clone(&self.thumbnails),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub text: &'static str,
    pub token: String,
    pub user: Credentials,
}

/// Successful patch application.
#[derive(Debug, Serialize)]
pub struct PatchResponse {
    pub text: &'static str,
    pub token: String,
    #[serde(rename = "patchedJson")]
    pub patched_json: Value,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ApiError to HTTP response.
///
/// Every failure is a `403 Forbidden` with a plain-text body. Worker
/// failures are logged at ERROR, everything else at WARN.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::FORBIDDEN;
        let message = self.public_message();

        match &self {
            ApiError::Image(ImageError::Worker(_)) => {
                error!(
                    error_type = self.kind(),
                    status = status.as_u16(),
                    "Request failed: {}",
                    self
                );
            }
            _ => {
                warn!(
                    error_type = self.kind(),
                    status = status.as_u16(),
                    "Request failed: {}",
                    self
                );
            }
        }

        (status, message).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle login requests.
///
/// # Endpoint
///
/// `POST /api/login` with body `{"username": "...", "password": "..."}`
///
/// # Response
///
/// `200 OK` with `{"text", "token", "user": {"username", "password"}}`.
/// The returned token replaces any previously issued token.
///
/// # Errors
///
/// - `403`: `Invalid Username or Password` when a field is missing
/// - `403`: `Username and Password must be of STRING type` when a field is not a string
pub async fn login_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    Payload(body): Payload,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = state.sessions.login(&body).await?;

    Ok(Json(LoginResponse {
        text: "User log-in successful",
        token: session.token,
        user: session.user,
    }))
}

/// Handle JSON Patch requests.
///
/// # Endpoint
///
/// `POST /api/patch` with header `Authorization: <token>` and body
/// `{"jsonObject": <any>, "patch": [<op>...]}`
///
/// # Response
///
/// `200 OK` with `{"text", "token", "patchedJson"}`.
///
/// # Errors
///
/// - `403`: `Invalid Token.` (raised by the auth gate)
/// - `403`: `Invalid Patch.` when `patch` is not an array
/// - `403`: the patch error message when an operation fails
pub async fn patch_handler(
    Extension(BearerToken(token)): Extension<BearerToken>,
    Payload(body): Payload,
) -> Result<Json<PatchResponse>, ApiError> {
    let patched_json = apply_patch_request(&body)?;
    debug!("patch applied");

    Ok(Json(PatchResponse {
        text: "Patch Applied...",
        token,
        patched_json,
    }))
}

/// Handle thumbnail requests.
///
/// # Endpoint
///
/// `POST /api/getThumbnail` with header `Authorization: <token>` and body
/// `{"url": "https://..."}`
///
/// # Response
///
/// `200 OK` with a 50×50 `image/jpeg` body.
///
/// # Errors
///
/// - `403`: `Invalid Token Sent` (raised by the auth gate)
/// - `403`: the fetch error message when the URL cannot be retrieved
/// - `403`: `Invalid Image URL was given` when the content is not an image
pub async fn thumbnail_handler<S: ImageSource + 'static>(
    State(state): State<AppState<S>>,
    Extension(_token): Extension<BearerToken>,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let url = match body.get("url") {
        Some(Value::String(url)) => url.as_str(),
        Some(other) => return Err(FetchError::InvalidUrl(other.to_string()).into()),
        None => return Err(FetchError::InvalidUrl("missing url".to_string()).into()),
    };

    let thumbnail = state.thumbnails.thumbnail(url).await?;
    info!(
        url = %url,
        bytes = thumbnail.data.len(),
        "thumbnail {}x{} generated",
        thumbnail.width,
        thumbnail.height
    );

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, thumbnail.content_type),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Body::from(thumbnail.data),
    )
        .into_response();

    Ok(response)
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
