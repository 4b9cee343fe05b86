//! Authorization gate for protected routes.
//!
//! The gate reads the `Authorization` header, verifies the token signature
//! and checks that it is the current session token. Both the raw token and
//! the `Bearer <token>` form are accepted.
//!
//! Each protected route carries its own rejection text:
//!
//! ```text
//! POST /api/patch         -> 403 "Invalid Token."
//! POST /api/getThumbnail  -> 403 "Invalid Token Sent"
//! ```
//!
//! # Example
//!
//! ```ignore
//! use axum::{middleware, routing::post, Router};
//! use thumbpatch::server::auth::{auth_middleware, AuthGate, PATCH_REJECTION};
//!
//! let gate = AuthGate::new(sessions, PATCH_REJECTION);
//! let app = Router::new()
//!     .route("/api/patch", post(patch_handler))
//!     .route_layer(middleware::from_fn_with_state(gate, auth_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::session::{AuthFailure, SessionService};

/// Rejection text for the patch route.
pub const PATCH_REJECTION: &str = "Invalid Token.";

/// Rejection text for the thumbnail route.
pub const THUMBNAIL_REJECTION: &str = "Invalid Token Sent";

/// The verified token, placed in request extensions for handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

/// Rejected authorization attempt.
#[derive(Debug, Clone)]
pub struct AuthError {
    pub failure: AuthFailure,
    rejection: &'static str,
}

impl AuthError {
    pub fn new(failure: AuthFailure, rejection: &'static str) -> Self {
        Self { failure, rejection }
    }

    /// Text sent to the client.
    pub fn rejection(&self) -> &'static str {
        self.rejection
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rejection)
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = StatusCode::FORBIDDEN;

        // A token that verifies but is stale is routine after a re-login
        match &self.failure {
            AuthFailure::Superseded | AuthFailure::MissingHeader => {
                debug!(
                    error_type = "auth_error",
                    status = status.as_u16(),
                    "Authorization failed: {}",
                    self.failure
                );
            }
            _ => {
                warn!(
                    error_type = "auth_error",
                    status = status.as_u16(),
                    "Authorization failed: {}",
                    self.failure
                );
            }
        }

        (status, self.rejection).into_response()
    }
}

/// Middleware state: the shared session service plus this route's rejection text.
#[derive(Clone)]
pub struct AuthGate {
    sessions: Arc<SessionService>,
    rejection: &'static str,
}

impl AuthGate {
    pub fn new(sessions: Arc<SessionService>, rejection: &'static str) -> Self {
        Self {
            sessions,
            rejection,
        }
    }

    /// Run the gate against a set of request headers.
    pub async fn check(&self, headers: &HeaderMap) -> Result<BearerToken, AuthError> {
        let token = extract_token(headers).map_err(|f| AuthError::new(f, self.rejection))?;

        self.sessions
            .authorize(&token)
            .await
            .map_err(|f| AuthError::new(f, self.rejection))?;

        Ok(BearerToken(token))
    }
}

/// Pull the token out of the `Authorization` header.
///
/// A leading `Bearer ` (any case) is stripped; anything else is taken as the
/// raw token.
pub fn extract_token(headers: &HeaderMap) -> Result<String, AuthFailure> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthFailure::MissingHeader)?
        .to_str()
        .map_err(|_| AuthFailure::MalformedHeader)?
        .trim();

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };

    if token.is_empty() {
        return Err(AuthFailure::MalformedHeader);
    }

    Ok(token.to_string())
}

/// Axum middleware enforcing the single-session gate.
///
/// On success the token is forwarded to the handler as a [`BearerToken`]
/// extension; on failure the request never reaches the handler.
pub async fn auth_middleware(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = gate.check(request.headers()).await?;
    request.extensions_mut().insert(token);
    Ok(next.run(request).await)
}
