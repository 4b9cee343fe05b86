//! Session layer: token issuing and single-session authorization.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 SessionService                   │
//! │   login(body) ──► sign ──► store.replace(token)  │
//! │   authorize(token) ──► verify + store.is_current │
//! └───────────────┬──────────────────────┬───────────┘
//!                 │                      │
//!                 ▼                      ▼
//!        ┌─────────────────┐    ┌─────────────────┐
//!        │   TokenSigner   │    │  SessionStore   │
//!        │  (HS256 JWT)    │    │ (single slot)   │
//!        └─────────────────┘    └─────────────────┘
//! ```
//!
//! Only the most recently issued token is accepted. A token that still
//! verifies cryptographically is rejected once a newer login has replaced it.

mod store;
mod token;

pub use store::SessionStore;
pub use token::{SessionClaims, TokenSigner};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ApiError, TokenError, ValidationError};

/// Username and password presented at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Extract credentials from a request body.
    ///
    /// Missing fields are checked before field types, so a body with one
    /// absent field and one non-string field reports missing credentials.
    /// A field counts as missing when it is absent, `null`, `false`, `0` or
    /// the empty string.
    pub fn from_body(body: &Value) -> Result<Self, ValidationError> {
        let username = body.get("username").filter(|v| !is_blank(v));
        let password = body.get("password").filter(|v| !is_blank(v));

        let (Some(username), Some(password)) = (username, password) else {
            return Err(ValidationError::MissingCredentials);
        };

        match (username, password) {
            (Value::String(username), Value::String(password)) => {
                Ok(Self::new(username.as_str(), password.as_str()))
            }
            _ => Err(ValidationError::CredentialType),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: Credentials,
}

/// Issues session tokens and checks presented tokens against the current one.
pub struct SessionService {
    signer: TokenSigner,
    store: SessionStore,
}

impl SessionService {
    pub fn new(signer: TokenSigner) -> Self {
        Self {
            signer,
            store: SessionStore::new(),
        }
    }

    /// Validate credentials, sign a token and make it the only valid one.
    pub async fn login(&self, body: &Value) -> Result<IssuedSession, ApiError> {
        let user = Credentials::from_body(body)?;
        let token = self.signer.sign(&user)?;

        if self.store.replace(token.clone()).await.is_some() {
            debug!(username = %user.username, "previous session superseded");
        }
        info!(username = %user.username, "session issued");

        Ok(IssuedSession { token, user })
    }

    /// Accept `token` only if it verifies and is the current session token.
    pub async fn authorize(&self, token: &str) -> Result<SessionClaims, AuthFailure> {
        let claims = self.signer.verify(token).map_err(AuthFailure::Verification)?;

        if !self.store.is_current(token).await {
            return Err(AuthFailure::Superseded);
        }

        Ok(claims)
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}

/// Why a presented token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No `Authorization` header
    MissingHeader,

    /// Header is present but not a usable token
    MalformedHeader,

    /// Signature, encoding or expiry check failed
    Verification(TokenError),

    /// Token verifies but a newer login replaced it
    Superseded,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::MissingHeader => write!(f, "Missing Authorization header"),
            AuthFailure::MalformedHeader => write!(f, "Malformed Authorization header"),
            AuthFailure::Verification(err) => write!(f, "{}", err),
            AuthFailure::Superseded => write!(f, "Token superseded by a newer login"),
        }
    }
}
