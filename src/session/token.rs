//! HS256 session tokens.
//!
//! A session token is a JWT whose claims carry the credentials that were
//! presented at login, plus a unique `jti` so that two logins with the same
//! credentials never produce the same token.
//!
//! # Example
//!
//! ```rust
//! use thumbpatch::session::{Credentials, TokenSigner};
//!
//! let signer = TokenSigner::new("my-secret-key", None);
//! let credentials = Credentials::new("alice", "hunter2");
//!
//! let token = signer.sign(&credentials).unwrap();
//! let claims = signer.verify(&token).unwrap();
//! assert_eq!(claims.username, "alice");
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

use super::Credentials;

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub username: String,
    pub password: String,

    /// Issued at (Unix seconds)
    pub iat: u64,

    /// Unique token id
    pub jti: String,

    /// Expiry (Unix seconds), only present when a TTL is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Signs and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Option<Duration>,
}

impl TokenSigner {
    /// Create a signer for the given secret.
    ///
    /// When `ttl` is `None` tokens carry no `exp` claim and never expire on
    /// their own.
    pub fn new(secret: impl AsRef<[u8]>, ttl: Option<Duration>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = ttl.is_some();
        if ttl.is_some() {
            validation.set_required_spec_claims(&["exp"]);
        }
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Create a signer with a random secret that lives only as long as the process.
    pub fn random(ttl: Option<Duration>) -> Self {
        Self::new(Uuid::new_v4().to_string(), ttl)
    }

    /// Configured token lifetime, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Sign a fresh token for the given credentials.
    pub fn sign(&self, credentials: &Credentials) -> Result<String, TokenError> {
        let iat = unix_now()?;
        let exp = match self.ttl {
            Some(ttl) => Some(
                iat.checked_add(ttl.as_secs())
                    .ok_or_else(|| TokenError::Signing("token TTL overflows expiry".to_string()))?,
            ),
            None => None,
        };
        let claims = SessionClaims {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            iat,
            jti: Uuid::new_v4().to_string(),
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token's signature (and expiry, when configured) and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

fn unix_now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| TokenError::Signing(e.to_string()))
}
