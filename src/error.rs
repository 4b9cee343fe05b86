use std::time::Duration;

use thiserror::Error;

/// Malformed or missing request input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `username` or `password` is absent or empty
    #[error("Invalid Username or Password")]
    MissingCredentials,

    /// `username` or `password` is present but not a string
    #[error("Username and Password must be of STRING type")]
    CredentialType,

    /// `patch` is not a JSON array
    #[error("Invalid Patch.")]
    InvalidPatch,

    /// Body declared as JSON could not be parsed
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

/// Errors from the token signing primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token could not be produced
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Token carries an `exp` claim in the past
    #[error("Token expired")]
    Expired,

    /// Signature, encoding or claims are invalid
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Errors raised while applying a JSON Patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The operations do not form a valid RFC 6902 patch
    #[error("Malformed patch operation: {0}")]
    Malformed(String),

    /// An operation could not be applied to the document
    #[error("{0}")]
    Failed(String),
}

/// Errors raised while retrieving remote content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// URL is missing, relative, or uses an unsupported scheme
    #[error("Only absolute http(s) URLs are supported: {0}")]
    InvalidUrl(String),

    /// Network or connection failure
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Remote server did not answer in time
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// Remote server answered with a non-2xx status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Response body exceeded the configured limit
    #[error("Response from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },
}

/// Errors raised while turning fetched bytes into a thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Content is not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Resized image could not be encoded
    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),

    /// Decoding and resizing took too long
    #[error("Image processing timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The blocking worker panicked or was cancelled
    #[error("Image worker failed: {0}")]
    Worker(String),
}

/// Any failure a request handler can report.
///
/// Every variant is rendered as `403 Forbidden` with a plain-text body, see
/// [`ApiError::public_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Body sent to the client for any image decode or encode failure.
pub const INVALID_IMAGE_MESSAGE: &str = "Invalid Image URL was given";

impl ApiError {
    /// Message exposed in the response body.
    ///
    /// Image failures collapse to a single message; the underlying cause is
    /// only logged.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Image(_) => INVALID_IMAGE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Short identifier used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Token(_) => "token_error",
            ApiError::Patch(_) => "patch_error",
            ApiError::Fetch(_) => "fetch_error",
            ApiError::Image(_) => "image_error",
        }
    }
}
