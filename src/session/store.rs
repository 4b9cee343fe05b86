//! Single-slot store for the current session token.

use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

/// Holds the one token that is currently allowed through the gate.
///
/// Storing a new token replaces the previous one, so only the most recent
/// login is ever valid.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `token` the current token, returning the one it superseded.
    pub async fn replace(&self, token: String) -> Option<String> {
        self.current.write().await.replace(token)
    }

    /// Check whether `token` is the current token.
    pub async fn is_current(&self, token: &str) -> bool {
        match self.current.read().await.as_deref() {
            Some(current) => current.as_bytes().ct_eq(token.as_bytes()).into(),
            None => false,
        }
    }

    /// Current token, if anyone has logged in.
    pub async fn current(&self) -> Option<String> {
        self.current.read().await.clone()
    }
}
