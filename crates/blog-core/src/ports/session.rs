use async_trait::async_trait;

use crate::domain::ProviderToken;

/// Session store - maps an access token string to the provider token behind it.
///
/// Entries expire on their own after the store's time-to-live; writing a key
/// again resets its expiry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or replace the token stored under `key`.
    async fn save(&self, key: &str, token: ProviderToken) -> Result<(), SessionError>;

    async fn get(&self, key: &str) -> Result<ProviderToken, SessionError>;

    async fn delete(&self, key: &str) -> Result<(), SessionError>;

    /// Drop every expired entry, returning how many were removed.
    async fn purge_expired(&self) -> usize;
}

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Token not found in session store")]
    NotFound,

    #[error("Session backend error: {0}")]
    Backend(String),
}
