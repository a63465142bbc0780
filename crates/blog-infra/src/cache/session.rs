//! In-memory session store.

use std::time::Duration;

use async_trait::async_trait;

use blog_core::domain::ProviderToken;
use blog_core::ports::{SessionError, SessionStore};

use super::memory::ExpiringMap;

/// Default session lifetime: 120 minutes.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(120 * 60);

/// Session store keeping provider tokens in process memory.
pub struct InMemorySessionStore {
    entries: ExpiringMap<ProviderToken>,
}

impl InMemorySessionStore {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            entries: ExpiringMap::new(session_ttl),
        }
    }

    /// Sessions held, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.len().await
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, key: &str, token: ProviderToken) -> Result<(), SessionError> {
        self.entries.insert(key, token).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<ProviderToken, SessionError> {
        self.entries.get(key).await.ok_or(SessionError::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.entries
            .remove(key)
            .await
            .map(|_| ())
            .ok_or(SessionError::NotFound)
    }

    async fn purge_expired(&self) -> usize {
        let removed = self.entries.purge_expired().await;
        if removed > 0 {
            tracing::debug!(count = removed, "Purged expired sessions");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(secret: &str) -> ProviderToken {
        ProviderToken::new(secret, "bearer")
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = InMemorySessionStore::default();
        store.save("gho_1", token("gho_1")).await.unwrap();
        assert_eq!(store.get("gho_1").await.unwrap(), token("gho_1"));
    }

    #[tokio::test]
    async fn test_get_unknown_key() {
        let store = InMemorySessionStore::default();
        assert!(matches!(
            store.get("missing").await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = InMemorySessionStore::default();
        store.save("key", token("first")).await.unwrap();
        store.save("key", token("second")).await.unwrap();
        assert_eq!(store.get("key").await.unwrap().access_token, "second");
    }

    #[tokio::test]
    async fn test_deleted_token_is_gone() {
        let store = InMemorySessionStore::default();
        store.save("gho_1", token("gho_1")).await.unwrap();

        store.delete("gho_1").await.unwrap();

        assert!(matches!(store.get("gho_1").await, Err(SessionError::NotFound)));
        assert!(matches!(
            store.delete("gho_1").await,
            Err(SessionError::NotFound)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_expires_after_ttl() {
        let store = InMemorySessionStore::new(Duration::from_secs(120 * 60));
        store.save("gho_1", token("gho_1")).await.unwrap();

        tokio::time::advance(Duration::from_secs(119 * 60)).await;
        assert!(store.get("gho_1").await.is_ok());

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        assert!(matches!(store.get("gho_1").await, Err(SessionError::NotFound)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_reclaims_expired_sessions() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        store.save("a", token("a")).await.unwrap();
        store.save("b", token("b")).await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.purge_expired().await, 2);
        assert_eq!(store.purge_expired().await, 0);
    }
}
