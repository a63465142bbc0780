//! OAuth state tracker - single-use nonces for in-flight sign-ins.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::memory::ExpiringMap;

/// Default nonce lifetime: 5 minutes.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(5 * 60);

/// Random bytes per nonce (256 bits).
const NONCE_BYTES: usize = 32;

/// Tracks the `state` values of sign-ins this server started.
///
/// A nonce is accepted once; replaying it, or presenting it after the TTL,
/// fails.
pub struct StateTracker {
    nonces: ExpiringMap<()>,
}

impl StateTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            nonces: ExpiringMap::new(ttl),
        }
    }

    /// Generate and record a new nonce.
    pub async fn issue(&self) -> String {
        let nonce = generate_nonce();
        self.nonces.insert(nonce.clone(), ()).await;
        nonce
    }

    /// Check and remove `nonce` in one step. True only for a live, unused nonce.
    pub async fn consume(&self, nonce: &str) -> bool {
        self.nonces.remove(nonce).await.is_some()
    }

    pub async fn purge_expired(&self) -> usize {
        let removed = self.nonces.purge_expired().await;
        if removed > 0 {
            tracing::debug!(count = removed, "Purged expired OAuth states");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.nonces.len().await
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_TTL)
    }
}

fn generate_nonce() -> String {
    let bytes: [u8; NONCE_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_nonce_is_url_safe_and_full_length() {
        let tracker = StateTracker::default();
        let nonce = tracker.issue().await;

        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(nonce.len(), 43);
        assert!(
            nonce
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[tokio::test]
    async fn test_nonces_are_distinct() {
        let tracker = StateTracker::default();
        let a = tracker.issue().await;
        let b = tracker.issue().await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_nonce_is_single_use() {
        let tracker = StateTracker::default();
        let nonce = tracker.issue().await;

        assert!(tracker.consume(&nonce).await);
        assert!(!tracker.consume(&nonce).await);
        assert!(!tracker.consume(&nonce).await);
    }

    #[tokio::test]
    async fn test_unknown_nonce_is_rejected() {
        let tracker = StateTracker::default();
        assert!(!tracker.consume("forged").await);
        assert!(!tracker.consume("").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nonce_expires_without_consumption() {
        let tracker = StateTracker::new(Duration::from_secs(300));
        let nonce = tracker.issue().await;

        tokio::time::advance(Duration::from_secs(301)).await;

        assert!(!tracker.consume(&nonce).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_drops_stale_nonces() {
        let tracker = StateTracker::new(Duration::from_secs(10));
        tracker.issue().await;
        tracker.issue().await;

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(tracker.purge_expired().await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consume_succeeds_once() {
        let tracker = Arc::new(StateTracker::default());
        let nonce = tracker.issue().await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let tracker = tracker.clone();
                let nonce = nonce.clone();
                tokio::spawn(async move { tracker.consume(&nonce).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }
}
