//! Startup cache warming.
//!
//! The prefetcher requests a fixed set of well-known keys in parallel and
//! writes each unwrapped payload to the cache store. Keys are isolated from
//! each other: a failing key is logged and the rest still land. Running it
//! again simply overwrites the entries.

use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};

use crate::cache::CacheStore;
use crate::transport::{Target, Transport, fetch_payload};

/// Content names warmed at startup.
pub const PREFETCH_KEYS: &[&str] = &["homepage", "navigation", "footer", "faq"];

/// Fire-and-forget cache warmer.
#[derive(Clone)]
pub struct Prefetcher {
    transport: Arc<dyn Transport>,
    cache: CacheStore,
    targets: Vec<Target>,
}

impl Prefetcher {
    /// Prefetcher for [`PREFETCH_KEYS`] at their content endpoints.
    pub fn new(transport: Arc<dyn Transport>, cache: CacheStore) -> Self {
        let targets = PREFETCH_KEYS.iter().map(|name| Target::content(name)).collect();
        Self { transport, cache, targets }
    }

    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Warm every target and wait for all of them to settle.
    ///
    /// Returns the number of keys written.
    pub async fn run(&self) -> usize {
        let mut join_set = JoinSet::new();
        for target in self.targets.clone() {
            let transport = Arc::clone(&self.transport);
            let cache = self.cache.clone();
            join_set.spawn(async move { warm(transport.as_ref(), &cache, &target).await });
        }

        let mut warmed = 0usize;
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(true) => warmed += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(error = %e, "prefetch task aborted"),
            }
        }

        tracing::info!(warmed, total = self.targets.len(), "prefetch complete");
        warmed
    }

    /// Run on the tokio runtime without waiting for it.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}

async fn warm(transport: &dyn Transport, cache: &CacheStore, target: &Target) -> bool {
    match fetch_payload(transport, &target.endpoint).await {
        Ok(payload) => {
            cache.set(&target.key, payload).await;
            tracing::debug!(key = %target.key, "prefetched");
            true
        }
        Err(e) => {
            tracing::warn!(key = %target.key, error = %e, "prefetch failed");
            false
        }
    }
}

impl std::fmt::Debug for Prefetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prefetcher").field("cache", &self.cache).field("targets", &self.targets).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `{"success": true, "data": {"endpoint": ...}}`, failing for one endpoint.
    struct EchoTransport {
        failing: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn get_json(&self, endpoint: &str) -> Result<Value, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if endpoint == self.failing {
                return Ok(json!({"success": false, "message": "content not found"}));
            }
            Ok(json!({"success": true, "data": {"endpoint": endpoint}}))
        }
    }

    fn setup(failing: &'static str) -> (Arc<EchoTransport>, CacheStore) {
        let transport = Arc::new(EchoTransport { failing, calls: AtomicUsize::new(0) });
        (transport, CacheStore::new(Arc::new(MemoryStorage::new())))
    }

    #[tokio::test]
    async fn test_prefetch_warms_all_keys() {
        let (transport, cache) = setup("");
        let warmed = Prefetcher::new(transport.clone(), cache.clone()).run().await;

        assert_eq!(warmed, PREFETCH_KEYS.len());
        assert_eq!(transport.calls.load(Ordering::SeqCst), PREFETCH_KEYS.len());

        let entry = cache.get("navigation").await.unwrap();
        assert_eq!(entry.data, json!({"endpoint": "/api/content/navigation"}));
    }

    #[tokio::test]
    async fn test_failing_key_does_not_block_others() {
        let (transport, cache) = setup("/api/content/footer");
        let warmed = Prefetcher::new(transport, cache.clone()).run().await;

        assert_eq!(warmed, PREFETCH_KEYS.len() - 1);
        assert!(cache.get("footer").await.is_none());
        for key in ["homepage", "navigation", "faq"] {
            assert!(cache.get(key).await.is_some(), "{key} should be cached");
        }
    }

    #[tokio::test]
    async fn test_rerun_overwrites() {
        let (transport, cache) = setup("");
        let prefetcher = Prefetcher::new(transport, cache.clone());

        prefetcher.run().await;
        let first = cache.get("faq").await.unwrap().timestamp;
        prefetcher.run().await;
        let second = cache.get("faq").await.unwrap().timestamp;

        assert!(second >= first);
        let mut keys = cache.keys().await;
        keys.sort();
        assert_eq!(keys, vec!["faq", "footer", "homepage", "navigation"]);
    }

    #[tokio::test]
    async fn test_spawn_and_custom_targets() {
        let (transport, cache) = setup("");
        let handle = Prefetcher::new(transport, cache.clone())
            .with_targets(vec![Target::new("nav-v2", "/api/v2/navigation")])
            .spawn();
        handle.await.unwrap();

        assert_eq!(cache.keys().await, vec!["nav-v2"]);
    }

    #[tokio::test]
    async fn test_prefetch_without_medium() {
        let (transport, _) = setup("");
        let warmed = Prefetcher::new(transport, CacheStore::unavailable()).run().await;
        assert_eq!(warmed, PREFETCH_KEYS.len());
    }
}
