//! Namespaced client cache.
//!
//! Entries live in the storage medium under `cache_<logicalKey>`. The store
//! never fails its caller: a missing medium turns every operation into a
//! no-op, medium errors are logged, and malformed entries read as misses.

mod entry;

use std::sync::Arc;

use serde_json::Value;

pub use entry::CacheEntry;

use crate::storage::Storage;

/// Prefix reserved for cache entries in the storage medium.
pub const NAMESPACE: &str = "cache_";

fn storage_key(key: &str) -> String {
    format!("{NAMESPACE}{key}")
}

/// Key/entry cache over an optional storage medium.
#[derive(Clone, Default)]
pub struct CacheStore {
    medium: Option<Arc<dyn Storage>>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").field("available", &self.is_available()).finish()
    }
}

impl CacheStore {
    pub fn new(medium: Arc<dyn Storage>) -> Self {
        Self { medium: Some(medium) }
    }

    /// A store with no medium, e.g. when rendering outside a client session.
    pub fn unavailable() -> Self {
        Self { medium: None }
    }

    pub fn is_available(&self) -> bool {
        self.medium.is_some()
    }

    /// Read the entry for `key`. Absent, unreadable and malformed entries
    /// are all `None`.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let medium = self.medium.as_ref()?;
        let raw = match medium.get_item(&storage_key(key)).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry = CacheEntry::decode(&raw);
        if entry.is_none() {
            tracing::debug!(key, "ignoring malformed cache entry");
        }
        entry
    }

    /// Store `data` under `key` with the current time.
    pub async fn set(&self, key: &str, data: Value) {
        let Some(medium) = self.medium.as_ref() else {
            return;
        };

        let encoded = match CacheEntry::new(data).encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache entry not serializable");
                return;
            }
        };

        if let Err(e) = medium.set_item(&storage_key(key), &encoded).await {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    pub async fn remove(&self, key: &str) {
        let Some(medium) = self.medium.as_ref() else {
            return;
        };
        if let Err(e) = medium.remove_item(&storage_key(key)).await {
            tracing::warn!(key, error = %e, "cache remove failed");
        }
    }

    /// Logical keys currently cached.
    pub async fn keys(&self) -> Vec<String> {
        let Some(medium) = self.medium.as_ref() else {
            return Vec::new();
        };
        match medium.keys(NAMESPACE).await {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(NAMESPACE).map(str::to_string))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "cache key listing failed");
                Vec::new()
            }
        }
    }

    /// Remove every cache entry. Other keys in the medium are untouched.
    pub async fn clear_all(&self) {
        let Some(medium) = self.medium.as_ref() else {
            return;
        };
        let keys = match medium.keys(NAMESPACE).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "cache clear failed");
                return;
            }
        };
        for key in keys.iter().filter(|k| k.starts_with(NAMESPACE)) {
            if let Err(e) = medium.remove_item(key).await {
                tracing::warn!(key = %key, error = %e, "cache remove failed");
            }
        }
        tracing::debug!(count = keys.len(), "cleared cache");
    }
}
