//! Storage media for the client cache.
//!
//! A medium is a flat string key/value store in the spirit of browser
//! local storage. The cache store layers namespacing and entry encoding on
//! top; a medium knows nothing about either.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use vellum_core::Database;

use crate::ClientError;

/// Flat string key/value medium.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, ClientError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError>;

    async fn remove_item(&self, key: &str) -> Result<(), ClientError>;

    /// Keys beginning with `prefix`.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, ClientError>;
}

/// Process-local medium. Used in tests and for sessions that should not
/// outlive the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, ClientError> {
        self.items.lock().map_err(|_| ClientError::Storage("memory storage poisoned".into()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), ClientError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, ClientError> {
        Ok(self.lock()?.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }
}

/// Persistent medium over the SQLite `kv` table.
#[async_trait]
impl Storage for Database {
    async fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.kv_get(key).await?)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        Ok(self.kv_set(key, value).await?)
    }

    async fn remove_item(&self, key: &str) -> Result<(), ClientError> {
        self.kv_remove(key).await?;
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, ClientError> {
        Ok(self.kv_keys(prefix).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set_item("a", "1").await.unwrap();
        assert_eq!(storage.get_item("a").await.unwrap().as_deref(), Some("1"));

        storage.remove_item("a").await.unwrap();
        assert!(storage.get_item("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_storage_keys_by_prefix() {
        let storage = MemoryStorage::new();
        storage.set_item("cache_b", "1").await.unwrap();
        storage.set_item("cache_a", "2").await.unwrap();
        storage.set_item("session", "3").await.unwrap();

        assert_eq!(storage.keys("cache_").await.unwrap(), vec!["cache_a", "cache_b"]);
        assert_eq!(storage.keys("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_database_storage() {
        let db = Database::open_in_memory().await.unwrap();
        db.set_item("cache_faq", "{}").await.unwrap();
        assert_eq!(db.get_item("cache_faq").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(db.keys("cache_").await.unwrap(), vec!["cache_faq"]);
        db.remove_item("cache_faq").await.unwrap();
        assert!(db.get_item("cache_faq").await.unwrap().is_none());
    }
}
