//! Immutable snapshot sources.
//!
//! Snapshots are the fallback tier: JSON documents shipped with the
//! deployment that seed the store the first time a record is missing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::Error;
use crate::registry::Mapping;

/// Read access to the snapshot associated with a mapping.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn read(&self, mapping: &Mapping) -> Result<Value, Error>;
}

/// Snapshots stored as JSON files under a directory.
#[derive(Debug, Clone)]
pub struct DirSnapshots {
    root: PathBuf,
}

impl DirSnapshots {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl SnapshotSource for DirSnapshots {
    async fn read(&self, mapping: &Mapping) -> Result<Value, Error> {
        let path = self.root.join(&mapping.snapshot);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::SnapshotUnavailable(format!("{}: {e}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::SnapshotMalformed(format!("{}: {e}", path.display())))
    }
}

/// In-process snapshots keyed by content name.
#[derive(Debug, Default)]
pub struct MemorySnapshots {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for `name`.
    pub fn insert(&self, name: &str, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.to_string(), value);
    }
}

#[async_trait]
impl SnapshotSource for MemorySnapshots {
    async fn read(&self, mapping: &Mapping) -> Result<Value, Error> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&mapping.name)
            .cloned()
            .ok_or_else(|| Error::SnapshotUnavailable(format!("no snapshot for {}", mapping.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn faq_mapping() -> Mapping {
        Mapping::new("faq", "site_content", "faq", "faq.json")
    }

    #[tokio::test]
    async fn test_dir_snapshot_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("faq.json"), r#"{"items":[{"q":"Why?","a":"Because."}]}"#).unwrap();

        let source = DirSnapshots::new(dir.path());
        let value = source.read(&faq_mapping()).await.unwrap();
        assert_eq!(value, json!({"items": [{"q": "Why?", "a": "Because."}]}));
    }

    #[tokio::test]
    async fn test_dir_snapshot_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSnapshots::new(dir.path());
        let result = source.read(&faq_mapping()).await;
        assert!(matches!(result, Err(Error::SnapshotUnavailable(_))));
    }

    #[tokio::test]
    async fn test_dir_snapshot_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("faq.json"), "{not json").unwrap();

        let source = DirSnapshots::new(dir.path());
        let result = source.read(&faq_mapping()).await;
        assert!(matches!(result, Err(Error::SnapshotMalformed(_))));
    }

    #[tokio::test]
    async fn test_memory_snapshots() {
        let source = MemorySnapshots::new();
        assert!(source.read(&faq_mapping()).await.is_err());

        source.insert("faq", json!({"v": 1}));
        assert_eq!(source.read(&faq_mapping()).await.unwrap(), json!({"v": 1}));

        source.insert("faq", json!({"v": 2}));
        assert_eq!(source.read(&faq_mapping()).await.unwrap(), json!({"v": 2}));
    }

    #[tokio::test]
    async fn test_memory_snapshots_recover_from_poisoned_lock() {
        let source = std::sync::Arc::new(MemorySnapshots::new());
        let holder = std::sync::Arc::clone(&source);
        let _ = std::thread::spawn(move || {
            let _guard = holder.entries.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(source.entries.is_poisoned());

        source.insert("faq", json!({"v": 3}));
        assert_eq!(source.read(&faq_mapping()).await.unwrap(), json!({"v": 3}));
    }
}
