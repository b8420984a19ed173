//! Tiered content resolution.
//!
//! A content name resolves through two tiers:
//!
//! 1. The authoritative record store, at the address the registry maps the
//!    name to.
//! 2. An immutable snapshot, used when the record is missing or the store
//!    is unreachable.
//!
//! A missing record is healed by seeding it from the snapshot, so later
//! reads come from the store even if the snapshot changes. Unmapped names
//! fail before any store access.

pub mod snapshot;
pub mod store;

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::Error;
use crate::db::records::ID_FIELD;
use crate::db::{Document, Record};
use crate::registry::{Mapping, Registry};

pub use snapshot::{DirSnapshots, MemorySnapshots, SnapshotSource};
pub use store::RecordStore;

/// Attribution written on records created from a snapshot.
pub const SEED_ATTRIBUTION: &str = "system-auto-seed";

/// Server-maintained timestamp field.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Server-maintained attribution field.
pub const UPDATED_BY_FIELD: &str = "updatedBy";

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Resolves content names against the store with snapshot fallback.
#[derive(Clone)]
pub struct Resolver {
    registry: Arc<Registry>,
    store: Arc<dyn RecordStore>,
    snapshots: Arc<dyn SnapshotSource>,
}

impl Resolver {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn RecordStore>, snapshots: Arc<dyn SnapshotSource>) -> Self {
        Self { registry, store, snapshots }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn mapping(&self, name: &str) -> Result<&Mapping, Error> {
        self.registry.get(name).ok_or_else(|| Error::UnmappedName(name.to_string()))
    }

    /// Resolve `name` to its current content.
    ///
    /// Returns `Ok(None)` when neither tier has data. Store and snapshot
    /// failures are logged and absorbed.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnmappedName` if `name` has no registry entry.
    pub async fn resolve(&self, name: &str) -> Result<Option<Value>, Error> {
        let mapping = self.mapping(name)?;

        match self.store.find(&mapping.collection, &mapping.record_id).await {
            Ok(Some(mut document)) => {
                document.remove(ID_FIELD);
                tracing::debug!(content = name, collection = %mapping.collection, "resolved from store");
                Ok(Some(Value::Object(document)))
            }
            Ok(None) => {
                let Some(snapshot) = self.read_snapshot(mapping).await else {
                    return Ok(None);
                };
                self.seed(mapping, &snapshot).await;
                Ok(Some(snapshot))
            }
            Err(e) => {
                tracing::warn!(content = name, error = %e, "record store unavailable, serving snapshot");
                Ok(self.read_snapshot(mapping).await)
            }
        }
    }

    /// Write `payload` as the new content for `name` on behalf of `caller`.
    ///
    /// Any identity field in the payload is dropped; `updatedAt` and
    /// `updatedBy` are always set here. Returns the stored document.
    ///
    /// # Errors
    ///
    /// - `Error::UnmappedName` if `name` has no registry entry
    /// - `Error::InvalidInput` if the payload is not an object or the caller is empty
    /// - Store errors from the upsert
    pub async fn persist(&self, name: &str, payload: Value, caller: &str) -> Result<Value, Error> {
        let mapping = self.mapping(name)?;

        let Value::Object(mut document) = payload else {
            return Err(Error::InvalidInput("payload must be a JSON object".into()));
        };
        if caller.trim().is_empty() {
            return Err(Error::InvalidInput("caller identity is required".into()));
        }

        document.remove(ID_FIELD);
        let record = stamp(mapping, document, caller);
        self.store.upsert(&record).await?;

        tracing::info!(content = name, caller, "content persisted");
        Ok(Value::Object(record.document))
    }

    async fn read_snapshot(&self, mapping: &Mapping) -> Option<Value> {
        match self.snapshots.read(mapping).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(content = %mapping.name, error = %e, "snapshot unavailable");
                None
            }
        }
    }

    async fn seed(&self, mapping: &Mapping, snapshot: &Value) {
        let Value::Object(document) = snapshot else {
            tracing::warn!(content = %mapping.name, "snapshot is not an object; skipping seed");
            return;
        };

        let mut document = document.clone();
        document.remove(ID_FIELD);
        let record = stamp(mapping, document, SEED_ATTRIBUTION);

        match self.store.upsert(&record).await {
            Ok(()) => {
                tracing::info!(content = %mapping.name, collection = %mapping.collection, "seeded record from snapshot")
            }
            Err(e) => tracing::warn!(content = %mapping.name, error = %e, "failed to seed record from snapshot"),
        }
    }
}

fn stamp(mapping: &Mapping, mut document: Document, updated_by: &str) -> Record {
    let updated_at = now_timestamp();
    document.insert(UPDATED_AT_FIELD.to_string(), Value::String(updated_at.clone()));
    document.insert(UPDATED_BY_FIELD.to_string(), Value::String(updated_by.to_string()));
    Record {
        collection: mapping.collection.clone(),
        record_id: mapping.record_id.clone(),
        document,
        updated_at,
        updated_by: updated_by.to_string(),
    }
}
