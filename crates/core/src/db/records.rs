//! Document record operations.
//!
//! Each record is a JSON object stored under a fixed `(collection,
//! record_id)` address. Writes are upserts; the core never deletes.

use super::connection::Database;
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A JSON object document.
pub type Document = Map<String, Value>;

/// Name of the identity field a document store attaches to records.
pub const ID_FIELD: &str = "_id";

/// A persisted content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub collection: String,
    pub record_id: String,
    pub document: Document,
    pub updated_at: String,
    pub updated_by: String,
}

impl Record {
    /// The record as a store document, carrying its identity field.
    pub fn into_document(self) -> Document {
        let mut document = self.document;
        document.insert(ID_FIELD.to_string(), Value::String(self.record_id));
        document
    }
}

fn decode_document(raw: &str) -> Result<Document, Error> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::CorruptRecord(format!("expected object, found {}", json_kind(&other)))),
        Err(e) => Err(Error::CorruptRecord(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Database {
    /// Insert or replace the record at `(collection, record_id)`.
    ///
    /// Last write wins; there is no version check.
    pub async fn upsert_record(&self, record: &Record) -> Result<(), Error> {
        let record = record.clone();
        let document = serde_json::to_string(&record.document).map_err(|e| Error::InvalidInput(e.to_string()))?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO records (collection, record_id, document, updated_at, updated_by)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(collection, record_id) DO UPDATE SET
                        document = excluded.document,
                        updated_at = excluded.updated_at,
                        updated_by = excluded.updated_by",
                    params![record.collection, record.record_id, document, record.updated_at, record.updated_by],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a record by address.
    ///
    /// Returns None if no record exists at that address.
    pub async fn get_record(&self, collection: &str, record_id: &str) -> Result<Option<Record>, Error> {
        let collection = collection.to_string();
        let record_id = record_id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Record>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT document, updated_at, updated_by
                    FROM records WHERE collection = ?1 AND record_id = ?2",
                )?;

                let result = stmt.query_row(params![collection, record_id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
                });

                match result {
                    Ok((raw, updated_at, updated_by)) => Ok(Some(Record {
                        document: decode_document(&raw)?,
                        collection,
                        record_id,
                        updated_at,
                        updated_by,
                    })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List every record in a collection, most recently updated first.
    pub async fn list_records(&self, collection: &str) -> Result<Vec<Record>, Error> {
        let collection = collection.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<Record>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT record_id, document, updated_at, updated_by
                    FROM records WHERE collection = ?1
                    ORDER BY updated_at DESC",
                )?;

                let rows = stmt
                    .query_map(params![collection], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(record_id, raw, updated_at, updated_by)| {
                        Ok(Record {
                            collection: collection.clone(),
                            record_id,
                            document: decode_document(&raw)?,
                            updated_at,
                            updated_by,
                        })
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }
}
