//! Authoritative record store seam.

use async_trait::async_trait;

use crate::Error;
use crate::db::{Database, Document, Record};

/// The primary tier the resolver reads first.
///
/// `find` returns the stored document including its identity field, the
/// way a document database hands records back.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, collection: &str, record_id: &str) -> Result<Option<Document>, Error>;

    async fn upsert(&self, record: &Record) -> Result<(), Error>;
}

#[async_trait]
impl RecordStore for Database {
    async fn find(&self, collection: &str, record_id: &str) -> Result<Option<Document>, Error> {
        Ok(self.get_record(collection, record_id).await?.map(Record::into_document))
    }

    async fn upsert(&self, record: &Record) -> Result<(), Error> {
        self.upsert_record(record).await
    }
}
