//! Unified error types for vellum.
//!
//! The `Display` text of every variant starts with a stable code so that
//! server responses and logs can be grepped without parsing.

use tokio_rusqlite::rusqlite;

/// Unified error types for the vellum core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A content name with no entry in the registry. This is a deployment
    /// bug, never "no data".
    #[error("CONFIG_ERROR: unmapped content name: {0}")]
    UnmappedName(String),

    /// Invalid input parameters (e.g., a payload that is not an object).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Document store operation failed.
    #[error("STORE_UNAVAILABLE: {0}")]
    Database(tokio_rusqlite::Error),

    /// A stored record could not be decoded.
    #[error("STORE_UNAVAILABLE: corrupt record: {0}")]
    CorruptRecord(String),

    /// Migration failed to apply.
    #[error("STORE_UNAVAILABLE: migration failed: {0}")]
    MigrationFailed(String),

    /// Snapshot could not be read from its source.
    #[error("SNAPSHOT_UNAVAILABLE: {0}")]
    SnapshotUnavailable(String),

    /// Snapshot was read but is not valid JSON.
    #[error("SNAPSHOT_MALFORMED: {0}")]
    SnapshotMalformed(String),
}

impl Error {
    /// Whether this error indicates a misconfigured deployment rather than
    /// a runtime failure of a store or snapshot.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::UnmappedName(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
