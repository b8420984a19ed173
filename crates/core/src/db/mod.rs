//! SQLite-backed document store.
//!
//! This module provides the authoritative store for site content using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Documents addressed by `(collection, record_id)` with upsert semantics
//! - A flat key/value table used as the client's persistent cache medium
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod kv;
pub mod migrations;
pub mod records;

pub use crate::Error;

pub use connection::Database;
pub use records::{Document, Record};
