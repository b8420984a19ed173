//! Core types and shared functionality for vellum.
//!
//! This crate provides:
//! - Unified error types
//! - Layered configuration and the content name registry
//! - SQLite document store with async access
//! - The tiered content resolver (store first, snapshot fallback, self-heal)
//! - The `{success, data|message}` envelope shared by server and client

pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod registry;
pub mod resolver;

pub use config::AppConfig;
pub use db::Database;
pub use envelope::Envelope;
pub use error::Error;
pub use registry::{Mapping, Registry};
pub use resolver::Resolver;
