//! Client side of vellum.
//!
//! This crate provides the storage media, the namespaced cache store, the
//! content transport, the stale-while-revalidate fetch orchestrator and the
//! startup prefetcher used by the CLI.

pub mod cache;
pub mod error;
pub mod orchestrator;
pub mod prefetch;
pub mod storage;
pub mod transport;

pub use cache::{CacheEntry, CacheStore};
pub use error::ClientError;
pub use orchestrator::{Cacheable, FetchState, Orchestrator, Phase, ResourceOptions};
pub use prefetch::{PREFETCH_KEYS, Prefetcher};
pub use storage::{MemoryStorage, Storage};
pub use transport::{HttpTransport, Target, Transport, TransportConfig};
