//! Read-through fetch orchestration.
//!
//! An [`Orchestrator`] owns one resource: it paints whatever the cache holds
//! for the resource's key, then always revalidates against the network, and
//! publishes each step as a [`FetchState`] on a watch channel.
//!
//! ### Lifecycle
//! `Idle → Painted(fresh|stale) | Fetching → Fresh | ErrorKeptStale | ErrorNoData`
//!
//! ### Generations
//! Every request is tagged with the generation current when it was issued.
//! Activation issues at most one request per generation; `refresh` and
//! `retarget` start a new generation. A response only commits if its
//! generation is still current, so a response for a key the resource has
//! moved away from is dropped instead of overwriting the new key's state.
//!
//! Two orchestrators for the same key do not share requests.

pub mod options;
pub mod state;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

pub use options::{DEFAULT_MAX_AGE, ResourceOptions, Transform};
pub use state::{FetchState, Phase};

use crate::ClientError;
use crate::cache::CacheStore;
use crate::transport::{Target, Transport, fetch_payload};

/// Values an orchestrator can display and cache.
pub trait Cacheable: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Cacheable for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

struct Inner<T> {
    cache: CacheStore,
    transport: Arc<dyn Transport>,
    target: Mutex<Target>,
    max_age: Duration,
    fallback: T,
    transform: Transform<T>,
    request_timeout: Option<Duration>,
    generation: AtomicU64,
    /// Generation whose request has already been issued.
    issued: AtomicU64,
    state: watch::Sender<FetchState<T>>,
}

/// Stale-while-revalidate driver for a single resource.
///
/// Cloning shares the same resource.
pub struct Orchestrator<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Orchestrator<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Cacheable> Orchestrator<T> {
    pub fn new(cache: CacheStore, transport: Arc<dyn Transport>, options: ResourceOptions<T>) -> Self {
        let (state, _) = watch::channel(FetchState::idle(options.fallback.clone()));
        Self {
            inner: Arc::new(Inner {
                cache,
                transport,
                target: Mutex::new(options.target),
                max_age: options.max_age,
                fallback: options.fallback,
                transform: options.transform,
                request_timeout: options.request_timeout,
                generation: AtomicU64::new(1),
                issued: AtomicU64::new(0),
                state,
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    /// Receiver notified on every committed state change.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    pub fn target(&self) -> Target {
        match self.inner.target.lock() {
            Ok(target) => target.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Paint from the cache, then revalidate over the network.
    ///
    /// Repeated calls within one generation do nothing after the first, so
    /// callers may invoke this on every render.
    pub async fn activate(&self) {
        let generation = self.generation();
        if self.inner.issued.swap(generation, Ordering::SeqCst) == generation {
            tracing::trace!(generation, "activation already issued");
            return;
        }

        let target = self.target();
        self.paint(&target, generation).await;
        self.revalidate(&target, generation).await;
    }

    /// Force a new request regardless of prior activation.
    ///
    /// A resource that has not painted yet paints from the cache first;
    /// otherwise the displayed data stays and `loading` is raised. Returns
    /// the fetched value, or `None` on failure. State and cache are updated
    /// exactly as for activation.
    pub async fn refresh(&self) -> Option<T> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.issued.store(generation, Ordering::SeqCst);

        let target = self.target();
        if self.phase() == Phase::Idle {
            self.paint(&target, generation).await;
        } else {
            self.mark_loading(generation);
        }
        self.revalidate(&target, generation).await
    }

    /// Drop this resource's cache entry. Displayed state is unchanged until
    /// the next activation.
    pub async fn clear_cache(&self) {
        let target = self.target();
        self.inner.cache.remove(&target.key).await;
    }

    /// Point the resource at a different key.
    ///
    /// Starts a new generation, so an in-flight response for the old key is
    /// discarded, and resets the state to idle. Call [`activate`](Self::activate)
    /// afterwards.
    pub fn retarget(&self, target: Target) {
        match self.inner.target.lock() {
            Ok(mut current) => *current = target,
            Err(poisoned) => *poisoned.into_inner() = target,
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_replace(FetchState::idle(self.inner.fallback.clone()));
        tracing::debug!(generation, "resource retargeted");
    }

    /// Cached value for `target` and whether it is stale.
    async fn cached(&self, target: &Target) -> Option<(T, bool)> {
        let entry = self.inner.cache.get(&target.key).await?;
        let stale = entry.is_stale(self.inner.max_age);
        match serde_json::from_value::<T>(entry.data) {
            Ok(data) => Some((data, stale)),
            Err(e) => {
                tracing::debug!(key = %target.key, error = %e, "cached value does not fit resource type");
                None
            }
        }
    }

    async fn paint(&self, target: &Target, generation: u64) {
        let next = match self.cached(target).await {
            Some((data, stale)) => {
                tracing::debug!(key = %target.key, stale, "painted from cache");
                FetchState::painted(data, stale)
            }
            None => FetchState::fetching(self.inner.fallback.clone()),
        };
        self.commit(generation, next);
    }

    async fn revalidate(&self, target: &Target, generation: u64) -> Option<T> {
        match self.request(target).await {
            Ok(data) => {
                if !self.is_current(generation) {
                    tracing::debug!(key = %target.key, generation, "discarding superseded response");
                    return Some(data);
                }

                match serde_json::to_value(&data) {
                    Ok(value) => self.inner.cache.set(&target.key, value).await,
                    Err(e) => tracing::warn!(key = %target.key, error = %e, "resource value not cacheable"),
                }
                if self.commit(generation, FetchState::fresh(data.clone())) {
                    tracing::debug!(key = %target.key, generation, "committed fresh data");
                }
                Some(data)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(key = %target.key, generation, error = %message, "revalidation failed");
                self.fail(target, generation, message).await;
                None
            }
        }
    }

    async fn request(&self, target: &Target) -> Result<T, ClientError> {
        let fetch = fetch_payload(self.inner.transport.as_ref(), &target.endpoint);
        let payload = match self.inner.request_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| ClientError::Timeout)??,
            None => fetch.await?,
        };
        (self.inner.transform)(payload).map_err(ClientError::Transform)
    }

    fn commit(&self, generation: u64, next: FetchState<T>) -> bool {
        self.inner.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            *state = next;
            true
        })
    }

    fn mark_loading(&self, generation: u64) {
        self.inner.state.send_if_modified(|state| {
            if !self.is_current(generation) || state.loading {
                return false;
            }
            state.loading = true;
            true
        });
    }

    /// Settle a failed request. Data already displayed is kept; otherwise a
    /// cache entry written since the paint wins over the fallback.
    async fn fail(&self, target: &Target, generation: u64, message: String) {
        let cached = if self.phase().has_data() { None } else { self.cached(target).await };
        let fallback = self.inner.fallback.clone();
        self.inner.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            state.loading = false;
            state.error = Some(message);
            if state.phase.has_data() {
                state.phase = Phase::ErrorKeptStale;
            } else if let Some((data, stale)) = cached {
                state.data = data;
                state.is_stale = stale;
                state.phase = Phase::ErrorKeptStale;
            } else {
                state.data = fallback;
                state.is_stale = false;
                state.phase = Phase::ErrorNoData;
            }
            true
        });
    }
}
