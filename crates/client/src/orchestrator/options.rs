//! Per-resource options supplied by the rendering layer.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::transport::Target;

/// Default freshness window.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

/// Pure mapping from an unwrapped payload to the displayed value.
pub type Transform<T> = Arc<dyn Fn(Value) -> Result<T, String> + Send + Sync>;

/// How one resource is fetched, cached and displayed.
pub struct ResourceOptions<T> {
    pub target: Target,
    /// Cached data older than this is painted as stale.
    pub max_age: Duration,
    /// Displayed while nothing better is known.
    pub fallback: T,
    pub transform: Transform<T>,
    /// Upper bound on a request, on top of the transport's own timeout.
    pub request_timeout: Option<Duration>,
}

impl<T> Clone for ResourceOptions<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            max_age: self.max_age,
            fallback: self.fallback.clone(),
            transform: Arc::clone(&self.transform),
            request_timeout: self.request_timeout,
        }
    }
}

impl<T> ResourceOptions<T>
where
    T: DeserializeOwned + 'static,
{
    /// Options that deserialize the payload into `T`.
    pub fn new(target: Target, fallback: T) -> Self {
        Self {
            target,
            max_age: DEFAULT_MAX_AGE,
            fallback,
            transform: Arc::new(|value: Value| serde_json::from_value::<T>(value).map_err(|e| e.to_string())),
            request_timeout: None,
        }
    }

    /// Options for a content name served at its standard endpoint.
    pub fn content(name: &str, fallback: T) -> Self {
        Self::new(Target::content(name), fallback)
    }
}

impl<T> ResourceOptions<T> {
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_transform(mut self, transform: impl Fn(Value) -> Result<T, String> + Send + Sync + 'static) -> Self {
        self.transform = Arc::new(transform);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
