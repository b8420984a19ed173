//! Observable orchestrator state.

/// Where a resource is in its read-through lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not activated yet.
    Idle,
    /// Cached data is displayed and a revalidation request is in flight.
    Painted { stale: bool },
    /// No cached data; the fallback is displayed while the request runs.
    Fetching,
    /// The last request succeeded.
    Fresh,
    /// The last request failed; previously displayed data is kept.
    ErrorKeptStale,
    /// The last request failed and there was nothing to keep.
    ErrorNoData,
}

impl Phase {
    /// Whether the displayed data came from the cache or the network
    /// rather than the fallback.
    pub fn has_data(self) -> bool {
        matches!(self, Phase::Painted { .. } | Phase::Fresh | Phase::ErrorKeptStale)
    }

    pub fn is_settled(self) -> bool {
        matches!(self, Phase::Fresh | Phase::ErrorKeptStale | Phase::ErrorNoData)
    }
}

/// What a rendering layer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: T,
    pub loading: bool,
    pub is_stale: bool,
    pub error: Option<String>,
    pub phase: Phase,
}

impl<T> FetchState<T> {
    pub(crate) fn idle(fallback: T) -> Self {
        Self { data: fallback, loading: false, is_stale: false, error: None, phase: Phase::Idle }
    }

    pub(crate) fn painted(data: T, stale: bool) -> Self {
        Self { data, loading: false, is_stale: stale, error: None, phase: Phase::Painted { stale } }
    }

    pub(crate) fn fetching(fallback: T) -> Self {
        Self { data: fallback, loading: true, is_stale: false, error: None, phase: Phase::Fetching }
    }

    pub(crate) fn fresh(data: T) -> Self {
        Self { data, loading: false, is_stale: false, error: None, phase: Phase::Fresh }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_has_data() {
        assert!(!Phase::Idle.has_data());
        assert!(!Phase::Fetching.has_data());
        assert!(!Phase::ErrorNoData.has_data());
        assert!(Phase::Painted { stale: true }.has_data());
        assert!(Phase::Fresh.has_data());
        assert!(Phase::ErrorKeptStale.has_data());
    }

    #[test]
    fn test_phase_settled() {
        assert!(!Phase::Painted { stale: false }.is_settled());
        assert!(!Phase::Fetching.is_settled());
        assert!(Phase::Fresh.is_settled());
        assert!(Phase::ErrorNoData.is_settled());
    }
}
