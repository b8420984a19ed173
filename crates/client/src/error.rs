//! Client error types.
//!
//! Every variant is a transient failure from the point of view of a page:
//! the orchestrator turns them into an `error` string and keeps whatever
//! data it already shows.

/// Errors from the content transport and storage medium.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-success HTTP status without an envelope message.
    #[error("HTTP_ERROR: status {status}")]
    Http { status: u16 },

    /// Request timed out.
    #[error("FETCH_TIMEOUT: request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// The server answered with `success: false`; carries its message.
    #[error("{0}")]
    Envelope(String),

    /// Response body was not JSON.
    #[error("PARSE_ERROR: {0}")]
    Parse(String),

    /// The caller's transform rejected the payload.
    #[error("TRANSFORM_FAILED: {0}")]
    Transform(String),

    /// Base URL or endpoint could not be built.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Storage medium failure.
    #[error("STORAGE_ERROR: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ClientError::Timeout } else { ClientError::Network(err.to_string()) }
    }
}

impl From<crate::transport::UrlError> for ClientError {
    fn from(err: crate::transport::UrlError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<vellum_core::Error> for ClientError {
    fn from(err: vellum_core::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Http { status: 502 };
        assert!(err.to_string().contains("502"));

        let err = ClientError::Envelope("content not found".to_string());
        assert_eq!(err.to_string(), "content not found");
    }

    #[test]
    fn test_core_error_maps_to_storage() {
        let err: ClientError = vellum_core::Error::InvalidInput("x".into()).into();
        assert!(matches!(err, ClientError::Storage(_)));
    }
}
