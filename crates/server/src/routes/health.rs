//! Liveness and store connectivity.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health
///
/// 200 when the document store answers, 503 otherwise. The content routes
/// still serve snapshots while the store is down.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let uptime_seconds = state.started.elapsed().as_secs();
    let version = env!("CARGO_PKG_VERSION");

    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "healthy", version, uptime_seconds, error: None })),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            let body = HealthResponse { status: "unhealthy", version, uptime_seconds, error: Some(e.to_string()) };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{send, state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use vellum_core::resolver::MemorySnapshots;

    #[tokio::test]
    async fn test_health_ok() {
        let state = state(MemorySnapshots::new()).await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("healthy"));
        assert!(body.get("error").is_none());
    }
}
