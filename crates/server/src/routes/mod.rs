//! HTTP routes.
//!
//! - `GET /api/content` lists registered names and their stored records
//! - `GET /api/content/:name` resolves a content name
//! - `PUT /api/content/:name` replaces it on behalf of the caller
//! - `GET /health` checks the document store

pub mod content;
pub mod health;

use std::time::Instant;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use vellum_core::{Database, Resolver};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub db: Database,
    pub started: Instant,
}

impl AppState {
    pub fn new(resolver: Resolver, db: Database) -> Self {
        Self { resolver, db, started: Instant::now() }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/content", get(content::list_content))
        .route("/api/content/:name", get(content::get_content).put(content::put_content))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
