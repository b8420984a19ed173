//! vellum-server entry point.
//!
//! Boots the content endpoints over the SQLite document store with snapshot
//! fallback. Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use vellum_core::resolver::DirSnapshots;
use vellum_core::{AppConfig, Database, Resolver};

mod error;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let registry = Arc::new(config.registry()?);

    let db = Database::open(&config.db_path)
        .await
        .with_context(|| format!("opening document store at {}", config.db_path.display()))?;
    let snapshots = DirSnapshots::new(config.snapshot_dir.clone());
    let snapshot_root = snapshots.root().to_path_buf();
    let resolver = Resolver::new(registry, Arc::new(db.clone()), Arc::new(snapshots));

    let app = routes::router(routes::AppState::new(resolver, db));
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, snapshots = %snapshot_root.display(), "Starting vellum server");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("vellum server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
