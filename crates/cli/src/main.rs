//! vellum command-line client.
//!
//! Warms the local cache, reads content through the fetch orchestrator and
//! clears cached entries. Results go to stdout as JSON; logs go to stderr.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use vellum_client::{CacheStore, FetchState, HttpTransport, Orchestrator, Phase, Prefetcher, ResourceOptions, Target};
use vellum_client::{Transport, TransportConfig};
use vellum_core::{AppConfig, Database};

#[derive(Debug, Parser)]
#[command(name = "vellum")]
#[command(about = "Read-through content client with a persistent local cache")]
struct Cli {
    /// Server base URL, overriding configuration
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Warm the cache for the well-known content names
    Prefetch,

    /// Read one key through the cache and the network
    Get {
        /// Logical key; also the content name unless --endpoint is given
        key: String,

        /// Freshness window in seconds (default: configured max_age_secs)
        #[arg(long)]
        max_age: Option<u64>,

        /// Endpoint path, for keys that are not content names
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Remove one cached key, or every cached key
    Clear {
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let cache = open_cache(&config).await?;
    match cli.command {
        Command::Prefetch => {
            let transport = transport(&config)?;
            let warmed = Prefetcher::new(transport, cache).run().await;
            println!("{}", json!({ "warmed": warmed }));
        }
        Command::Get { key, max_age, endpoint } => {
            let max_age = max_age.map(Duration::from_secs).unwrap_or_else(|| config.max_age());
            let target = match endpoint {
                Some(endpoint) => Target::new(key, endpoint),
                None => Target::content(&key),
            };
            let state = get(cache, transport(&config)?, target, max_age).await?;
            println!("{}", render_state(&state));
            if state.phase == Phase::ErrorNoData {
                bail!(state.error.unwrap_or_else(|| "request failed".to_string()));
            }
        }
        Command::Clear { key } => {
            if !cache.is_available() {
                bail!("no cache_path configured");
            }
            let cleared = match key {
                Some(key) => {
                    cache.remove(&key).await;
                    vec![key]
                }
                None => {
                    let keys = cache.keys().await;
                    cache.clear_all().await;
                    keys
                }
            };
            println!("{}", json!({ "cleared": cleared }));
        }
    }

    Ok(())
}

async fn open_cache(config: &AppConfig) -> Result<CacheStore> {
    let Some(path) = &config.cache_path else {
        tracing::debug!("no cache_path configured; running without a local cache");
        return Ok(CacheStore::unavailable());
    };
    let db = Database::open(path)
        .await
        .with_context(|| format!("opening cache at {}", path.display()))?;
    Ok(CacheStore::new(Arc::new(db)))
}

fn transport(config: &AppConfig) -> Result<Arc<dyn Transport>> {
    let transport = HttpTransport::new(TransportConfig::from(config))?;
    tracing::debug!(base_url = %transport.base_url(), "content transport ready");
    Ok(Arc::new(transport))
}

/// Activate one resource, logging each state it passes through, and return
/// the settled state.
async fn get(
    cache: CacheStore, transport: Arc<dyn Transport>, target: Target, max_age: Duration,
) -> Result<FetchState<Value>> {
    let options = ResourceOptions::new(target, Value::Null).with_max_age(max_age);
    let orchestrator = Orchestrator::new(cache, transport, options);

    let mut rx = orchestrator.subscribe();
    let activation = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.activate().await }
    });

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        tracing::info!(phase = ?state.phase, stale = state.is_stale, loading = state.loading, "resource state");
        if state.phase.is_settled() {
            break;
        }
    }
    activation.await?;

    Ok(orchestrator.state())
}

fn render_state(state: &FetchState<Value>) -> Value {
    json!({
        "data": state.data,
        "loading": state.loading,
        "isStale": state.is_stale,
        "error": state.error,
        "phase": format!("{:?}", state.phase),
    })
}
