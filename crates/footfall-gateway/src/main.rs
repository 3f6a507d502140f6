mod app;
mod cli;
mod error;
mod handlers;
mod model;
mod state;
mod writings;

use crate::app::App;
use crate::cli::{StorageBackendArg, CLI};
use crate::state::{AppState, Tracker};
use crate::writings::WritingSource;
use anyhow::Context;
use clap::Parser;
use footfall_core::KvStore;
use footfall_ledger::{GeoResolver, IpApiResolver, LedgerSettings, VisitTracker, VisitorLedger};
use footfall_store::{InMemoryStore, RedisStore};
use footfall_telemetry::TelemetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let telemetry = TelemetryConfig {
        otlp_endpoint: config.otlp_endpoint.clone(),
        ..TelemetryConfig::builder()
            .level(config.log_level)
            .format(config.log_format.into())
            .service_name("footfall-gateway")
            .build()
    };
    let _guard = footfall_telemetry::init(&telemetry)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        max_records = config.max_records,
        dev_mode = config.dev_mode,
        "starting footfall gateway"
    );

    let store = build_store(&config).await?;
    let resolver: Arc<dyn GeoResolver> = Arc::new(IpApiResolver::new(
        config.ip_api_url.clone(),
        Duration::from_millis(config.ip_api_timeout_ms),
    )?);

    let settings = LedgerSettings::builder()
        .max_records(config.max_records)
        .build();
    let listing = state::listing(
        store.clone(),
        settings.clone(),
        Duration::from_secs(config.cache_ttl_secs),
    );
    let tracker: Tracker = VisitTracker::new(VisitorLedger::new(store, settings), resolver)
        .with_dev_mode(config.dev_mode);
    let state = AppState::new(
        tracker,
        listing,
        WritingSource::new(config.writings_dir.clone()),
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn build_store(config: &CLI) -> anyhow::Result<Arc<dyn KvStore>> {
    Ok(match config.storage {
        StorageBackendArg::InMemory => Arc::new(InMemoryStore::new()),
        StorageBackendArg::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("redis url is required when storage backend is redis")?;
            Arc::new(RedisStore::connect(url, config.redis_prefix.clone()).await?)
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
