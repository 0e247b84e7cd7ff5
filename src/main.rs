//! touchline server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use touchline::api;
use touchline::app_state::AppState;
use touchline::config::{AppConfig, LogFormat, StorageBackend};
use touchline::domain::SchemaCapabilities;
use touchline::identity::TrustedHeaderIdentity;
use touchline::persistence::{MemoryStore, PostgresStore, SocialStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, backend = ?config.storage_backend, "starting touchline");

    // Build persistence layer
    let (store, capabilities) = open_store(&config).await?;

    // Build application state
    let identity = Arc::new(TrustedHeaderIdentity::from_config(&config));
    let app_state = AppState::new(store, &config, capabilities, identity);

    // Build router
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Opens the configured store and resolves which optional tables it has.
async fn open_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn SocialStore>, SchemaCapabilities)> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Ok((Arc::new(MemoryStore::new()), SchemaCapabilities::default()))
        }
        StorageBackend::Postgres => {
            let store = PostgresStore::connect(config)
                .await
                .context("failed to connect to PostgreSQL")?;
            if config.database_run_migrations {
                store.run_migrations().await?;
            }
            let capabilities = match config.schema_engagement_tables {
                Some(engagement_tables) => SchemaCapabilities { engagement_tables },
                None => store.detect_capabilities().await?,
            };
            if !capabilities.engagement_tables {
                tracing::warn!("like/comment tables missing; match pages skip engagement counts");
            }
            Ok((Arc::new(store), capabilities))
        }
    }
}
