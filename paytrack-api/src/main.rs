//! # Paytrack API Server
//!
//! Serves the bills/payments API. With `DATABASE_URL` set, data lives in
//! PostgreSQL; without it, in process memory.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p paytrack-api
//! ```

use anyhow::Context;
use paytrack_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use paytrack_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{memory::MemoryStore, postgres::PgStore},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "paytrack_api=debug,paytrack_shared=debug,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Connects to PostgreSQL and applies migrations when configured to
async fn connect_database(config: &paytrack_api::config::DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = create_pool(DatabaseConfig {
        url: config.url.clone(),
        max_connections: config.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to the database")?;

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    Ok(pool)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "Paytrack API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let (state, pool) = match &config.database {
        Some(database) => {
            let pool = connect_database(database).await?;
            let store = Arc::new(PgStore::new(pool.clone()));
            (AppState::new(store, config.clone()), Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            (AppState::new(Arc::new(MemoryStore::new()), config.clone()), None)
        }
    };

    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }
    tracing::info!("Server stopped");

    Ok(())
}
