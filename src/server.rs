//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, service wiring and the Axum server
//! lifecycle.

use crate::application::services::{LinkService, LinkServiceConfig};
use crate::config::Config;
use crate::infrastructure::persistence::PgLinkRepository;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::Base62Generator;
use crate::utils::id_generator::UuidV7Generator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

const MAX_CONNECT_DELAY_SECS: u64 = 10;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (retried with exponential backoff)
/// - Apply migrations
/// - Link service with its generators
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails after all attempts
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations applied");

    let link_repository = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let link_service = LinkService::new(
        link_repository,
        Arc::new(Base62Generator::new()),
        Arc::new(UuidV7Generator::with_retries(config.id_generation_retries)),
        LinkServiceConfig {
            slug_length: config.slug_length,
            max_attempts: config.slug_max_attempts,
            store_timeout: config.store_timeout(),
        },
    );

    let state = AppState::new(
        Arc::new(link_service),
        &config.base_url,
        &config.service_name,
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(env = %config.app_env, "Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Delays between pool connection attempts: 500ms doubling up to 10s,
/// jittered, one fewer than `attempts`.
fn connect_backoff(attempts: u32) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(MAX_CONNECT_DELAY_SECS))
        .map(jitter)
        .take(attempts.saturating_sub(1) as usize)
}

/// Opens the pool, retrying with jittered exponential backoff.
async fn connect_pool(config: &Config) -> Result<PgPool> {
    let strategy = connect_backoff(config.db_connect_attempts);

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    Retry::start(strategy, || {
        let options = options.clone();
        async move {
            options
                .connect(&config.database_url)
                .await
                .inspect_err(|e| tracing::warn!(error = %e, "Database connection attempt failed"))
        }
    })
    .await
    .with_context(|| {
        format!(
            "Failed to connect to database after {} attempts",
            config.db_connect_attempts
        )
    })
}

/// Waits for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
