pub mod config;
pub mod db_mongo;
pub mod error;
pub mod health;
pub mod registration;
pub mod seed;
pub mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::{get, post}};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, redact_uri},
    error::AppResult,
    health::health_check,
    registration::create_user,
    store::{MongoStore, RecordStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/user", post(create_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(?config, "configuration loaded");

    let connection = db_mongo::connect(&config.mongodb_uri, config.connect_timeout)
        .await
        .with_context(|| format!("Failed to connect to {}", redact_uri(&config.mongodb_uri)))?;

    let store = Arc::new(MongoStore::new(
        connection.client().clone(),
        config.operation_timeout,
    ));

    finish_with_release(serve(&config, store), connection.release()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Await `work`, then `release` however `work` ended.
async fn finish_with_release<W, R>(work: W, release: R) -> Result<()>
where
    W: Future<Output = Result<()>>,
    R: Future<Output = AppResult<()>>,
{
    let outcome = work.await;
    let released = release.await;

    outcome?;
    released.context("Failed to release MongoDB connection")?;
    Ok(())
}

/// Seed (when enabled), then bind and serve until a shutdown signal.
/// A seed failure returns before the listener is bound.
async fn serve(config: &Config, store: Arc<dyn RecordStore>) -> Result<()> {
    if config.seed_demo_data {
        let report = seed::run_demo_inserts(store.as_ref())
            .await
            .context("Failed to seed demo marks")?;
        tracing::info!(
            single = %report.single_id,
            batch = report.batch_ids.len(),
            "demo marks seeded"
        );
    }

    let app = build_router(AppState::new(store));

    let listener = TcpListener::bind(config.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::warn!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    use super::*;
    use crate::{error::AppError, store::memory::MemoryStore};

    fn free_addr() -> SocketAddr {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    }

    fn seeding_config(server_addr: SocketAddr) -> Config {
        Config {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            server_addr,
            connect_timeout: Duration::from_secs(30),
            operation_timeout: Duration::from_secs(10),
            seed_demo_data: true,
        }
    }

    #[tokio::test]
    async fn test_seed_failure_stops_before_bind() {
        let addr = free_addr();
        let config = seeding_config(addr);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve(&config, Arc::new(MemoryStore::failing())),
        )
        .await
        .expect("serve should return on seed failure");

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Failed to seed demo marks");
        // nothing was listening on the configured address
        assert!(std::net::TcpListener::bind(addr).is_ok());
    }

    #[tokio::test]
    async fn test_release_runs_when_work_fails() {
        let released = AtomicBool::new(false);

        let result = finish_with_release(
            async { Err(anyhow::anyhow!("seed failed")) },
            async {
                released.store(true, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert!(result.is_err());
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_release_failure_is_reported() {
        let result = finish_with_release(async { Ok(()) }, async {
            Err(AppError::Disconnect("timed out".to_string()))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Failed to release MongoDB connection");
    }
}
