//! API server entry point.

use std::sync::Arc;
use std::time::Duration;

use api::config::Config;
use api::routes::orders::AppState;
use domain::LifecycleEngine;
use domain::notify::LoggingGateway;
use order_store::{CachedCatalog, PostgresCatalog, PostgresOrderStore};
use reporting::ReportEngine;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve(app: axum::Router, addr: &str) {
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, admin endpoints are disabled");
    }

    let addr = config.addr();

    match config.database_url.clone() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await
                .expect("failed to connect to Postgres");

            let store = PostgresOrderStore::new(pool.clone());
            store.run_migrations().await.expect("migrations failed");

            let catalog = CachedCatalog::new(
                PostgresCatalog::new(pool),
                Duration::from_secs(config.catalog_cache_secs),
            );
            let state = Arc::new(AppState {
                lifecycle: LifecycleEngine::new(store.clone(), LoggingGateway::new()),
                reports: ReportEngine::new(store),
                catalog,
                config,
            });

            serve(api::create_app(state, metrics_handle), &addr).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, running with in-memory stores");
            let state = api::create_default_state(config);
            serve(api::create_app(state, metrics_handle), &addr).await;
        }
    }
}
