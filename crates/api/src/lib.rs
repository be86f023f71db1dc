//! HTTP server for the room-service ordering system.
//!
//! Exposes guest submission, admin review, catalog management, and weekly
//! demand reports, with structured logging (tracing) and Prometheus
//! metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post, put};
use domain::notify::LoggingGateway;
use domain::LifecycleEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{CachedCatalog, CatalogStore, InMemoryCatalog, InMemoryOrderStore, OrderStore};
use reporting::ReportEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, C>(state: Arc<AppState<S, C>>, metrics_handle: PrometheusHandle) -> Router
where
    S: OrderStore + 'static,
    C: CatalogStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S, C>))
        .route("/orders", get(routes::orders::list::<S, C>))
        .route("/orders/purge", post(routes::orders::purge::<S, C>))
        .route("/orders/{id}", get(routes::orders::get::<S, C>))
        .route("/orders/{id}/confirm", post(routes::orders::confirm::<S, C>))
        .route("/orders/{id}/reject", post(routes::orders::reject::<S, C>))
        .route(
            "/orders/{id}/items",
            put(routes::orders::replace_items::<S, C>),
        )
        .route("/reports/weekly", get(routes::reports::weekly::<S, C>))
        .route(
            "/reports/weekly/grouped",
            get(routes::reports::grouped::<S, C>),
        )
        .route("/items", get(routes::catalog::list::<S, C>))
        .route("/items", post(routes::catalog::create::<S, C>))
        .route("/items/bulk", post(routes::catalog::create_bulk::<S, C>))
        .route("/items/{id}", put(routes::catalog::rename::<S, C>))
        .route("/items/{id}", delete(routes::catalog::remove::<S, C>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// In-memory state for single-process runs and tests.
pub fn create_default_state(
    config: Config,
) -> Arc<AppState<InMemoryOrderStore, CachedCatalog<InMemoryCatalog>>> {
    let store = InMemoryOrderStore::new();
    let catalog = CachedCatalog::new(
        InMemoryCatalog::new(),
        Duration::from_secs(config.catalog_cache_secs),
    );

    Arc::new(AppState {
        lifecycle: LifecycleEngine::new(store.clone(), LoggingGateway::new()),
        reports: ReportEngine::new(store),
        catalog,
        config,
    })
}
