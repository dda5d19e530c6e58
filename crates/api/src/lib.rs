//! Saga worker process.
//!
//! Runs the saga participant handlers against an in-memory engine and
//! exposes a small HTTP surface: health, Prometheus metrics and sandbox
//! endpoints to create jobs, inspect their state, cancel process
//! instances and list published messages.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::sync::atomic::AtomicI64;

use axum::Router;
use axum::routing::{delete, get, post};
use engine_client::InMemoryEngine;
use ledger::InMemoryCreditLedger;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use workers::{HandlerRegistry, InMemoryPaymentGateway, JobWorkerRuntime, RegistryError};

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub engine: InMemoryEngine,
    pub ledger: InMemoryCreditLedger,
    pub gateway: InMemoryPaymentGateway,
    pub runtime: JobWorkerRuntime<InMemoryEngine>,
    /// Next process instance key handed out when a job request names none.
    pub next_process_instance: AtomicI64,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/jobs", post(routes::jobs::create))
        .route("/jobs/{key}", get(routes::jobs::get))
        .route(
            "/process-instances/{key}",
            delete(routes::jobs::cancel_process_instance),
        )
        .route("/messages", get(routes::jobs::messages))
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

/// Creates the default application state: in-memory engine, ledger and
/// payment gateway with all saga participants registered.
pub fn create_default_state(config: &Config) -> Result<Arc<AppState>, RegistryError> {
    let engine = InMemoryEngine::new();
    let ledger = InMemoryCreditLedger::new();
    let gateway = InMemoryPaymentGateway::new();

    let registry = HandlerRegistry::saga_participants(
        engine.clone(),
        ledger.clone(),
        gateway.clone(),
        config.payment_request_correlation.clone(),
    )?;
    let runtime = JobWorkerRuntime::new(engine.clone(), registry, config.worker.clone());

    Ok(Arc::new(AppState {
        engine,
        ledger,
        gateway,
        runtime,
        next_process_instance: AtomicI64::new(1),
    }))
}
