//! Saga worker entry point.

use std::future::Future;

use api::config::Config;
use tokio::signal;
use tokio::sync::watch;
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

/// Resolves once shutdown has been requested.
fn stopped(mut rx: watch::Receiver<bool>) -> impl Future<Output = ()> + Send {
    async move {
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Load configuration and build the worker
    let config = Config::from_env();
    tracing::info!(
        worker = %config.worker.worker_name,
        max_jobs_active = config.worker.max_jobs_active,
        correlation = %config.payment_request_correlation,
        "configuration loaded"
    );
    let state = api::create_default_state(&config).expect("failed to register job handlers");

    // 4. Fan the shutdown signal out to the worker and the server
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // 5. Start polling for jobs
    let worker = tokio::spawn({
        let state = state.clone();
        let rx = shutdown_rx.clone();
        async move { state.runtime.run(stopped(rx)).await }
    });

    // 6. Start server
    let app = api::create_app(state, metrics_handle);
    let addr = config.addr();
    tracing::info!(%addr, "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(stopped(shutdown_rx))
        .await
        .expect("server error");

    if let Err(e) = worker.await {
        tracing::error!(error = %e, "job worker task failed");
    }
    tracing::info!("shut down gracefully");
}
