//! Flight Delay Prediction Service
//!
//! HTTP boundary over the trained delay model: liveness, batch prediction and
//! Prometheus metrics.

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use delay_pipeline::DelayPredictor;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use model_store::ModelStore;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
mod routes;

pub use config::{LogFormat, ServiceConfig};
pub use error::ApiError;

/// Application state shared across handlers
///
/// The predictor is immutable after startup, so handlers share it without locking.
pub struct AppState {
    pub predictor: DelayPredictor,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Present when a Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(predictor: DelayPredictor) -> Self {
        Self {
            predictor,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::get_health))
        .route("/predict", post(routes::predict::post_predict))
        .route("/metrics", get(routes::health::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging; the level comes from `RUST_LOG`, defaulting to `info`
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| anyhow::anyhow!("failed to set tracing subscriber: {err}"))
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install metrics recorder")?;
    metrics::describe_counter!(
        "delay_api_flights_predicted_total",
        "Flights labelled by the prediction endpoint"
    );
    metrics::describe_counter!(
        "delay_api_flights_delayed_total",
        "Flights labelled as delayed"
    );
    metrics::describe_counter!(
        "delay_api_rejected_requests_total",
        "Requests rejected with a client error"
    );
    Ok(handle)
}

/// Load the model and serve until interrupted
///
/// A missing or corrupt model artifact aborts startup.
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let store = ModelStore::new(&config.model_path);
    let predictor = DelayPredictor::load(&store)
        .with_context(|| format!("cannot load model artifact {}", config.model_path.display()))?;

    let state = AppState::new(predictor).with_metrics(install_metrics()?);
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.bind_addr))?;
    info!("Starting API server on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
