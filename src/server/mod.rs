//! HTTP surface
//!
//! `/host-info`, `/write-test` and `/write-status` for the dashboard, plus
//! `/health`. CORS is fully permissive so the browser dashboard can poll
//! from any origin.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::bench::{RunTracker, StatusReporter, WriteBenchmark, WriteTestParams};
use crate::config::ServiceConfig;
use crate::host::HostProbe;
use crate::models::{HostResources, WriteTestSummary};
use crate::StressError;

/// State shared across routes
#[derive(Debug, Clone)]
pub struct AppState {
    benchmark: WriteBenchmark,
    reporter: StatusReporter,
    probe: HostProbe,
    default_count: i64,
    default_size_kb: i64,
}

impl AppState {
    /// Build the state with a fresh run tracker
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_tracker(config, RunTracker::new())
    }

    pub fn with_tracker(config: &ServiceConfig, tracker: RunTracker) -> Self {
        Self {
            benchmark: WriteBenchmark::new(config, tracker.clone()),
            reporter: StatusReporter::new(config, tracker),
            probe: HostProbe::new(config.cgroup_root.clone()),
            default_count: config.default_count,
            default_size_kb: config.default_size_kb,
        }
    }

    pub fn tracker(&self) -> &RunTracker {
        self.benchmark.tracker()
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(StressError);

impl From<StressError> for ApiError {
    fn from(err: StressError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StressError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            StressError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if !self.0.is_client_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct WriteTestQuery {
    pub count: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Create the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/host-info", get(host_info))
        .route("/write-test", get(write_test))
        .route("/write-status", get(write_status))
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// GET /host-info - CPU and memory totals and container limits
async fn host_info(State(state): State<AppState>) -> Result<Json<HostResources>, ApiError> {
    let probe = state.probe.clone();
    // cgroup files and sysinfo are read synchronously
    let resources = tokio::task::spawn_blocking(move || probe.detect())
        .await
        .map_err(StressError::from)?;
    Ok(Json(resources))
}

/// GET /write-test?count=N&size=KB - run the write benchmark to completion
async fn write_test(
    State(state): State<AppState>,
    query: Result<Query<WriteTestQuery>, QueryRejection>,
) -> Result<Json<WriteTestSummary>, ApiError> {
    let Query(query) = query.map_err(|e| StressError::InvalidArgument(e.body_text()))?;
    let params = WriteTestParams::new(
        query.count.unwrap_or(state.default_count),
        query.size.unwrap_or(state.default_size_kb),
    )?;

    let summary = state.benchmark.spawn_run(params).await?;
    Ok(Json(summary))
}

/// GET /write-status - progress log with a live line for an active run
async fn write_status(State(state): State<AppState>) -> Result<String, ApiError> {
    Ok(state.reporter.status().await?)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Bind the listener and serve until Ctrl-C
pub async fn serve(config: ServiceConfig) -> crate::Result<()> {
    let app = router(AppState::new(&config));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Rust backend listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
