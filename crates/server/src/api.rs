//! HTTP API for predictions, health checks and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use estimator_lib::{
    ErrorKind, HealthReporter, LifecycleManager, PredictionError, PriceEstimator, PropertyQuery,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub estimator: PriceEstimator,
    pub health: HealthReporter,
}

impl AppState {
    pub fn new(lifecycle: Arc<LifecycleManager>) -> Self {
        Self {
            estimator: PriceEstimator::new(lifecycle.clone()),
            health: HealthReporter::new(lifecycle),
        }
    }
}

/// Error body returned by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error_kind: ErrorKind,
    pub details: String,
}

/// Route-level failure with its HTTP mapping
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(kind: ErrorKind, details: impl Into<String>) -> Self {
        let status = match kind {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::ServiceNotReady => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::DimensionMismatch | ErrorKind::ModelInvocationFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            body: ErrorBody {
                error_kind: kind,
                details: details.into(),
            },
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        ApiError::new(err.kind(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorKind::InvalidInput, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct LocationsResponse {
    locations: Vec<String>,
    status: &'static str,
}

/// Price estimate for one property
async fn predict_home_price(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PropertyQuery>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(query) = payload?;
    let estimate = state.estimator.estimate(&query).await?;
    Ok(Json(estimate))
}

/// Known locations of the serving schema
async fn get_location_names(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let locations = state.estimator.locations().await?;
    Ok(Json(LocationsResponse {
        locations,
        status: "success",
    }))
}

/// Health check response - returns 200 if ready, 503 otherwise
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.health.status();

    let status_code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(status))
}

/// Explicit reload using the startup policy
async fn reload(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state
        .estimator
        .lifecycle()
        .reload()
        .await
        .map_err(|e| ApiError::new(ErrorKind::ServiceNotReady, e.to_string()))?;
    Ok(Json(state.health.status()))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/predict_home_price", post(predict_home_price))
        .route("/api/get_location_names", get(get_location_names))
        .route("/api/health", get(health))
        .route("/api/reload", post(reload))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
