//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use tracing::{error, warn};

use super::schemas::{HealthInput, HealthPrediction, HealthResponse};
use crate::error::{FieldViolation, ModelError, ValidationError};
use crate::metrics;
use crate::model::{Prediction, Predictor};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared classifier handle.
    pub predictor: Arc<Predictor>,
    /// Version string attached to every prediction.
    pub model_version: Arc<str>,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(predictor: Arc<Predictor>, model_version: impl Into<Arc<str>>) -> Self {
        Self {
            predictor,
            model_version: model_version.into(),
            metrics: None,
        }
    }

    /// Expose metrics through `GET /metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Errors a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Request body failed validation (422).
    Validation(ValidationError),
    /// Classifier could not be acquired (500).
    Model(ModelError),
    /// Prediction task failed to complete (500).
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::Model(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => {
                metrics::inc_validation_failures();
                warn!("Rejected prediction request: {}", err);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": err.violations })),
                )
                    .into_response()
            }
            ApiError::Model(err) => {
                error!("Prediction failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": err.to_string() })),
                )
                    .into_response()
            }
            ApiError::Internal(reason) => {
                error!("Prediction task failed: {}", reason);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Prediction handler - validates the body, scores it, attaches the version.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<HealthPrediction>, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| ValidationError {
        violations: vec![FieldViolation::new("body", format!("invalid JSON: {}", e))],
    })?;
    let input = HealthInput::from_json(&value)?;

    let prediction = score(&state.predictor, input).await?;
    Ok(Json(HealthPrediction::new(
        prediction,
        state.model_version.as_ref(),
    )))
}

/// Prometheus metrics handler - 404 when no recorder is installed.
pub async fn metrics_text(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Run a prediction, moving the first (file-reading) load off the runtime.
async fn score(predictor: &Arc<Predictor>, input: HealthInput) -> Result<Prediction, ApiError> {
    let features = input.feature_vector();
    if predictor.is_loaded() {
        return Ok(predictor.predict(&features)?);
    }

    let predictor = Arc::clone(predictor);
    tokio::task::spawn_blocking(move || predictor.predict(&features))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}
