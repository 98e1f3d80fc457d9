//! JSON endpoints for the map front-end
//!
//! Handlers are thin: they hand the blocking prediction work to
//! `spawn_blocking` and translate the outcome into the payloads the page
//! expects.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    VizcastError,
    model::ModelRegistry,
    models::{PredictionResult, Waypoint},
    predictor::EnsemblePredictor,
    route::{self, RiskTier, RouteSegment, SegmentOutcome},
    weather::WeatherProvider,
};

/// Process-wide, read-only state shared by all requests
pub struct AppState {
    pub registry: ModelRegistry,
    pub provider: Box<dyn WeatherProvider>,
    pub waypoints: Vec<Waypoint>,
}

impl AppState {
    pub fn predictor(&self) -> EnsemblePredictor<'_> {
        EnsemblePredictor::new(&self.registry, self.provider.as_ref())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PredictRequest {
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip)]
    status: u16,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: None,
            status: status.as_u16(),
        }
    }
}

/// Clients get the short user-facing message; the full error stays in the logs.
impl From<VizcastError> for ApiError {
    fn from(err: VizcastError) -> Self {
        Self {
            error: err.user_message(),
            kind: Some(err.kind().to_string()),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// One route segment as drawn on the map.
///
/// Failed segments carry `error` and no prediction fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiRouteSegment {
    pub start: Waypoint,
    pub end: Waypoint,
    pub distance_km: f64,
    #[serde(rename = "VVN", skip_serializing_if = "Option::is_none")]
    pub vvn: Option<f64>,
    #[serde(rename = "VVX", skip_serializing_if = "Option::is_none")]
    pub vvx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RouteSegment> for ApiRouteSegment {
    fn from(segment: &RouteSegment) -> Self {
        let mut api = Self {
            start: segment.start.clone(),
            end: segment.end.clone(),
            distance_km: segment.distance_km,
            vvn: None,
            vvx: None,
            cloud_base: None,
            color: None,
            risk: None,
            error: None,
        };

        match &segment.outcome {
            SegmentOutcome::Assessed {
                prediction,
                cloud_base_m,
                risk,
            } => {
                api.vvn = Some(prediction.min_visibility);
                api.vvx = Some(prediction.max_visibility);
                api.cloud_base = Some(*cloud_base_m);
                api.color = Some(risk.color().to_string());
                api.risk = Some(*risk);
            }
            SegmentOutcome::Failed { error } => api.error = Some(error.clone()),
        }
        api
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/predict", post(predict))
        .route("/route", post(evaluate_route))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResult>, ApiError> {
    let location = request
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "No location provided"))?;

    let prediction = tokio::task::spawn_blocking(move || state.predictor().predict(&location))
        .await
        .map_err(|e| {
            error!("Prediction task failed: {}", e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Prediction task failed")
        })?
        .map_err(|e| {
            error!("Prediction failed ({}): {}", e.kind(), e);
            ApiError::from(e)
        })?;

    Ok(Json(prediction))
}

async fn evaluate_route(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ApiRouteSegment>>, ApiError> {
    let segments = tokio::task::spawn_blocking(move || {
        route::evaluate_route(&state.predictor(), &state.waypoints)
    })
    .await
    .map_err(|e| {
        error!("Route task failed: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Route evaluation failed")
    })?;

    Ok(Json(segments.iter().map(ApiRouteSegment::from).collect()))
}
