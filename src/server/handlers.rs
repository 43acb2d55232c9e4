//! Per-capability request handlers.
//!
//! Every handler runs the same lifecycle: validate the caller's query,
//! resolve the forecast window (weather forecast only), build and issue the
//! upstream request, normalize the envelope. Every failure is caught here and
//! mapped to a JSON error body; nothing reaches axum's default error path.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::core::error::{GatewayError, NormalizationKind};
use crate::server::AppState;
use crate::upstreams::caller::CallerRequest;
use crate::upstreams::envelope::normalize;
use crate::upstreams::forecast::ForecastWindow;
use crate::upstreams::request::build_request;
use crate::upstreams::target::Capability;
use crate::{debug, error, info};

/// Caller-facing failure: status plus `{ "error", "kind" }` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    /// Maps a failure of `capability` to what the caller sees.
    ///
    /// Validation messages pass through; everything else gets a generic
    /// per-capability message, the cause staying in the operator log.
    pub fn from_failure(capability: Capability, err: &GatewayError) -> Self {
        let label = capability.label();
        let (status, kind, message) = match err {
            GatewayError::Validation { message, .. } => (StatusCode::BAD_REQUEST, "validation", message.clone()),
            GatewayError::UpstreamTransport { timed_out: true, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_timeout",
                format!("Failed to retrieve data from the {} service (timed out)", label),
            ),
            GatewayError::UpstreamTransport { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_unavailable",
                format!("Failed to retrieve data from the {} service", label),
            ),
            GatewayError::Normalization(n) => {
                let message = match n.kind {
                    NormalizationKind::PathNotFound => {
                        format!("Invalid upstream response: the {} service returned no usable data", label)
                    }
                    NormalizationKind::Malformed => {
                        format!("Invalid upstream response: the {} service returned a malformed response", label)
                    }
                    NormalizationKind::UpstreamErrorEnvelope => {
                        format!("The {} service rejected the request", label)
                    }
                };
                (StatusCode::INTERNAL_SERVER_ERROR, n.kind.as_str(), message)
            }
            GatewayError::Unavailable { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unavailable",
                format!("The {} service is not configured on this server", label),
            ),
            GatewayError::ConfigError(_) | GatewayError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                format!("Failed to retrieve data from the {} service", label),
            ),
        };
        Self { status, kind, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message, "kind": self.kind }))).into_response()
    }
}

/// Runs one capability end to end and returns the normalized payload.
pub async fn dispatch(state: &AppState, request: CallerRequest) -> Result<Value, GatewayError> {
    let capability = request.capability;

    // RECEIVED -> VALIDATED
    request.validate()?;
    let target = state.catalog.get(capability)?;

    // VALIDATED -> UPSTREAM_CALLED
    let window = match capability {
        Capability::WeatherForecast => Some(ForecastWindow::resolve((state.clock)())),
        _ => None,
    };
    if let Some(w) = &window {
        debug!(state.logger, "Forecast window resolved", "tmFc" => w.reference_timestamp());
    }

    let upstream_request = build_request(&target, &request.params, window.as_ref())?;
    let response = state.client.fetch(&upstream_request).await?;

    // UPSTREAM_CALLED -> RESPONDED
    Ok(normalize(&response, &target)?)
}

async fn respond(state: &AppState, capability: Capability, raw: HashMap<String, String>) -> Response {
    debug!(state.logger, "Request received", "capability" => capability.as_str());

    match dispatch(state, CallerRequest::new(capability, raw)).await {
        Ok(payload) => {
            debug!(state.logger, "Request completed", "capability" => capability.as_str());
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            let api_error = ApiError::from_failure(capability, &err);
            if api_error.status == StatusCode::BAD_REQUEST {
                info!(
                    state.logger,
                    "Request rejected",
                    "capability" => capability.as_str(),
                    "reason" => err.to_string()
                );
            } else {
                error!(
                    state.logger,
                    "Request failed",
                    "capability" => capability.as_str(),
                    "kind" => api_error.kind,
                    "error" => err.to_string()
                );
            }
            api_error.into_response()
        }
    }
}

pub async fn fertilizer(State(state): State<AppState>, Query(params): Query<HashMap<String, String>>) -> Response {
    respond(&state, Capability::Fertilizer, params).await
}

pub async fn weather_forecast(State(state): State<AppState>, Query(params): Query<HashMap<String, String>>) -> Response {
    respond(&state, Capability::WeatherForecast, params).await
}

pub async fn weather_observation(State(state): State<AppState>, Query(params): Query<HashMap<String, String>>) -> Response {
    respond(&state, Capability::WeatherObservation, params).await
}

pub async fn pest(State(state): State<AppState>, Query(params): Query<HashMap<String, String>>) -> Response {
    respond(&state, Capability::Pest, params).await
}

/// Reports which capabilities are usable.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let unavailable: HashMap<Capability, String> = state.catalog.unavailable().into_iter().collect();

    let mut capabilities = Map::new();
    for capability in Capability::ALL {
        let entry = match unavailable.get(&capability) {
            Some(reason) => json!({ "available": false, "reason": reason }),
            None => json!({ "available": true }),
        };
        capabilities.insert(capability.as_str().to_string(), entry);
    }

    let status = if unavailable.is_empty() { "ok" } else { "degraded" };
    Json(json!({ "status": status, "capabilities": capabilities }))
}
