use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::solar::{CalculationRequest, ErrorBody, HealthStatus, SolarCalculation};
use crate::shared_state::AppState;

/// JSON number, or a string holding one.
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// POST /api/solar/calculate/
/// Calculate optimal panel angles
///
/// Returns the optimal tilt (pitch) and azimuth for a fixed panel at the
/// given location, plus the annual clear-sky plane-of-array radiation and
/// the resulting specific yield.
#[utoipa::path(
    post,
    path = "/api/solar/calculate/",
    request_body = CalculationRequest,
    responses(
        (status = 200, description = "Calculation result", body = SolarCalculation),
        (status = 400, description = "Missing, non-numeric or out-of-range input", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn calculate_solar_angles(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Result<Json<SolarCalculation>, ApiError> {
    let Json(request) = payload?;

    let (Some(lat), Some(lon)) = (request.latitude.as_ref(), request.longitude.as_ref()) else {
        return Err(ApiError::BadRequest(
            "latitude and longitude are required fields".to_string(),
        ));
    };
    let (Some(latitude), Some(longitude)) = (parse_number(lat), parse_number(lon)) else {
        return Err(ApiError::BadRequest(
            "latitude and longitude must be valid numbers".to_string(),
        ));
    };
    let offset_angle = match request.offset_angle.as_ref() {
        None => None,
        Some(v) => Some(parse_number(v).ok_or_else(|| {
            ApiError::BadRequest("offset_angle must be a valid number".to_string())
        })?),
    };

    // 365 samples of trigonometry: keep it off the async workers.
    let calculator = state.calculator;
    let outcome = tokio::task::spawn_blocking(move || {
        calculator.calculate(latitude, longitude, offset_angle)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    let result = outcome.inspect_err(|e| {
        warn!(field = e.field(), error = %e, "rejected calculation input");
    })?;

    info!(
        latitude,
        longitude,
        pitch = result.optimal_pitch,
        azimuth = result.optimal_azimuth,
        radiation = result.annual_solar_radiation,
        "[CALC] solar calculation served"
    );
    Ok(Json(result))
}

/// GET /api/health/
/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health/",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy".to_string(),
        service: "solar-panel-calculator".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}
