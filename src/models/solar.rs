use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

use crate::services::annual_yield::RadiationSource;

// ─── Request ─────────────────────────────────────────────────────────────────

/// Body of `POST /api/solar/calculate/`.
///
/// Fields are kept as raw JSON so that numeric strings (`"40.7"`) are
/// accepted and missing vs. malformed values get distinct messages.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CalculationRequest {
    #[serde(default)]
    #[schema(value_type = f64, example = 40.7128)]
    pub latitude: Option<serde_json::Value>,
    #[serde(default)]
    #[schema(value_type = f64, example = -74.006)]
    pub longitude: Option<serde_json::Value>,
    /// Angle between the mounting surface and horizontal (degrees)
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 5.0)]
    pub offset_angle: Option<serde_json::Value>,
}

// ─── Calculation output ──────────────────────────────────────────────────────

/// Result of one orientation + yield calculation. Recomputed per request,
/// never stored. Metrics keep full precision in memory and are rounded
/// to 2 decimals when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SolarCalculation {
    pub latitude: f64,
    pub longitude: f64,
    pub offset_angle: Option<f64>,
    /// Panel tilt from horizontal (degrees, 0..=90)
    #[serde(serialize_with = "round2")]
    pub optimal_pitch: f64,
    /// Panel facing direction, degrees from North (180 = south, 0 = north)
    #[serde(serialize_with = "round2")]
    pub optimal_azimuth: f64,
    /// Plane-of-array radiation (kWh/m²/yr)
    #[serde(serialize_with = "round2")]
    pub annual_solar_radiation: f64,
    /// Plane-of-array radiation (kWh/m²/day)
    #[serde(serialize_with = "round2")]
    pub daily_average_radiation: f64,
    /// System efficiency factor (0..1]
    pub efficiency_factor: f64,
    /// Specific yield (kWh per kW installed per year)
    #[serde(serialize_with = "round2")]
    pub estimated_annual_output: f64,
    pub radiation_source: RadiationSource,
    #[schema(value_type = String, format = Date)]
    pub calculation_date: NaiveDate,
}

fn round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}

// ─── REST API response types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
