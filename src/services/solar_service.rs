use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::error::CalculationError;
use crate::models::solar::SolarCalculation;
use crate::services::{annual_yield, orientation};

/// Typical whole-system derate (inverter, wiring, soiling, temperature).
pub const DEFAULT_EFFICIENCY_FACTOR: f64 = 0.75;

/// Reference irradiance at which panels are rated, kW/m².
pub const STC_IRRADIANCE_KW_M2: f64 = 1.0;

/// kWh/m²/yr of plane irradiation → kWh per kW installed per year.
pub const OUTPUT_SCALE: f64 = 1.0 / STC_IRRADIANCE_KW_M2;

/// Stateless orientation + yield calculator.
#[derive(Debug, Clone, Copy)]
pub struct SolarCalculator {
    efficiency_factor: f64,
}

impl Default for SolarCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_EFFICIENCY_FACTOR)
    }
}

impl SolarCalculator {
    pub fn new(efficiency_factor: f64) -> Self {
        Self { efficiency_factor }
    }

    pub fn efficiency_factor(&self) -> f64 {
        self.efficiency_factor
    }

    /// Calculates for today's date.
    pub fn calculate(
        &self,
        latitude: f64,
        longitude: f64,
        offset_angle: Option<f64>,
    ) -> Result<SolarCalculation, CalculationError> {
        self.calculate_on(latitude, longitude, offset_angle, Local::now().date_naive())
    }

    /// Same inputs and date always give an identical result.
    pub fn calculate_on(
        &self,
        latitude: f64,
        longitude: f64,
        offset_angle: Option<f64>,
        calculation_date: NaiveDate,
    ) -> Result<SolarCalculation, CalculationError> {
        validate(latitude, longitude, offset_angle)?;

        let orientation = orientation::solve(latitude, offset_angle);
        let annual = annual_yield::estimate_annual(
            latitude,
            orientation.optimal_pitch,
            orientation.optimal_azimuth,
        );
        let annual_solar_radiation = annual.radiation_kwh_m2;
        let estimated_annual_output = annual_solar_radiation * self.efficiency_factor * OUTPUT_SCALE;

        debug!(
            latitude,
            longitude,
            ?offset_angle,
            pitch = orientation.optimal_pitch,
            azimuth = orientation.optimal_azimuth,
            radiation = annual_solar_radiation,
            fallback = annual.is_fallback(),
            samples = annual.samples_used,
            excluded = annual.samples_excluded,
            "solar calculation"
        );

        Ok(SolarCalculation {
            latitude,
            longitude,
            offset_angle,
            optimal_pitch: orientation.optimal_pitch,
            optimal_azimuth: orientation.optimal_azimuth,
            annual_solar_radiation,
            daily_average_radiation: annual_solar_radiation / annual_yield::DAYS_PER_YEAR as f64,
            efficiency_factor: self.efficiency_factor,
            estimated_annual_output,
            radiation_source: annual.source,
            calculation_date,
        })
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    limit: f64,
    label: &str,
) -> Result<(), CalculationError> {
    if !value.is_finite() {
        return Err(CalculationError::NonFinite { field });
    }
    if !(-limit..=limit).contains(&value) {
        return Err(CalculationError::InvalidInput {
            field,
            message: format!("{} must be between -{} and {} degrees", label, limit, limit),
        });
    }
    Ok(())
}

fn validate(latitude: f64, longitude: f64, offset_angle: Option<f64>) -> Result<(), CalculationError> {
    check_range("latitude", latitude, 90.0, "Latitude")?;
    check_range("longitude", longitude, 180.0, "Longitude")?;
    if let Some(offset) = offset_angle {
        check_range("offset_angle", offset, 90.0, "Offset angle")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::annual_yield::RadiationSource;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn calc(lat: f64, lon: f64, offset: Option<f64>) -> SolarCalculation {
        SolarCalculator::default().calculate_on(lat, lon, offset, date()).unwrap()
    }

    #[test]
    fn test_new_york_with_offset() {
        let r = calc(40.7128, -74.0060, Some(5.0));
        assert!((r.optimal_pitch - 50.7128).abs() < 1e-9);
        assert_eq!(r.optimal_azimuth, 180.0);
        assert!(r.annual_solar_radiation > 0.0);
        assert_eq!(r.radiation_source, RadiationSource::ClearSky);
        assert_eq!(r.efficiency_factor, 0.75);
        assert_eq!(
            r.estimated_annual_output,
            r.annual_solar_radiation * 0.75 * OUTPUT_SCALE
        );
        assert!((r.daily_average_radiation * 365.0 - r.annual_solar_radiation).abs() < 1e-9);
    }

    #[test]
    fn test_sydney_faces_north() {
        let r = calc(-33.8688, 151.2093, None);
        assert_eq!(r.optimal_azimuth, 0.0);
        assert!((r.optimal_pitch - 28.8688).abs() < 1e-9);
    }

    #[test]
    fn test_equator_without_offset() {
        let r = calc(0.0, 0.0, None);
        assert_eq!(r.optimal_pitch, 5.0);
        assert_eq!(r.optimal_azimuth, 180.0);
        assert_eq!(r.offset_angle, None);
        assert!(r.annual_solar_radiation > 0.0);
    }

    #[rstest]
    #[case(85.0, 80.0, 90.0)]
    #[case(0.0, -90.0, 0.0)]
    fn test_pitch_clamps(#[case] lat: f64, #[case] offset: f64, #[case] expected: f64) {
        assert_eq!(calc(lat, 0.0, Some(offset)).optimal_pitch, expected);
    }

    #[test]
    fn test_fallback_at_89_9() {
        let r = calc(89.9, 10.0, None);
        assert_eq!(r.radiation_source, RadiationSource::EmpiricalFallback);
        assert!(r.annual_solar_radiation > 0.0);
        assert_eq!(r.optimal_pitch, 90.0);
    }

    #[test]
    fn test_idempotent() {
        let a = calc(52.52, 13.405, Some(-3.5));
        let b = calc(52.52, 13.405, Some(-3.5));
        assert_eq!(a, b);
        assert_eq!(
            a.annual_solar_radiation.to_bits(),
            b.annual_solar_radiation.to_bits()
        );
    }

    #[rstest]
    fn test_invariants_over_grid(
        #[values(-90.0, -89.9, -45.0, 0.0, 23.5, 66.6, 89.9, 90.0)] lat: f64,
        #[values(-180.0, 0.0, 180.0)] lon: f64,
        #[values(None, Some(-90.0), Some(90.0))] offset: Option<f64>,
    ) {
        let r = calc(lat, lon, offset);
        assert!((0.0..=90.0).contains(&r.optimal_pitch));
        assert!(r.optimal_azimuth == 0.0 || r.optimal_azimuth == 180.0);
        assert!(r.annual_solar_radiation.is_finite() && r.annual_solar_radiation >= 0.0);
        assert!(r.estimated_annual_output.is_finite() && r.estimated_annual_output >= 0.0);
    }

    #[rstest]
    #[case(100.0, 0.0, None, "latitude")]
    #[case(-90.5, 0.0, None, "latitude")]
    #[case(0.0, 200.0, None, "longitude")]
    #[case(40.0, 0.0, Some(200.0), "offset_angle")]
    fn test_out_of_range(
        #[case] lat: f64,
        #[case] lon: f64,
        #[case] offset: Option<f64>,
        #[case] field: &str,
    ) {
        let err = SolarCalculator::default()
            .calculate_on(lat, lon, offset, date())
            .unwrap_err();
        assert!(matches!(err, CalculationError::InvalidInput { .. }));
        assert_eq!(err.field(), field);
    }

    #[test]
    fn test_range_message() {
        let err = SolarCalculator::default().calculate(100.0, 0.0, None).unwrap_err();
        assert_eq!(err.to_string(), "Latitude must be between -90 and 90 degrees");
    }

    #[rstest]
    #[case(f64::NAN, 0.0, None)]
    #[case(0.0, f64::INFINITY, None)]
    #[case(0.0, 0.0, Some(f64::NEG_INFINITY))]
    fn test_non_finite_rejected(#[case] lat: f64, #[case] lon: f64, #[case] offset: Option<f64>) {
        let err = SolarCalculator::default()
            .calculate_on(lat, lon, offset, date())
            .unwrap_err();
        assert!(matches!(err, CalculationError::NonFinite { .. }));
    }

    #[test]
    fn test_serialized_rounding() {
        let r = calc(40.7128, -74.0060, Some(5.0));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["optimal_pitch"], 50.71);
        assert_eq!(json["optimal_azimuth"], 180.0);
        assert_eq!(json["radiation_source"], "clear_sky");
        assert_eq!(json["calculation_date"], "2024-06-01");
        assert_eq!(json["latitude"], 40.7128);
    }
}
