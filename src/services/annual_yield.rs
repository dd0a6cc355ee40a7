//! ============================================================
//!  Annual Plane-of-Array Radiation Aggregator
//!
//!   1. One sample per calendar day (365), each at solar noon
//!   2. Per sample: position → clear-sky → tilted-plane projection
//!   3. Noon W/m² → daily kWh/m² via a fixed equivalent-sun-hours factor
//!   4. Sum → kWh/m²/yr
//!
//!  Fallback policy:
//!   - a failing sample is excluded, aggregation continues
//!   - if no sample succeeds the result comes from a latitude-only
//!     empirical curve and is flagged as such
//! ============================================================

use serde::Serialize;
use std::f64::consts::PI;
use tracing::warn;
#[cfg(feature = "verbose_log")]
use tracing::trace;
use utoipa::ToSchema;

use crate::services::solar_algorithm::{self, SampleError};

pub const DAYS_PER_YEAR: u32 = 365;

/// Peak-to-daily conversion: a 12 h day with a half-sine irradiance
/// profile delivers `peak · 12 · 2/π` Wh/m².
const EQUIVALENT_SUN_HOURS: f64 = 24.0 / PI;

/// Latitude-only daily insolation curve (|latitude| °, kWh/m²/day),
/// piecewise linear, strictly declining towards the poles.
const FALLBACK_DAILY_INSOLATION: [(f64, f64); 5] = [
    (0.0, 5.5),
    (23.5, 5.0),
    (45.0, 4.0),
    (60.0, 3.0),
    (90.0, 2.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RadiationSource {
    /// Integrated from the clear-sky pipeline.
    ClearSky,
    /// No usable sample; coarse latitude-only estimate.
    EmpiricalFallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualEstimate {
    /// kWh/m²/yr on the panel plane, never negative.
    pub radiation_kwh_m2: f64,
    pub source: RadiationSource,
    pub samples_used: u32,
    pub samples_excluded: u32,
}

impl AnnualEstimate {
    pub fn is_fallback(&self) -> bool {
        self.source == RadiationSource::EmpiricalFallback
    }
}

/// Running sum over day-samples.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    total_kwh_m2: f64,
    used: u32,
    excluded: u32,
    last_error: Option<SampleError>,
}

impl Tally {
    fn record(mut self, sample: Result<f64, SampleError>) -> Self {
        match sample {
            Ok(kwh) => {
                self.total_kwh_m2 += kwh;
                self.used += 1;
            }
            Err(e) => {
                self.excluded += 1;
                self.last_error = Some(e);
            }
        }
        self
    }
}

/// Daily kWh/m² contribution of one day, from its solar-noon sample.
fn daily_contribution(
    day_of_year: u32,
    latitude: f64,
    panel_tilt: f64,
    panel_azimuth: f64,
) -> Result<f64, SampleError> {
    let position = solar_algorithm::position(day_of_year, latitude)?;
    let irradiance = solar_algorithm::clear_sky_irradiance(position.elevation_deg);
    let sample = solar_algorithm::project(&irradiance, &position, panel_tilt, panel_azimuth)?;

    #[cfg(feature = "verbose_log")]
    trace!(
        day = day_of_year,
        elevation = sample.solar_elevation,
        incidence = sample.angle_of_incidence,
        ghi = irradiance.global_horizontal(),
        poa = sample.plane_irradiance,
        "noon sample"
    );

    let kwh = sample.plane_irradiance * EQUIVALENT_SUN_HOURS / 1000.0;
    if kwh.is_finite() && kwh >= 0.0 {
        Ok(kwh)
    } else {
        Err(SampleError::NonFinite("daily contribution"))
    }
}

#[cfg(not(feature = "parallel"))]
fn accumulate(latitude: f64, panel_tilt: f64, panel_azimuth: f64) -> Tally {
    (1..=DAYS_PER_YEAR)
        .map(|day| daily_contribution(day, latitude, panel_tilt, panel_azimuth))
        .fold(Tally::default(), Tally::record)
}

// Collect in day order, then sum sequentially: same bits as the serial path.
#[cfg(feature = "parallel")]
fn accumulate(latitude: f64, panel_tilt: f64, panel_azimuth: f64) -> Tally {
    use rayon::prelude::*;

    let daily: Vec<Result<f64, SampleError>> = (1..=DAYS_PER_YEAR)
        .into_par_iter()
        .map(|day| daily_contribution(day, latitude, panel_tilt, panel_azimuth))
        .collect();
    daily.into_iter().fold(Tally::default(), Tally::record)
}

/// Annual plane-of-array radiation (kWh/m²/yr) for a fixed panel.
///
/// Never fails: excluded samples are logged, and when nothing usable
/// remains the latitude-only fallback is returned.
pub fn estimate_annual(latitude: f64, panel_tilt: f64, panel_azimuth: f64) -> AnnualEstimate {
    let tally = accumulate(latitude, panel_tilt, panel_azimuth);

    if tally.used == 0 || !tally.total_kwh_m2.is_finite() {
        warn!(
            latitude,
            panel_tilt,
            excluded = tally.excluded,
            reason = ?tally.last_error,
            "no usable clear-sky samples, using empirical fallback"
        );
        return AnnualEstimate {
            radiation_kwh_m2: empirical_fallback(latitude),
            source: RadiationSource::EmpiricalFallback,
            samples_used: 0,
            samples_excluded: DAYS_PER_YEAR,
        };
    }

    if tally.excluded > 0 {
        warn!(
            latitude,
            panel_tilt,
            excluded = tally.excluded,
            reason = ?tally.last_error,
            "excluded degenerate day-samples from annual total"
        );
    }

    AnnualEstimate {
        radiation_kwh_m2: tally.total_kwh_m2.max(0.0),
        source: RadiationSource::ClearSky,
        samples_used: tally.used,
        samples_excluded: tally.excluded,
    }
}

/// Coarse annual insolation (kWh/m²/yr) from |latitude| alone.
/// Non-finite input is treated as a pole.
pub fn empirical_fallback(latitude: f64) -> f64 {
    let abs_lat = if latitude.is_finite() {
        latitude.abs().min(90.0)
    } else {
        90.0
    };

    let daily = FALLBACK_DAILY_INSOLATION
        .windows(2)
        .find(|w| abs_lat <= w[1].0)
        .map(|w| {
            let (lat0, v0) = w[0];
            let (lat1, v1) = w[1];
            v0 + (v1 - v0) * (abs_lat - lat0) / (lat1 - lat0)
        })
        .unwrap_or(FALLBACK_DAILY_INSOLATION[FALLBACK_DAILY_INSOLATION.len() - 1].1);

    daily * DAYS_PER_YEAR as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_york_clear_sky() {
        let r = estimate_annual(40.7128, 50.7128, 180.0);
        assert_eq!(r.source, RadiationSource::ClearSky);
        assert_eq!(r.samples_used, DAYS_PER_YEAR);
        assert_eq!(r.samples_excluded, 0);
        assert!(r.radiation_kwh_m2 > 1000.0, "got {:.1}", r.radiation_kwh_m2);
        println!("NYC annual POA: {:.0} kWh/m²", r.radiation_kwh_m2);
    }

    #[rstest]
    #[case(0.0, 5.0, 180.0)]
    #[case(45.0, 50.0, 180.0)]
    #[case(-45.0, 40.0, 0.0)]
    #[case(80.0, 85.0, 180.0)]
    #[case(-89.0, 84.0, 0.0)]
    #[case(89.9, 90.0, 180.0)]
    #[case(90.0, 90.0, 180.0)]
    #[case(-90.0, 85.0, 0.0)]
    fn test_non_negative_everywhere(#[case] lat: f64, #[case] tilt: f64, #[case] az: f64) {
        let r = estimate_annual(lat, tilt, az);
        assert!(r.radiation_kwh_m2.is_finite());
        assert!(r.radiation_kwh_m2 >= 0.0);
    }

    #[test]
    fn test_fallback_near_pole() {
        let r = estimate_annual(89.9, 90.0, 180.0);
        assert!(r.is_fallback());
        assert_eq!(r.samples_used, 0);
        assert_eq!(r.radiation_kwh_m2, empirical_fallback(89.9));
        assert!(r.radiation_kwh_m2 > 0.0);
    }

    #[test]
    fn test_just_outside_polar_cap_uses_clear_sky() {
        let r = estimate_annual(89.0, 90.0, 180.0);
        assert_eq!(r.source, RadiationSource::ClearSky);
        assert!(r.radiation_kwh_m2 > 0.0);
    }

    #[test]
    fn test_nan_tilt_falls_back_instead_of_failing() {
        let r = estimate_annual(40.0, f64::NAN, 180.0);
        assert!(r.is_fallback());
        assert_eq!(r.radiation_kwh_m2, empirical_fallback(40.0));
    }

    #[test]
    fn test_deterministic() {
        let a = estimate_annual(51.5, 56.5, 180.0);
        let b = estimate_annual(51.5, 56.5, 180.0);
        assert_eq!(a.radiation_kwh_m2.to_bits(), b.radiation_kwh_m2.to_bits());
    }

    #[test]
    fn test_hemispheres_are_mirror_images() {
        let north = estimate_annual(40.0, 35.0, 180.0).radiation_kwh_m2;
        let south = estimate_annual(-40.0, 35.0, 0.0).radiation_kwh_m2;
        assert!(((north - south) / north).abs() < 1e-9, "{} vs {}", north, south);
    }

    #[test]
    fn test_equator_facing_beats_pole_facing() {
        let toward = estimate_annual(50.0, 55.0, 180.0).radiation_kwh_m2;
        let away = estimate_annual(50.0, 55.0, 0.0).radiation_kwh_m2;
        assert!(toward > away);
    }

    #[test]
    fn test_tally_excludes_failed_samples() {
        let t = Tally::default()
            .record(Ok(2.0))
            .record(Err(SampleError::PolarDegenerate))
            .record(Ok(3.0));
        assert_eq!(t.total_kwh_m2, 5.0);
        assert_eq!(t.used, 2);
        assert_eq!(t.excluded, 1);
        assert_eq!(t.last_error, Some(SampleError::PolarDegenerate));
    }

    #[test]
    fn test_fallback_declines_with_latitude() {
        let mut previous = f64::INFINITY;
        for tenth in 0..=900 {
            let v = empirical_fallback(tenth as f64 / 10.0);
            assert!(v < previous, "not declining at {}", tenth);
            assert!(v > 0.0);
            previous = v;
        }
    }

    #[rstest]
    #[case(0.0, 5.5 * 365.0)]
    #[case(-45.0, 4.0 * 365.0)]
    #[case(90.0, 2.0 * 365.0)]
    #[case(f64::NAN, 2.0 * 365.0)]
    fn test_fallback_anchor_points(#[case] lat: f64, #[case] expected: f64) {
        assert!((empirical_fallback(lat) - expected).abs() < 1e-9);
    }
}
