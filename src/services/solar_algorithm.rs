//! ============================================================
//!  Solar Geometry & Clear-Sky Irradiance Engine (per sample)
//!
//!  Algorithm pipeline for one day-sample at local solar noon:
//!   1. Solar geometry  – declination (Cooper 1969), noon elevation,
//!                        noon sun azimuth
//!   2. Clear-sky model  – Meinel air-mass attenuation:
//!                         DNI, beam + diffuse on horizontal plane
//!   3. Panel tilt       – angle of incidence, isotropic-sky
//!                         transposition to plane-of-array irradiance
//! ============================================================

use std::f64::consts::PI;
use thiserror::Error;

// ─── Physical constants ──────────────────────────────────────
const SC: f64 = 1361.0; // Solar constant W/m²
const DEG: f64 = PI / 180.0;

/// Earth's axial tilt as used by the Cooper declination formula (degrees).
const MAX_DECLINATION_DEG: f64 = 23.45;

// Meinel & Meinel (1976): I = SC · 0.7^(AM^0.678)
const ATMOSPHERIC_TRANSMITTANCE: f64 = 0.7;
const AIR_MASS_EXPONENT: f64 = 0.678;

/// Diffuse horizontal irradiance as a fraction of direct normal.
const DIFFUSE_FRACTION: f64 = 0.1;

/// Floor for sin(elevation) in the air-mass term, keeps AM ≤ 1000.
const MIN_SIN_ELEVATION: f64 = 1e-3;

/// Inside this distance from a pole (degrees) the local meridian, and
/// therefore "solar noon", is undefined.
const POLAR_CAP_DEG: f64 = 0.5;

/// Tolerance before an out-of-range cosine is treated as a domain error
/// instead of float noise.
const COS_TOLERANCE: f64 = 1e-9;

// ─── Errors ──────────────────────────────────────────────────
/// Why a single day-sample could not be evaluated. Never leaves the
/// annual aggregator: failed samples are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleError {
    #[error("non-finite {0}")]
    NonFinite(&'static str),
    #[error("{what} out of domain: {value}")]
    DomainError { what: &'static str, value: f64 },
    #[error("solar noon undefined this close to a pole")]
    PolarDegenerate,
}

fn finite(value: f64, what: &'static str) -> Result<f64, SampleError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SampleError::NonFinite(what))
    }
}

// ─── 1. Solar geometry ───────────────────────────────────────

/// Sun position at local solar noon (hour angle 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    pub declination_deg: f64,
    pub elevation_deg: f64,
    /// Degrees from North, clockwise: 180 = sun due south, 0 = due north.
    pub azimuth_deg: f64,
}

/// Solar declination, Cooper (1969):
/// δ = 23.45° · sin(360° · (284 + n) / 365)
pub fn declination_deg(day_of_year: u32) -> f64 {
    let b = 360.0 * (284.0 + day_of_year as f64) / 365.0;
    MAX_DECLINATION_DEG * (b * DEG).sin()
}

/// Sun position at solar noon for `day_of_year` (1..=365) and latitude.
///
/// With the hour angle fixed at 0 the zenith angle reduces to
/// `|latitude − declination|`, so `elevation = 90° − |φ − δ|`.
/// A negative elevation (polar night) is a valid result, not an error.
pub fn position(day_of_year: u32, latitude_deg: f64) -> Result<SolarPosition, SampleError> {
    if !(1..=365).contains(&day_of_year) {
        return Err(SampleError::DomainError {
            what: "day of year",
            value: day_of_year as f64,
        });
    }
    let latitude_deg = finite(latitude_deg, "latitude")?;
    if 90.0 - latitude_deg.abs() < POLAR_CAP_DEG {
        return Err(SampleError::PolarDegenerate);
    }

    let declination_deg = declination_deg(day_of_year);
    let elevation_deg = finite(90.0 - (latitude_deg - declination_deg).abs(), "elevation")?;

    // Noon sun sits on the meridian, on the far side of the subsolar latitude.
    let azimuth_deg = if latitude_deg >= declination_deg { 180.0 } else { 0.0 };

    Ok(SolarPosition {
        declination_deg,
        elevation_deg,
        azimuth_deg,
    })
}

// ─── 2. Clear-sky irradiance ─────────────────────────────────

/// Clear-sky irradiance at one instant (W/m²).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearSkyIrradiance {
    /// Beam irradiance on a surface normal to the sun.
    pub direct_normal: f64,
    /// Beam irradiance on a horizontal surface.
    pub direct: f64,
    /// Diffuse irradiance on a horizontal surface.
    pub diffuse: f64,
}

impl ClearSkyIrradiance {
    pub fn global_horizontal(&self) -> f64 {
        self.direct + self.diffuse
    }
}

/// Clear-sky irradiance for a given solar elevation.
///
/// Sun at or below the horizon yields zero. Above it the air mass is
/// `1 / sin(elevation)` with sin floored at [`MIN_SIN_ELEVATION`], so
/// both components fade continuously to zero at the horizon and never
/// exceed `SC · 0.7` at the surface.
pub fn clear_sky_irradiance(elevation_deg: f64) -> ClearSkyIrradiance {
    if elevation_deg.is_nan() || elevation_deg <= 0.0 {
        return ClearSkyIrradiance::default();
    }
    let sin_alpha = (elevation_deg.min(90.0) * DEG).sin();
    let air_mass = 1.0 / sin_alpha.max(MIN_SIN_ELEVATION);

    let direct_normal = SC * ATMOSPHERIC_TRANSMITTANCE.powf(air_mass.powf(AIR_MASS_EXPONENT));

    ClearSkyIrradiance {
        direct_normal,
        direct: direct_normal * sin_alpha,
        diffuse: DIFFUSE_FRACTION * direct_normal,
    }
}

// ─── 3. Tilted plane projection ──────────────────────────────

/// One evaluated (day, solar noon) sample. Transient: produced and
/// folded away inside a single aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrradianceSample {
    pub solar_elevation: f64,
    pub angle_of_incidence: f64,
    /// Plane-of-array irradiance (W/m²)
    pub plane_irradiance: f64,
}

/// Angle between the sun vector and the panel normal (degrees).
///
/// cos θ = sin α · cos β + cos α · sin β · cos(γ_sun − γ_panel)
pub fn angle_of_incidence_deg(
    elevation_deg: f64,
    sun_azimuth_deg: f64,
    panel_tilt_deg: f64,
    panel_azimuth_deg: f64,
) -> Result<f64, SampleError> {
    let alpha = elevation_deg * DEG;
    let tilt = panel_tilt_deg * DEG;
    let az_diff = (sun_azimuth_deg - panel_azimuth_deg) * DEG;

    let cos_theta = finite(
        alpha.sin() * tilt.cos() + alpha.cos() * tilt.sin() * az_diff.cos(),
        "cos(angle of incidence)",
    )?;
    if cos_theta.abs() > 1.0 + COS_TOLERANCE {
        return Err(SampleError::DomainError {
            what: "cos(angle of incidence)",
            value: cos_theta,
        });
    }
    Ok(cos_theta.clamp(-1.0, 1.0).acos() / DEG)
}

/// Projects clear-sky irradiance onto a tilted, oriented panel.
///
/// Beam: `DNI · max(cos θ, 0)`. Diffuse: isotropic sky,
/// `DHI · (1 + cos β) / 2`. The sum is never negative.
pub fn project(
    irradiance: &ClearSkyIrradiance,
    position: &SolarPosition,
    panel_tilt_deg: f64,
    panel_azimuth_deg: f64,
) -> Result<IrradianceSample, SampleError> {
    let theta_deg = angle_of_incidence_deg(
        position.elevation_deg,
        position.azimuth_deg,
        panel_tilt_deg,
        panel_azimuth_deg,
    )?;

    let plane_irradiance = if position.elevation_deg > 0.0 {
        let beam_poa = irradiance.direct_normal * (theta_deg * DEG).cos().max(0.0);
        let diffuse_poa = irradiance.diffuse * (1.0 + (panel_tilt_deg * DEG).cos()) / 2.0;
        finite((beam_poa + diffuse_poa).max(0.0), "plane irradiance")?
    } else {
        0.0
    };

    Ok(IrradianceSample {
        solar_elevation: position.elevation_deg,
        angle_of_incidence: theta_deg,
        plane_irradiance,
    })
}
