//! Optimal fixed-panel orientation, Liu & Jordan style:
//! tilt ≈ |latitude| biased towards the winter sun, facing the equator.
//!
//! Pure function of latitude and ground offset; independent of the
//! irradiance pipeline.

/// Seasonal bias added to the base tilt (degrees).
/// Positive in the Northern Hemisphere, negative in the Southern.
pub const SEASONAL_ADJUSTMENT_DEG: f64 = 5.0;

pub const MIN_TILT_DEG: f64 = 0.0;
pub const MAX_TILT_DEG: f64 = 90.0;

/// Panel facing due south (degrees from North).
pub const AZIMUTH_SOUTH: f64 = 180.0;
/// Panel facing due north.
pub const AZIMUTH_NORTH: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationResult {
    /// Tilt from horizontal, always within [0, 90].
    pub optimal_pitch: f64,
    /// Either 180 (south) or 0 (north).
    pub optimal_azimuth: f64,
}

/// The equator counts as Northern Hemisphere.
pub fn is_northern(latitude: f64) -> bool {
    latitude >= 0.0
}

pub fn solve(latitude: f64, offset_angle: Option<f64>) -> OrientationResult {
    let base_tilt = latitude.abs();
    let seasonal_adjustment = if is_northern(latitude) {
        SEASONAL_ADJUSTMENT_DEG
    } else {
        -SEASONAL_ADJUSTMENT_DEG
    };
    let offset = offset_angle.unwrap_or(0.0);

    let optimal_pitch = (base_tilt + seasonal_adjustment + offset).clamp(MIN_TILT_DEG, MAX_TILT_DEG);
    let optimal_azimuth = if is_northern(latitude) {
        AZIMUTH_SOUTH
    } else {
        AZIMUTH_NORTH
    };

    OrientationResult {
        optimal_pitch,
        optimal_azimuth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(40.7128, 180.0)]
    #[case(-33.8688, 0.0)]
    #[case(0.0, 180.0)]
    #[case(-0.0001, 0.0)]
    #[case(90.0, 180.0)]
    #[case(-90.0, 0.0)]
    fn test_azimuth_faces_equator(#[case] lat: f64, #[case] expected: f64) {
        assert_eq!(solve(lat, None).optimal_azimuth, expected);
    }

    #[test]
    fn test_equator_tie_break_is_northern() {
        let r = solve(0.0, None);
        assert_eq!(r.optimal_pitch, 5.0);
        assert_eq!(r.optimal_azimuth, 180.0);
    }

    #[rstest]
    #[case(40.7128, Some(5.0), 40.7128 + 10.0)]
    #[case(30.0, Some(15.0), 50.0)]
    #[case(40.0, None, 45.0)]
    #[case(-33.8688, None, 33.8688 - 5.0)]
    #[case(-2.0, None, 0.0)]
    fn test_pitch(#[case] lat: f64, #[case] offset: Option<f64>, #[case] expected: f64) {
        let r = solve(lat, offset);
        assert!((r.optimal_pitch - expected).abs() < 1e-9, "got {}", r.optimal_pitch);
    }

    #[rstest]
    #[case(85.0, Some(80.0), 90.0)]
    #[case(0.0, Some(-90.0), 0.0)]
    #[case(-90.0, Some(90.0), 90.0)]
    #[case(-10.0, Some(-90.0), 0.0)]
    fn test_pitch_is_clamped(#[case] lat: f64, #[case] offset: Option<f64>, #[case] expected: f64) {
        assert_eq!(solve(lat, offset).optimal_pitch, expected);
    }

    #[test]
    fn test_pitch_range_over_grid() {
        for lat in (-90..=90).map(|l| l as f64) {
            for offset in (-90..=90).step_by(15).map(|o| o as f64) {
                let p = solve(lat, Some(offset)).optimal_pitch;
                assert!((0.0..=90.0).contains(&p), "lat {} offset {} -> {}", lat, offset, p);
            }
        }
    }
}
