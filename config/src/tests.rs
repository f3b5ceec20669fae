//! # Tests for Config
//!
//! Unit tests verifying configuration constants and validated profiles.

use crate::constants::*;
use crate::profile::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON > 0.0, "EPSILON must be positive");
}

#[test]
fn test_area_epsilon_is_small() {
    assert!(AREA_EPSILON < MIN_POLYGON_AREA);
}

// =============================================================================
// BUILD VOLUME TESTS
// =============================================================================

#[test]
fn test_default_build_volume() {
    let volume = BuildVolume::default();
    assert_eq!(volume.as_array(), DEFAULT_BUILD_VOLUME_MM);
}

#[test]
fn test_build_volume_rejects_invalid_axes() {
    assert_eq!(
        BuildVolume::new(0.0, 10.0, 10.0).unwrap_err(),
        ConfigError::InvalidBuildVolume {
            axis: "width",
            value: 0.0
        }
    );
    assert!(BuildVolume::new(10.0, f64::NAN, 10.0).is_err());
    assert!(BuildVolume::new(10.0, 10.0, -1.0).is_err());
}

#[test]
fn test_fits_on_boundary() {
    let volume = BuildVolume::new(100.0, 100.0, 50.0).unwrap();
    assert!(volume.fits([100.0, 100.0, 50.0]));
    assert!(!volume.fits([100.0, 100.5, 50.0]));
}

#[test]
fn test_fit_scale_uses_tightest_axis() {
    let volume = BuildVolume::new(100.0, 100.0, 100.0).unwrap();
    let factor = volume.fit_scale([200.0, 400.0, 50.0]).unwrap();
    assert!((factor - 0.25).abs() < 1e-12);
}

#[test]
fn test_fit_scale_never_scales_up() {
    let volume = BuildVolume::new(100.0, 100.0, 100.0).unwrap();
    assert_eq!(volume.fit_scale([10.0, 10.0, 10.0]), None);
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::InvalidBuildVolume {
        axis: "depth",
        value: -2.0,
    };
    assert!(err.to_string().contains("depth"));
}
