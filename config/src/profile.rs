//! Validated configuration values shared between the synthesis and repair
//! crates.
//!
//! The printer envelope is modelled as an explicit [`BuildVolume`] value so
//! several printer profiles can coexist in one process.

use std::fmt;

use crate::constants::{DEFAULT_BUILD_VOLUME_MM, EPSILON};

/// Axis-aligned printable envelope in millimeters.
///
/// # Examples
/// ```
/// use config::BuildVolume;
///
/// let volume = BuildVolume::new(256.0, 256.0, 256.0).expect("valid volume");
/// assert_eq!(volume.as_array(), [256.0, 256.0, 256.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildVolume {
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub depth: f64,
    /// Extent along Z.
    pub height: f64,
}

impl BuildVolume {
    /// Builds a volume, rejecting non-positive or non-finite extents.
    pub fn new(width: f64, depth: f64, height: f64) -> Result<Self, ConfigError> {
        for (axis, value) in [("width", width), ("depth", depth), ("height", height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidBuildVolume { axis, value });
            }
        }
        Ok(Self {
            width,
            depth,
            height,
        })
    }

    /// Returns the extents as `[x, y, z]`.
    #[inline]
    pub fn as_array(&self) -> [f64; 3] {
        [self.width, self.depth, self.height]
    }

    /// Returns true when every dimension is within the envelope.
    pub fn fits(&self, dimensions: [f64; 3]) -> bool {
        dimensions
            .iter()
            .zip(self.as_array())
            .all(|(dim, limit)| *dim <= limit + EPSILON)
    }

    /// Uniform factor that makes `dimensions` fit, or `None` when they
    /// already fit. The factor is always `< 1.0`.
    ///
    /// # Examples
    /// ```
    /// use config::BuildVolume;
    ///
    /// let volume = BuildVolume::default();
    /// assert_eq!(volume.fit_scale([100.0, 50.0, 10.0]), None);
    /// assert_eq!(volume.fit_scale([440.0, 50.0, 10.0]), Some(0.5));
    /// ```
    pub fn fit_scale(&self, dimensions: [f64; 3]) -> Option<f64> {
        let factor = dimensions
            .iter()
            .zip(self.as_array())
            .filter(|(dim, limit)| **dim > *limit)
            .map(|(dim, limit)| limit / dim)
            .fold(f64::INFINITY, f64::min);
        (factor < 1.0).then_some(factor)
    }
}

impl Default for BuildVolume {
    fn default() -> Self {
        let [width, depth, height] = DEFAULT_BUILD_VOLUME_MM;
        Self {
            width,
            depth,
            height,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Raised when a build volume axis is not a positive finite number.
    InvalidBuildVolume {
        /// Offending axis name.
        axis: &'static str,
        /// Rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBuildVolume { axis, value } => {
                write!(f, "build volume {axis} must be positive: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
