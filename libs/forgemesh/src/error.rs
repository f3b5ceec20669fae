//! # Mesh Errors
//!
//! Error types for synthesis and print-prep operations. Every variant is
//! terminal for the call that produced it.

use thiserror::Error;

/// Errors that can occur while building or preparing a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Height grid is too small to form a closed solid.
    #[error("Insufficient resolution: {width}x{height} grid (need at least 2x2)")]
    InsufficientResolution { width: usize, height: usize },

    /// Height grid contains a NaN, negative or infinite value.
    #[error("Invalid height value {value} at row {row}, column {column}")]
    InvalidHeightValue { row: usize, column: usize, value: f64 },

    /// No polygon survived tracing, simplification and repair.
    #[error(
        "No extractable shape ({loops} contour loops found): try adjusting the threshold or inverting the image"
    )]
    NoExtractableShape { loops: usize },

    /// A stage produced or received a mesh with nothing usable in it.
    #[error("Degenerate mesh: {stage}")]
    DegenerateMesh { stage: String },

    /// A parameter is outside its accepted range.
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Polygon triangulation failed.
    #[error("Triangulation failed: {message}")]
    Triangulation { message: String },
}

impl MeshError {
    /// Creates a degenerate mesh error for the named stage.
    pub fn degenerate(stage: impl Into<String>) -> Self {
        Self::DegenerateMesh {
            stage: stage.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    /// Creates a triangulation error.
    pub fn triangulation(message: impl Into<String>) -> Self {
        Self::Triangulation {
            message: message.into(),
        }
    }
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Rejects values that are not strictly positive and finite.
pub(crate) fn require_positive(name: &'static str, value: f64) -> MeshResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::invalid_parameter(
            name,
            value,
            "must be a positive finite number",
        ))
    }
}

/// Rejects values that are negative or not finite.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> MeshResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MeshError::invalid_parameter(
            name,
            value,
            "must be a non-negative finite number",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::InsufficientResolution {
            width: 1,
            height: 5,
        };
        assert!(err.to_string().contains("1x5"));

        let err = MeshError::NoExtractableShape { loops: 0 };
        let message = err.to_string();
        assert!(message.contains("threshold"));
        assert!(message.contains("invert"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeshError>();
    }

    #[test]
    fn test_parameter_guards() {
        assert!(require_positive("height", 1.0).is_ok());
        assert!(require_positive("height", 0.0).is_err());
        assert!(require_positive("height", f64::INFINITY).is_err());
        assert!(require_non_negative("base", 0.0).is_ok());
        assert!(require_non_negative("base", -0.1).is_err());
    }
}
