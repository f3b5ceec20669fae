//! # Mesh Repair & Print-Prep
//!
//! Brings an arbitrary mesh into a printable placement. Stages run in a
//! fixed order and each is a pure transform that takes the mesh by value:
//!
//! 1. [`auto_orient`]: principal axis to vertical
//! 2. [`remove_floating_bodies`]: drop bodies below a volume ratio
//! 3. [`scale_to_height`]: uniform scale to a target Z extent
//! 4. center on X = Y = 0 and ground at Z = 0
//! 5. [`add_base_plate`]: optional padded plate underneath
//! 6. [`fit_to_build_volume`]: optional downscale into the printer envelope
//!
//! Orientation happens before the original dimensions are recorded, so the
//! report compares upright sizes.

pub mod bodies;
pub mod orient;
pub mod placement;

#[cfg(test)]
mod tests;

use config::constants::{
    DEFAULT_BASE_PADDING_MM, DEFAULT_MIN_BODY_RATIO, DEFAULT_TARGET_HEIGHT_MM,
    UPRIGHT_ALIGNMENT_COSINE,
};
use config::BuildVolume;
use serde::{Deserialize, Serialize};

pub use bodies::{
    body_triangles, body_volume, remove_floating_bodies, split_bodies, BodyVolume, FloatingRemoval,
    VolumeSource,
};
pub use orient::{auto_orient, principal_axis, rotation_to_vertical};
pub use placement::{add_base_plate, fit_to_build_volume, scale_to_height};

use crate::error::{require_non_negative, require_positive, MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::validate::is_watertight;

/// Parameters for [`repair_mesh`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairParams {
    /// Rotate the principal axis to vertical
    pub auto_orient: bool,
    /// |cos| between principal axis and Z above which no rotation happens
    pub upright_cosine: f64,
    /// Drop bodies smaller than `min_body_ratio` of the largest
    pub remove_floating: bool,
    pub min_body_ratio: f64,
    /// Vertical extent after scaling (mm); `None` keeps the current size
    pub target_height: Option<f64>,
    /// Base plate thickness (mm); 0 disables the plate
    pub base_height: f64,
    /// Plate margin around the footprint (mm)
    pub base_padding: f64,
    /// Downscale into the build volume when any axis overflows
    pub fit_to_build_volume: bool,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            auto_orient: true,
            upright_cosine: UPRIGHT_ALIGNMENT_COSINE,
            remove_floating: true,
            min_body_ratio: DEFAULT_MIN_BODY_RATIO,
            target_height: Some(DEFAULT_TARGET_HEIGHT_MM),
            base_height: 0.0,
            base_padding: DEFAULT_BASE_PADDING_MM,
            fit_to_build_volume: false,
        }
    }
}

impl RepairParams {
    /// Checks every numeric field.
    pub fn validate(&self) -> MeshResult<()> {
        if !(self.upright_cosine > 0.0 && self.upright_cosine <= 1.0) {
            return Err(MeshError::invalid_parameter(
                "upright_cosine",
                self.upright_cosine,
                "must be in (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_body_ratio) {
            return Err(MeshError::invalid_parameter(
                "min_body_ratio",
                self.min_body_ratio,
                "must be in [0, 1]",
            ));
        }
        if let Some(height) = self.target_height {
            require_positive("target_height", height)?;
        }
        require_non_negative("base_height", self.base_height)?;
        require_non_negative("base_padding", self.base_padding)
    }
}

/// What [`repair_mesh`] did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Dimensions after orientation, before any other stage.
    pub original_dims: [f64; 3],
    pub final_dims: [f64; 3],
    /// Factor applied by the target-height stage, 1.0 when skipped.
    pub scale_factor: f64,
    /// Upright rotation in degrees, when one was applied.
    pub rotation_degrees: Option<f64>,
    /// Bodies measured by the floating-piece filter.
    pub bodies: Vec<BodyVolume>,
    pub removed_bodies: usize,
    /// Bodies measured by bounding box instead of enclosed volume.
    pub volume_fallbacks: usize,
    /// Build-volume downscale factor, when one was applied.
    pub fit_factor: Option<f64>,
    pub original_triangles: usize,
    pub triangle_count: usize,
    pub watertight: bool,
    pub fits_build_volume: bool,
}

/// Runs every enabled stage on `mesh`.
///
/// # Errors
///
/// [`MeshError::DegenerateMesh`] for a mesh without triangles or one that
/// has no height to scale; parameter errors from [`RepairParams::validate`].
///
/// # Example
///
/// ```rust
/// use config::BuildVolume;
/// use forgemesh::primitives::create_box;
/// use forgemesh::repair::{repair_mesh, RepairParams};
/// use glam::DVec3;
///
/// let tower = create_box(DVec3::new(10.0, 10.0, 40.0), true).unwrap();
/// let (mesh, report) = repair_mesh(tower, &RepairParams::default(), &BuildVolume::default()).unwrap();
/// assert!((mesh.dimensions().z - 80.0).abs() < 1e-9);
/// assert!((report.scale_factor - 2.0).abs() < 1e-9);
/// assert!(report.fits_build_volume);
/// ```
pub fn repair_mesh(
    mesh: Mesh,
    params: &RepairParams,
    build_volume: &BuildVolume,
) -> MeshResult<(Mesh, RepairReport)> {
    params.validate()?;
    if mesh.is_empty() {
        return Err(MeshError::degenerate("repair: mesh has no triangles"));
    }

    let (mut mesh, rotation_degrees) = if params.auto_orient {
        auto_orient(mesh, params.upright_cosine)
    } else {
        (mesh, None)
    };

    let original_dims = mesh.dimensions().to_array();
    let original_triangles = mesh.triangle_count();

    let mut bodies = Vec::new();
    let mut removed_bodies = 0;
    let mut volume_fallbacks = 0;
    if params.remove_floating {
        let outcome = remove_floating_bodies(mesh, params.min_body_ratio);
        volume_fallbacks = outcome.fallback_count();
        removed_bodies = outcome.removed;
        bodies = outcome.bodies;
        mesh = outcome.mesh;
    }

    let mut scale_factor = 1.0;
    if let Some(target) = params.target_height {
        let (scaled, factor) = scale_to_height(mesh, target)?;
        mesh = scaled;
        scale_factor = factor;
    }

    mesh.center_and_ground();

    if params.base_height > 0.0 {
        mesh = add_base_plate(mesh, params.base_height, params.base_padding)?;
        mesh.center_and_ground();
    }

    let mut fit_factor = None;
    if params.fit_to_build_volume {
        let (fitted, factor) = fit_to_build_volume(mesh, build_volume);
        mesh = fitted;
        fit_factor = factor;
    }

    let final_dims = mesh.dimensions().to_array();
    let report = RepairReport {
        original_dims,
        final_dims,
        scale_factor,
        rotation_degrees,
        bodies,
        removed_bodies,
        volume_fallbacks,
        fit_factor,
        original_triangles,
        triangle_count: mesh.triangle_count(),
        watertight: is_watertight(&mesh),
        fits_build_volume: build_volume.fits(final_dims),
    };

    tracing::info!(
        removed_bodies,
        scale_factor,
        triangles = report.triangle_count,
        watertight = report.watertight,
        "mesh repaired"
    );
    Ok((mesh, report))
}
