//! Scaling, base plates and build-volume fitting.

use config::BuildVolume;
use glam::DVec3;

use crate::error::{require_non_negative, require_positive, MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::primitives::box_between;

/// Uniformly scales `mesh` so its vertical extent equals `target_height`.
///
/// Returns the scaled mesh and the factor applied.
pub fn scale_to_height(mut mesh: Mesh, target_height: f64) -> MeshResult<(Mesh, f64)> {
    require_positive("target_height", target_height)?;
    let current = mesh.dimensions().z;
    if !(current > 0.0) {
        return Err(MeshError::degenerate("scale to height: mesh has no vertical extent"));
    }
    let factor = target_height / current;
    mesh.scale(factor);
    tracing::debug!(factor, "scaled to target height");
    Ok((mesh, factor))
}

/// Puts a rectangular plate under the mesh.
///
/// The plate covers the footprint plus `padding` on every side and is
/// `height` thick. The mesh is lifted onto it and the result is grounded
/// with the plate's underside at Z = 0. The two parts are concatenated,
/// not fused.
pub fn add_base_plate(mut mesh: Mesh, height: f64, padding: f64) -> MeshResult<Mesh> {
    require_positive("base_height", height)?;
    require_non_negative("base_padding", padding)?;
    if mesh.is_empty() {
        return Err(MeshError::degenerate("base plate: mesh has no triangles"));
    }

    let (min, max) = mesh.bounding_box();
    mesh.translate(DVec3::new(0.0, 0.0, height - min.z));

    let margin = DVec3::new(padding, padding, 0.0);
    let plate = box_between(
        DVec3::new(min.x, min.y, 0.0) - margin,
        DVec3::new(max.x, max.y, height) + margin,
    )?;
    tracing::debug!(
        width = max.x - min.x + 2.0 * padding,
        depth = max.y - min.y + 2.0 * padding,
        height,
        "added base plate"
    );
    Ok(Mesh::concat([&mesh, &plate]))
}

/// Shrinks `mesh` uniformly until it fits `volume`; never enlarges it.
///
/// Scaling happens about the origin, so a centered, grounded mesh stays
/// centered and grounded. Returns the factor when one was applied.
pub fn fit_to_build_volume(mut mesh: Mesh, volume: &BuildVolume) -> (Mesh, Option<f64>) {
    let dims = mesh.dimensions();
    let factor = volume.fit_scale(dims.to_array());
    if let Some(factor) = factor {
        mesh.scale(factor);
        tracing::warn!(factor, "downscaled mesh to fit the build volume");
    }
    (mesh, factor)
}
