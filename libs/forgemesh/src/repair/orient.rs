//! Upright orientation from the principal axis of the vertex cloud.

use glam::{DMat3, DMat4, DVec3};
use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use crate::mesh::Mesh;

/// Direction of maximum variance of the vertex positions.
///
/// Returns `None` for fewer than three vertices. The sign of the axis is
/// whatever the eigen solver produced.
pub fn principal_axis(mesh: &Mesh) -> Option<DVec3> {
    let vertices = mesh.vertices();
    if vertices.len() < 3 {
        return None;
    }

    let count = vertices.len() as f64;
    let centroid = vertices.iter().copied().sum::<DVec3>() / count;

    let mut covariance = Matrix3::zeros();
    for v in vertices {
        let d = *v - centroid;
        let point = Vector3::new(d.x, d.y, d.z);
        covariance += point * point.transpose();
    }
    covariance /= count;

    let eigen = SymmetricEigen::new(covariance);
    let dominant = (0..3).max_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]))?;
    let axis = eigen.eigenvectors.column(dominant);
    let axis = DVec3::new(axis[0], axis[1], axis[2]);
    axis.try_normalize()
}

/// Rotation taking unit vector `axis` onto +Z (Rodrigues' formula).
///
/// Anti-parallel input gets a half turn about X.
pub fn rotation_to_vertical(axis: DVec3) -> DMat3 {
    let v = axis.cross(DVec3::Z);
    let s = v.length();
    let c = axis.dot(DVec3::Z);

    if s < 1e-6 {
        return if c < 0.0 {
            DMat3::from_diagonal(DVec3::new(1.0, -1.0, -1.0))
        } else {
            DMat3::IDENTITY
        };
    }

    let k = DMat3::from_cols(
        DVec3::new(0.0, v.z, -v.y),
        DVec3::new(-v.z, 0.0, v.x),
        DVec3::new(v.y, -v.x, 0.0),
    );
    DMat3::IDENTITY + k + k * k * ((1.0 - c) / (s * s))
}

/// Rotates `mesh` so its principal axis points up.
///
/// Meshes whose principal axis is already within `upright_cosine` of
/// vertical come back untouched. The second value is the rotation angle in
/// degrees when one was applied.
pub fn auto_orient(mut mesh: Mesh, upright_cosine: f64) -> (Mesh, Option<f64>) {
    let Some(axis) = principal_axis(&mesh) else {
        return (mesh, None);
    };

    let alignment = axis.dot(DVec3::Z);
    tracing::debug!(?axis, alignment, "principal axis");
    if alignment.abs() > upright_cosine {
        return (mesh, None);
    }

    let rotation = rotation_to_vertical(axis);
    mesh.transform(&DMat4::from_mat3(rotation));
    let degrees = alignment.clamp(-1.0, 1.0).acos().to_degrees();
    tracing::info!(degrees, "rotated mesh upright");
    (mesh, Some(degrees))
}
