//! # Box Primitive
//!
//! Axis-aligned boxes used for base plates and lithophane frames.

use glam::DVec3;

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

/// Creates a rectangular box mesh.
///
/// # Arguments
///
/// * `size` - Dimensions [x, y, z]
/// * `center` - If true, center at origin; if false, corner at origin
///
/// # Returns
///
/// A mesh with 8 vertices and 12 triangles (2 per face).
///
/// # Example
///
/// ```rust
/// use forgemesh::primitives::create_box;
/// use glam::DVec3;
///
/// let mesh = create_box(DVec3::splat(10.0), false).unwrap();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.triangle_count(), 12);
/// ```
pub fn create_box(size: DVec3, center: bool) -> MeshResult<Mesh> {
    let (min, max) = if center {
        let half = size / 2.0;
        (-half, half)
    } else {
        (DVec3::ZERO, size)
    };
    box_between(min, max)
}

/// Creates a box spanning two opposite corners.
///
/// # Errors
///
/// Returns [`MeshError::DegenerateMesh`] unless `max` exceeds `min` on
/// every axis.
pub fn box_between(min: DVec3, max: DVec3) -> MeshResult<Mesh> {
    let size = max - min;
    if !(size.x > 0.0 && size.y > 0.0 && size.z > 0.0) || !size.is_finite() {
        return Err(MeshError::degenerate(format!(
            "box size must be positive: {size:?}"
        )));
    }

    let mut mesh = Mesh::with_capacity(8, 12);

    // Bottom face (z = min.z)
    let v0 = mesh.add_vertex(DVec3::new(min.x, min.y, min.z));
    let v1 = mesh.add_vertex(DVec3::new(max.x, min.y, min.z));
    let v2 = mesh.add_vertex(DVec3::new(max.x, max.y, min.z));
    let v3 = mesh.add_vertex(DVec3::new(min.x, max.y, min.z));

    // Top face (z = max.z)
    let v4 = mesh.add_vertex(DVec3::new(min.x, min.y, max.z));
    let v5 = mesh.add_vertex(DVec3::new(max.x, min.y, max.z));
    let v6 = mesh.add_vertex(DVec3::new(max.x, max.y, max.z));
    let v7 = mesh.add_vertex(DVec3::new(min.x, max.y, max.z));

    // Counter-clockwise seen from outside
    let faces = [
        [v0, v2, v1],
        [v0, v3, v2],
        [v4, v5, v6],
        [v4, v6, v7],
        [v0, v1, v5],
        [v0, v5, v4],
        [v2, v3, v7],
        [v2, v7, v6],
        [v3, v0, v4],
        [v3, v4, v7],
        [v1, v2, v6],
        [v1, v6, v5],
    ];
    for [a, b, c] in faces {
        mesh.add_triangle(a, b, c);
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_not_centered() {
        let mesh = create_box(DVec3::splat(10.0), false).unwrap();
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, DVec3::ZERO);
        assert_eq!(max, DVec3::splat(10.0));
    }

    #[test]
    fn test_box_centered() {
        let mesh = create_box(DVec3::new(4.0, 6.0, 8.0), true).unwrap();
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, DVec3::new(-2.0, -3.0, -4.0));
        assert_eq!(max, DVec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_box_between_corners() {
        let mesh = box_between(DVec3::new(-1.0, 2.0, -3.0), DVec3::new(1.0, 3.0, 0.0)).unwrap();
        assert_eq!(mesh.dimensions(), DVec3::new(2.0, 1.0, 3.0));
        assert!(mesh.validate());
    }

    #[test]
    fn test_box_invalid_size() {
        assert!(create_box(DVec3::new(0.0, 10.0, 10.0), false).is_err());
        assert!(create_box(DVec3::new(-5.0, 10.0, 10.0), false).is_err());
        assert!(create_box(DVec3::new(f64::NAN, 1.0, 1.0), false).is_err());
    }
}
