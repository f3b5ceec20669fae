//! Straight extrusion of a polygon with holes into a closed prism.

use earcutr::earcut;
use glam::{DVec2, DVec3};

use super::polygon::{clean_ring, PolygonWithHoles};
use crate::error::{require_positive, MeshError, MeshResult};
use crate::mesh::Mesh;

/// Extrudes `polygon` from Z = 0 to Z = `height`.
///
/// Caps are triangulated with holes. Each ring contributes a quad strip of
/// walls; the top and bottom rings are shared by caps and walls so the
/// result is watertight with outward normals.
///
/// # Errors
///
/// Returns [`MeshError::InvalidParameter`] for a non-positive height and
/// [`MeshError::Triangulation`] when the cap cannot be triangulated.
///
/// # Example
///
/// ```rust
/// use forgemesh::contour::extrude::extrude_polygon;
/// use forgemesh::contour::PolygonWithHoles;
/// use glam::DVec2;
///
/// let square = PolygonWithHoles::rectangle(DVec2::ZERO, DVec2::splat(10.0));
/// let prism = extrude_polygon(&square, 5.0).unwrap();
/// assert_eq!(prism.vertex_count(), 8);
/// assert_eq!(prism.triangle_count(), 12);
/// ```
pub fn extrude_polygon(polygon: &PolygonWithHoles, height: f64) -> MeshResult<Mesh> {
    require_positive("height", height)?;

    let polygon = polygon.normalized();
    let outer = clean_ring(&polygon.outer);
    if outer.len() < 3 {
        return Err(MeshError::triangulation("outer ring has fewer than 3 vertices"));
    }
    let holes: Vec<Vec<DVec2>> = polygon
        .holes
        .iter()
        .map(|h| clean_ring(h))
        .filter(|h| h.len() >= 3)
        .collect();

    // Flattened ring layout shared by earcut and the vertex buffer
    let mut points: Vec<DVec2> = outer.clone();
    let mut ring_starts = vec![0usize];
    for hole in &holes {
        ring_starts.push(points.len());
        points.extend_from_slice(hole);
    }
    let n = points.len();

    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    let cap = earcut(&flat, &ring_starts[1..], 2)
        .map_err(|_| MeshError::triangulation("earcut rejected the ring layout"))?;
    if cap.is_empty() {
        return Err(MeshError::triangulation("cap produced no triangles"));
    }

    let mut mesh = Mesh::with_capacity(n * 2, cap.len() / 3 * 2 + n * 2);
    for p in &points {
        mesh.add_vertex(DVec3::new(p.x, p.y, 0.0));
    }
    for p in &points {
        mesh.add_vertex(DVec3::new(p.x, p.y, height));
    }

    let top = |i: usize| (i + n) as u32;
    for tri in cap.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        // Earcut output orientation is not guaranteed; force CCW from above
        let (b, c) = if (points[b] - points[a]).perp_dot(points[c] - points[a]) < 0.0 {
            (c, b)
        } else {
            (b, c)
        };
        mesh.add_triangle(top(a), top(b), top(c));
        mesh.add_triangle(a as u32, c as u32, b as u32);
    }

    ring_starts.push(n);
    for bounds in ring_starts.windows(2) {
        let (start, end) = (bounds[0], bounds[1]);
        let len = end - start;
        for k in 0..len {
            let a = start + k;
            let b = start + (k + 1) % len;
            mesh.add_triangle(a as u32, b as u32, top(b));
            mesh.add_triangle(a as u32, top(b), top(a));
        }
    }

    Ok(mesh)
}
