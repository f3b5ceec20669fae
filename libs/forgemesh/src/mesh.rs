//! # Mesh Data Structure
//!
//! Core indexed triangle mesh shared by every synthesis and repair stage.
//! Triangles are counter-clockwise when viewed from outside the solid.
//! Bounds are always computed from the current vertices, never cached.

use config::constants::AREA_EPSILON;
use glam::{DMat4, DVec3};

use crate::error::{MeshError, MeshResult};

/// A triangle mesh with vertices and indices.
///
/// All geometry calculations use f64. Conversion to f32 only happens at
/// the export boundary.
///
/// # Example
///
/// ```rust
/// use forgemesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (f64 for precision)
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Builds a mesh from raw buffers, checking that every index is in range.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::DegenerateMesh`] if a triangle references a
    /// vertex that does not exist.
    pub fn from_parts(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> MeshResult<Self> {
        let count = vertices.len();
        if let Some(bad) = triangles
            .iter()
            .find(|tri| tri.iter().any(|&i| i as usize >= count))
        {
            return Err(MeshError::degenerate(format!(
                "triangle {bad:?} references a vertex outside 0..{count}"
            )));
        }
        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the triangle at the given index.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        self.triangles[index]
    }

    /// Returns the three corner positions of a triangle.
    #[inline]
    pub fn triangle_positions(&self, tri: [u32; 3]) -> [DVec3; 3] {
        [
            self.vertices[tri[0] as usize],
            self.vertices[tri[1] as usize],
            self.vertices[tri[2] as usize],
        ]
    }

    /// Unnormalized face normal (length is twice the triangle area).
    pub fn face_normal(&self, index: usize) -> DVec3 {
        let [a, b, c] = self.triangle_positions(self.triangles[index]);
        (b - a).cross(c - a)
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box, or two zero vectors
    /// for an empty mesh.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some(first) = self.vertices.first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };

        self.vertices
            .iter()
            .fold((*first, *first), |(min, max), v| (min.min(*v), max.max(*v)))
    }

    /// Extent of the bounding box along each axis.
    pub fn dimensions(&self) -> DVec3 {
        let (min, max) = self.bounding_box();
        max - min
    }

    /// Signed volume by the divergence theorem.
    ///
    /// Positive for a closed mesh with outward-facing triangles. Meaningless
    /// for open meshes.
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let [a, b, c] = self.triangle_positions(*tri);
                a.dot(b.cross(c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Transforms all vertices by a 4x4 matrix.
    ///
    /// A transform with a negative determinant mirrors the solid, so the
    /// winding of every triangle is reversed to keep normals outward.
    pub fn transform(&mut self, matrix: &DMat4) {
        for v in &mut self.vertices {
            *v = matrix.transform_point3(*v);
        }
        if matrix.determinant() < 0.0 {
            self.flip_winding();
        }
    }

    /// Translates the mesh by a vector.
    pub fn translate(&mut self, offset: DVec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Scales every vertex about the origin.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.vertices {
            *v *= factor;
        }
    }

    /// Scales X and Y about the origin, leaving Z untouched.
    pub fn scale_xy(&mut self, factor: f64) {
        for v in &mut self.vertices {
            v.x *= factor;
            v.y *= factor;
        }
    }

    /// Mirrors the mesh across the XZ plane.
    ///
    /// Raster rows grow downward while printer Y grows away from the viewer,
    /// so grid outputs are mirrored once to read the same way as the image.
    pub fn mirror_y(&mut self) {
        for v in &mut self.vertices {
            v.y = -v.y;
        }
        self.flip_winding();
    }

    /// Reverses the winding of every triangle.
    pub fn flip_winding(&mut self) {
        for tri in &mut self.triangles {
            tri.swap(1, 2);
        }
    }

    /// Moves the bounding-box center to X = Y = 0 and the lowest point to
    /// Z = 0.
    pub fn center_and_ground(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        let (min, max) = self.bounding_box();
        let center = (min + max) * 0.5;
        self.translate(DVec3::new(-center.x, -center.y, -min.z));
    }

    /// Merges another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|tri| [tri[0] + offset, tri[1] + offset, tri[2] + offset]),
        );
    }

    /// Concatenates meshes without welding shared positions.
    pub fn concat<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Mesh {
        let mut result = Mesh::new();
        for mesh in meshes {
            result.merge(mesh);
        }
        result
    }

    /// Builds a new mesh from a subset of triangles, compacting the vertex
    /// buffer to the vertices those triangles use.
    pub fn submesh(&self, triangle_indices: &[usize]) -> Mesh {
        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut result = Mesh::with_capacity(triangle_indices.len(), triangle_indices.len());

        for &t in triangle_indices {
            let tri = self.triangles[t];
            let mut mapped = [0u32; 3];
            for (slot, &v) in mapped.iter_mut().zip(tri.iter()) {
                if remap[v as usize] == u32::MAX {
                    remap[v as usize] = result.add_vertex(self.vertices[v as usize]);
                }
                *slot = remap[v as usize];
            }
            result.add_triangle(mapped[0], mapped[1], mapped[2]);
        }
        result
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No triangle repeats a vertex
    /// - No zero-area triangles
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        self.triangles.iter().all(|tri| {
            if tri.iter().any(|&i| i >= vertex_count) {
                return false;
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return false;
            }
            let [a, b, c] = self.triangle_positions(*tri);
            (b - a).cross(c - a).length() >= AREA_EPSILON
        })
    }
}
