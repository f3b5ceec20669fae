//! # Validator
//!
//! Read-only print diagnostics: watertightness by directed edge pairing,
//! bounds, dimensions, volume and build-volume overflow. Validation never
//! fails; problems are reported as human-readable issue strings.

use config::BuildVolume;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

const AXIS_NAMES: [&str; 3] = ["X", "Y", "Z"];

/// Result of [`validate_mesh`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when `issues` is empty.
    pub is_valid: bool,
    /// Every directed edge is matched by exactly one reverse edge.
    pub is_watertight: bool,
    /// `[min, max]` corners.
    pub bounds: [[f64; 3]; 2],
    /// Extent along X, Y and Z in millimeters.
    pub dimensions: [f64; 3],
    /// Enclosed volume in cubic millimeters; only present when watertight.
    pub volume: Option<f64>,
    pub triangle_count: usize,
    pub vertex_count: usize,
    /// Human-readable problems, empty for a printable mesh.
    pub issues: Vec<String>,
}

/// Checks that every directed edge appears once and its reverse appears
/// once.
///
/// An empty mesh is not watertight.
///
/// # Example
///
/// ```rust
/// use forgemesh::primitives::create_box;
/// use forgemesh::validate::is_watertight;
/// use glam::DVec3;
///
/// let mesh = create_box(DVec3::splat(1.0), false).unwrap();
/// assert!(is_watertight(&mesh));
/// ```
pub fn is_watertight(mesh: &Mesh) -> bool {
    if mesh.is_empty() {
        return false;
    }

    let mut directed: HashMap<(u32, u32), u32> = HashMap::with_capacity(mesh.triangle_count() * 3);
    for tri in mesh.triangles() {
        for k in 0..3 {
            *directed.entry((tri[k], tri[(k + 1) % 3])).or_insert(0) += 1;
        }
    }

    directed
        .iter()
        .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
}

/// Produces a [`ValidationReport`] for `mesh` against `build_volume`.
///
/// # Example
///
/// ```rust
/// use config::BuildVolume;
/// use forgemesh::primitives::create_box;
/// use forgemesh::validate::validate_mesh;
/// use glam::DVec3;
///
/// let mesh = create_box(DVec3::new(300.0, 10.0, 10.0), false).unwrap();
/// let report = validate_mesh(&mesh, &BuildVolume::default());
/// assert!(report.is_watertight);
/// assert!(!report.is_valid);
/// assert!(report.issues[0].starts_with("X dimension"));
/// ```
pub fn validate_mesh(mesh: &Mesh, build_volume: &BuildVolume) -> ValidationReport {
    let (min, max) = mesh.bounding_box();
    let dimensions = (max - min).to_array();
    let watertight = is_watertight(mesh);
    let mut issues = Vec::new();

    if mesh.is_empty() {
        issues.push("Mesh has no triangles".to_string());
    } else if !watertight {
        issues.push("Mesh is not watertight (has holes)".to_string());
    }

    let volume = watertight.then(|| mesh.signed_volume());
    if let Some(v) = volume.filter(|v| *v < 0.0) {
        issues.push(format!(
            "Mesh is inside out (signed volume {v:.1}mm³)"
        ));
    }

    for ((axis, dim), limit) in AXIS_NAMES
        .iter()
        .zip(dimensions)
        .zip(build_volume.as_array())
    {
        if dim > limit {
            issues.push(format!(
                "{axis} dimension ({dim:.1}mm) exceeds build volume ({limit:.1}mm)"
            ));
        }
    }

    if !issues.is_empty() {
        tracing::debug!(issues = issues.len(), "mesh validation found issues");
    }

    ValidationReport {
        is_valid: issues.is_empty(),
        is_watertight: watertight,
        bounds: [min.to_array(), max.to_array()],
        dimensions,
        volume,
        triangle_count: mesh.triangle_count(),
        vertex_count: mesh.vertex_count(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::create_box;
    use approx::assert_relative_eq;
    use glam::DVec3;

    #[test]
    fn test_box_is_valid() {
        let mesh = create_box(DVec3::new(10.0, 20.0, 30.0), true).unwrap();
        let report = validate_mesh(&mesh, &BuildVolume::default());
        assert!(report.is_valid);
        assert!(report.is_watertight);
        assert_relative_eq!(report.volume.unwrap(), 6000.0, epsilon = 1e-6);
        assert_eq!(report.dimensions, [10.0, 20.0, 30.0]);
        assert_eq!(report.bounds[0], [-5.0, -10.0, -15.0]);
        assert_eq!(report.triangle_count, 12);
        assert_eq!(report.vertex_count, 8);
    }

    #[test]
    fn test_open_mesh_has_no_volume() {
        let mut mesh = create_box(DVec3::splat(1.0), false).unwrap();
        let kept: Vec<usize> = (0..11).collect();
        mesh = mesh.submesh(&kept);
        let report = validate_mesh(&mesh, &BuildVolume::default());
        assert!(!report.is_watertight);
        assert!(report.volume.is_none());
        assert_eq!(report.issues, vec!["Mesh is not watertight (has holes)"]);
    }

    #[test]
    fn test_duplicated_face_breaks_pairing() {
        let mut mesh = create_box(DVec3::splat(1.0), false).unwrap();
        let [a, b, c] = mesh.triangle(0);
        mesh.add_triangle(a, b, c);
        assert!(!is_watertight(&mesh));
    }

    #[test]
    fn test_overflow_reported_per_axis() {
        let mesh = create_box(DVec3::new(250.0, 10.0, 230.0), false).unwrap();
        let report = validate_mesh(&mesh, &BuildVolume::default());
        assert_eq!(report.issues.len(), 2);
        assert_eq!(
            report.issues[0],
            "X dimension (250.0mm) exceeds build volume (220.0mm)"
        );
        assert!(report.issues[1].starts_with("Z dimension"));
    }

    #[test]
    fn test_custom_build_volume() {
        let mesh = create_box(DVec3::splat(100.0), false).unwrap();
        let small = BuildVolume::new(50.0, 200.0, 200.0).unwrap();
        assert!(!validate_mesh(&mesh, &small).is_valid);
        assert!(validate_mesh(&mesh, &BuildVolume::default()).is_valid);
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let mesh = create_box(DVec3::splat(3.0), false).unwrap();
        let before = mesh.clone();
        let _ = validate_mesh(&mesh, &BuildVolume::default());
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_empty_mesh() {
        let report = validate_mesh(&Mesh::new(), &BuildVolume::default());
        assert!(!report.is_valid);
        assert!(!report.is_watertight);
        assert_eq!(report.triangle_count, 0);
    }
}
