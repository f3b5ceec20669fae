use super::*;
use crate::primitives::{box_between, create_box};
use approx::assert_relative_eq;
use glam::DVec3;

fn tower() -> Mesh {
    create_box(DVec3::new(10.0, 10.0, 40.0), true).unwrap()
}

/// A 10 mm cube plus a 1 mm cube floating beside it (0.001 of the volume).
fn cube_with_sliver() -> Mesh {
    let big = box_between(DVec3::ZERO, DVec3::splat(10.0)).unwrap();
    let sliver = box_between(DVec3::new(20.0, 0.0, 0.0), DVec3::new(21.0, 1.0, 1.0)).unwrap();
    Mesh::concat([&big, &sliver])
}

fn no_stages() -> RepairParams {
    RepairParams {
        auto_orient: false,
        remove_floating: false,
        target_height: None,
        ..Default::default()
    }
}

// =============================================================================
// Orientation
// =============================================================================

#[test]
fn test_vertical_mesh_is_not_rotated() {
    let mesh = tower();
    let (oriented, degrees) = auto_orient(mesh.clone(), UPRIGHT_ALIGNMENT_COSINE);
    assert_eq!(degrees, None);
    assert_eq!(oriented, mesh);
}

#[test]
fn test_lying_mesh_stands_up() {
    let lying = create_box(DVec3::new(40.0, 10.0, 10.0), true).unwrap();
    let (oriented, degrees) = auto_orient(lying, UPRIGHT_ALIGNMENT_COSINE);
    assert_relative_eq!(degrees.unwrap(), 90.0, epsilon = 1e-6);

    let dims = oriented.dimensions();
    assert_relative_eq!(dims.z, 40.0, epsilon = 1e-6);
    assert_relative_eq!(dims.x, 10.0, epsilon = 1e-6);
    assert!(oriented.signed_volume() > 0.0);
}

#[test]
fn test_rotation_to_vertical() {
    let axis = DVec3::new(1.0, 1.0, 0.0).normalize();
    let r = rotation_to_vertical(axis);
    assert!((r * axis).abs_diff_eq(DVec3::Z, 1e-9));
    assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-9);

    let flipped = rotation_to_vertical(-DVec3::Z);
    assert!((flipped * -DVec3::Z).abs_diff_eq(DVec3::Z, 1e-12));
    assert_eq!(rotation_to_vertical(DVec3::Z), glam::DMat3::IDENTITY);
}

// =============================================================================
// Bodies
// =============================================================================

#[test]
fn test_split_bodies() {
    let bodies = split_bodies(&cube_with_sliver());
    assert_eq!(bodies.len(), 2);
    assert!(bodies.iter().all(|b| b.triangle_count() == 12 && b.vertex_count() == 8));
}

#[test]
fn test_sliver_removed() {
    let outcome = remove_floating_bodies(cube_with_sliver(), DEFAULT_MIN_BODY_RATIO);
    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.mesh.triangle_count(), 12);
    assert_relative_eq!(outcome.mesh.dimensions().x, 10.0);
    assert_eq!(outcome.bodies.len(), 2);
    assert_eq!(outcome.fallback_count(), 0);
}

#[test]
fn test_floating_removal_is_idempotent() {
    let once = remove_floating_bodies(cube_with_sliver(), 0.01);
    let twice = remove_floating_bodies(once.mesh.clone(), 0.01);
    assert_eq!(twice.removed, 0);
    assert_eq!(twice.mesh, once.mesh);
}

#[test]
fn test_open_body_uses_bounding_box() {
    let mut open = create_box(DVec3::new(2.0, 3.0, 4.0), false).unwrap();
    let triangles = open.triangles()[..10].to_vec();
    open = Mesh::from_parts(open.vertices().to_vec(), triangles).unwrap();

    let measured = body_volume(&open);
    assert_eq!(measured.source, VolumeSource::BoundingBoxFallback);
    assert_relative_eq!(measured.volume, 24.0);
}

#[test]
fn test_annulus_is_a_single_body() {
    use crate::contour::{extrude_contours, ContourParams};
    use crate::raster::Raster;

    let annulus = Raster::from_fn(30, 30, |row, col| {
        let outer = (3..27).contains(&row) && (3..27).contains(&col);
        let hole = (10..20).contains(&row) && (10..20).contains(&col);
        if outer && !hole {
            255.0
        } else {
            0.0
        }
    });
    let output = extrude_contours(&annulus, &ContourParams::default()).unwrap();
    assert_eq!(split_bodies(&output.mesh).len(), 1);
    let outcome = remove_floating_bodies(output.mesh, DEFAULT_MIN_BODY_RATIO);
    assert_eq!(outcome.removed, 0);
}

// =============================================================================
// Placement
// =============================================================================

#[test]
fn test_scale_to_height() {
    let (scaled, factor) = scale_to_height(tower(), 100.0).unwrap();
    assert_relative_eq!(factor, 2.5);
    assert_relative_eq!(scaled.dimensions().z, 100.0, epsilon = 1e-9);
    assert_relative_eq!(scaled.dimensions().x, 25.0, epsilon = 1e-9);
}

#[test]
fn test_scale_flat_mesh_fails() {
    let mut flat = Mesh::new();
    let a = flat.add_vertex(DVec3::ZERO);
    let b = flat.add_vertex(DVec3::X);
    let c = flat.add_vertex(DVec3::Y);
    flat.add_triangle(a, b, c);
    assert!(matches!(
        scale_to_height(flat, 10.0),
        Err(MeshError::DegenerateMesh { .. })
    ));
}

#[test]
fn test_base_plate() {
    let mut mesh = tower();
    mesh.center_and_ground();
    let with_plate = add_base_plate(mesh, 2.0, 3.0).unwrap();

    assert_eq!(with_plate.triangle_count(), 24);
    let (min, max) = with_plate.bounding_box();
    assert_relative_eq!(min.z, 0.0);
    assert_relative_eq!(max.z, 42.0);
    assert_relative_eq!(max.x - min.x, 16.0);
    assert_relative_eq!(max.y - min.y, 16.0);
}

#[test]
fn test_fit_never_upscales() {
    let volume = BuildVolume::default();
    let (small, factor) = fit_to_build_volume(tower(), &volume);
    assert_eq!(factor, None);
    assert_relative_eq!(small.dimensions().z, 40.0);

    let huge = create_box(DVec3::new(440.0, 100.0, 50.0), true).unwrap();
    let (fitted, factor) = fit_to_build_volume(huge, &volume);
    assert_relative_eq!(factor.unwrap(), 0.5);
    assert!(volume.fits(fitted.dimensions().to_array()));
}

// =============================================================================
// Full repair
// =============================================================================

#[test]
fn test_repair_removes_sliver_and_scales() {
    let params = RepairParams {
        auto_orient: false,
        target_height: Some(50.0),
        ..Default::default()
    };
    let (mesh, report) = repair_mesh(cube_with_sliver(), &params, &BuildVolume::default()).unwrap();

    assert_eq!(report.removed_bodies, 1);
    assert_eq!(report.original_triangles, 24);
    assert_eq!(report.triangle_count, 12);
    assert_relative_eq!(report.scale_factor, 5.0);
    assert!(report.watertight);
    assert!(report.fits_build_volume);
    assert_relative_eq!(mesh.dimensions().z, 50.0, epsilon = 1e-9);

    let (min, max) = mesh.bounding_box();
    assert_relative_eq!(min.z, 0.0);
    assert_relative_eq!(min.x + max.x, 0.0, epsilon = 1e-9);
}

#[test]
fn test_repair_with_base_and_fit() {
    let params = RepairParams {
        target_height: Some(300.0),
        base_height: 5.0,
        fit_to_build_volume: true,
        ..Default::default()
    };
    let volume = BuildVolume::default();
    let (mesh, report) = repair_mesh(tower(), &params, &volume).unwrap();

    assert!(report.fit_factor.is_some());
    assert!(report.fits_build_volume);
    assert!(volume.fits(mesh.dimensions().to_array()));
    assert_relative_eq!(mesh.dimensions().z, 220.0, epsilon = 1e-9);
}

#[test]
fn test_repair_without_stages_only_places() {
    let mut moved = tower();
    moved.translate(DVec3::new(5.0, -3.0, 7.0));
    let (mesh, report) = repair_mesh(moved, &no_stages(), &BuildVolume::default()).unwrap();
    assert_relative_eq!(report.scale_factor, 1.0);
    assert_eq!(report.rotation_degrees, None);
    assert_eq!(mesh.bounding_box().0, DVec3::new(-5.0, -5.0, 0.0));
}

#[test]
fn test_repair_rejects_empty_mesh() {
    assert!(matches!(
        repair_mesh(Mesh::new(), &RepairParams::default(), &BuildVolume::default()),
        Err(MeshError::DegenerateMesh { .. })
    ));
}

#[test]
fn test_repair_params_validation() {
    let params = RepairParams {
        min_body_ratio: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        params.validate(),
        Err(MeshError::InvalidParameter { name: "min_body_ratio", .. })
    ));
}
