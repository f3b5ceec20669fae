//! Property-based tests for the grid builder and print-prep stages.
//!
//! Run with: cargo test -p forgemesh --test properties

use config::BuildVolume;
use forgemesh::grid::grid_triangle_count;
use forgemesh::heightmap::{extrude_heightmap, HeightmapParams};
use forgemesh::primitives::box_between;
use forgemesh::repair::{fit_to_build_volume, remove_floating_bodies, scale_to_height};
use forgemesh::{build_grid_solid, is_watertight, HeightGrid, Mesh, Raster};
use glam::DVec3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Height grid of 2..12 cells per side with finite non-negative heights.
fn arb_grid() -> impl Strategy<Value = HeightGrid> {
    (2usize..12, 2usize..12).prop_flat_map(|(w, h)| {
        prop::collection::vec(0.0..50.0f64, w * h)
            .prop_map(move |values| HeightGrid::new(w, h, values).unwrap())
    })
}

/// Raster of 2..16 pixels per side with full-range intensities.
fn arb_raster() -> impl Strategy<Value = Raster> {
    (2usize..16, 2usize..16).prop_flat_map(|(w, h)| {
        prop::collection::vec(0.0..=255.0f64, w * h)
            .prop_map(move |data| Raster::new(w, h, data).unwrap())
    })
}

/// Axis-aligned box with a corner anywhere in a 200 mm cube and extents up
/// to 600 mm.
fn arb_box() -> impl Strategy<Value = Mesh> {
    (
        prop::array::uniform3(-100.0..100.0f64),
        prop::array::uniform3(0.5..600.0f64),
    )
        .prop_map(|(corner, size)| {
            let min = DVec3::from_array(corner);
            box_between(min, min + DVec3::from_array(size)).unwrap()
        })
}

/// One to four disjoint boxes of random size laid out along X.
fn arb_scene() -> impl Strategy<Value = Mesh> {
    prop::collection::vec(prop::array::uniform3(0.1..20.0f64), 1..5).prop_map(|sizes| {
        let mut scene = Mesh::new();
        let mut x = 0.0;
        for size in sizes {
            let min = DVec3::new(x, 0.0, 0.0);
            scene.merge(&box_between(min, min + DVec3::from_array(size)).unwrap());
            x += size[0] + 5.0;
        }
        scene
    })
}

// =============================================================================
// Grid Mesh Builder
// =============================================================================

proptest! {
    /// Any valid grid yields a closed solid with the documented face count.
    #[test]
    fn grid_is_watertight(grid in arb_grid(), spacing in 0.1..5.0f64, base in 0.0..5.0f64) {
        let mesh = build_grid_solid(&grid, spacing, base).unwrap();
        prop_assert!(is_watertight(&mesh));
        prop_assert_eq!(mesh.triangle_count(), grid_triangle_count(grid.width(), grid.height()));
        prop_assert_eq!(mesh.vertex_count(), 2 * grid.width() * grid.height());
    }

    /// Heightmap output is centered, grounded and closed.
    #[test]
    fn heightmap_is_centered_and_grounded(raster in arb_raster()) {
        let mesh = extrude_heightmap(&raster, &HeightmapParams::default()).unwrap();
        let (min, max) = mesh.bounding_box();
        prop_assert!(min.z.abs() < 1e-9);
        prop_assert!((min.x + max.x).abs() < 1e-9);
        prop_assert!((min.y + max.y).abs() < 1e-9);
        prop_assert!(is_watertight(&mesh));
    }
}

// =============================================================================
// Print-Prep
// =============================================================================

proptest! {
    /// Scaling hits the requested vertical extent.
    #[test]
    fn scale_reaches_target(mesh in arb_box(), target in 1.0..300.0f64) {
        let (scaled, _) = scale_to_height(mesh, target).unwrap();
        prop_assert!((scaled.dimensions().z - target).abs() < 1e-6 * target);
    }

    /// Fitting never exceeds the envelope and never enlarges.
    #[test]
    fn fit_stays_inside_and_never_upscales(mesh in arb_box()) {
        let volume = BuildVolume::default();
        let before = mesh.dimensions();
        let (fitted, factor) = fit_to_build_volume(mesh, &volume);
        let after = fitted.dimensions();

        prop_assert!(volume.fits(after.to_array()));
        prop_assert!(after.cmple(before + DVec3::splat(1e-9)).all());
        if let Some(f) = factor {
            prop_assert!(f < 1.0);
        }
    }

    /// A second floating-piece pass removes nothing.
    #[test]
    fn floating_removal_is_idempotent(scene in arb_scene(), ratio in 0.0..0.5f64) {
        let once = remove_floating_bodies(scene, ratio);
        let twice = remove_floating_bodies(once.mesh.clone(), ratio);
        prop_assert_eq!(twice.removed, 0);
        prop_assert_eq!(twice.mesh.triangle_count(), once.mesh.triangle_count());
    }
}
