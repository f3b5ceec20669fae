//! # Contour Extruder
//!
//! Binary regions become polygons with holes, overlapping polygons are
//! merged, and everything is extruded to one uniform height.
//!
//! ## Pipeline
//!
//! ```text
//! BinaryMask → ContourTracer → simplify → polygons → PolygonKernel::repair
//!            → area filter → PolygonKernel::union → extrude → flip Y → center
//! ```
//!
//! Tracing and polygon repair are collaborators behind [`ContourTracer`] and
//! [`PolygonKernel`]; [`BoundaryTracer`] and [`ContourKernel`] are the
//! built-in implementations.

pub mod extrude;
pub mod kernel;
pub mod polygon;
pub mod simplify;
pub mod trace;


use config::constants::{
    DEFAULT_EXTRUDE_HEIGHT_MM, DEFAULT_SIMPLIFY_TOLERANCE, DEFAULT_THRESHOLD, MIN_POLYGON_AREA,
};
use serde::{Deserialize, Serialize};

pub use extrude::extrude_polygon;
pub use kernel::{ContourKernel, PolygonKernel};
pub use polygon::{PolygonWithHoles, Ring};
pub use simplify::simplify_ring;
pub use trace::{BoundaryTracer, ContourSet, ContourTracer, TracedLoop};

use crate::error::{require_non_negative, require_positive, MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::raster::{BinaryMask, Raster};

/// Parameters for contour extrusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    /// Extrusion height (mm)
    pub height: f64,
    /// Pixels brighter than this are foreground
    pub threshold: u8,
    /// Swap foreground and background
    pub invert: bool,
    /// Simplification tolerance as a percentage of each loop's perimeter
    pub simplify_tolerance: f64,
    /// Also extrude regions nested inside holes
    pub include_islands: bool,
    /// Scale X and Y so the model spans this width (mm)
    pub target_width: Option<f64>,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            height: DEFAULT_EXTRUDE_HEIGHT_MM,
            threshold: DEFAULT_THRESHOLD,
            invert: false,
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
            include_islands: false,
            target_width: None,
        }
    }
}

impl ContourParams {
    /// Checks every numeric field.
    pub fn validate(&self) -> MeshResult<()> {
        require_positive("height", self.height)?;
        require_non_negative("simplify_tolerance", self.simplify_tolerance)?;
        if let Some(width) = self.target_width {
            require_positive("target_width", width)?;
        }
        Ok(())
    }
}

/// Extruded contours plus the counts gathered on the way.
#[derive(Debug, Clone)]
pub struct ContourOutput {
    pub mesh: Mesh,
    /// Loops reported by the tracer.
    pub loops_found: usize,
    /// Polygons extruded after repair and union.
    pub polygons_created: usize,
}

/// Thresholds `raster` and extrudes its regions with the built-in tracer
/// and kernel.
///
/// # Example
///
/// ```rust
/// use forgemesh::contour::{extrude_contours, ContourParams};
/// use forgemesh::Raster;
///
/// // White 10x10 square on a black 20x20 canvas
/// let raster = Raster::from_fn(20, 20, |row, col| {
///     if (5..15).contains(&row) && (5..15).contains(&col) { 255.0 } else { 0.0 }
/// });
/// let output = extrude_contours(&raster, &ContourParams::default()).unwrap();
/// assert_eq!(output.polygons_created, 1);
/// assert_eq!(output.mesh.triangle_count(), 12);
/// ```
pub fn extrude_contours(raster: &Raster, params: &ContourParams) -> MeshResult<ContourOutput> {
    let mask = raster.threshold(params.threshold, params.invert);
    extrude_contours_with(&mask, &BoundaryTracer, &ContourKernel::default(), params)
}

/// Extrudes the regions of `mask` using the given collaborators.
///
/// # Errors
///
/// [`MeshError::NoExtractableShape`] when no polygon survives tracing,
/// simplification, repair and the area filter.
pub fn extrude_contours_with(
    mask: &BinaryMask,
    tracer: &impl ContourTracer,
    kernel: &impl PolygonKernel,
    params: &ContourParams,
) -> MeshResult<ContourOutput> {
    params.validate()?;

    let contours = tracer.trace(mask);
    let loops_found = contours.len();
    let no_shape = || MeshError::NoExtractableShape { loops: loops_found };

    let polygons = build_polygons(&contours, params);
    tracing::debug!(loops_found, candidates = polygons.len(), "built polygons from contours");

    let repaired: Vec<PolygonWithHoles> = polygons.iter().flat_map(|p| kernel.repair(p)).collect();
    let before_filter = repaired.len();
    let valid: Vec<PolygonWithHoles> = repaired
        .into_iter()
        .filter(|p| p.area() >= MIN_POLYGON_AREA)
        .collect();
    if valid.len() < before_filter {
        tracing::warn!(
            discarded = before_filter - valid.len(),
            "discarded polygons below minimum area"
        );
    }
    if valid.is_empty() {
        return Err(no_shape());
    }

    let merged = kernel.union(valid);
    let mut parts = Vec::with_capacity(merged.len());
    for polygon in &merged {
        match extrude_polygon(polygon, params.height) {
            Ok(part) => parts.push(part),
            Err(e) => tracing::warn!(error = %e, "skipping polygon that failed to extrude"),
        }
    }
    if parts.is_empty() {
        return Err(no_shape());
    }

    let mut mesh = Mesh::concat(&parts);
    mesh.mirror_y();
    mesh.center_and_ground();

    if let Some(target) = params.target_width {
        let width = mesh.dimensions().x;
        if width > 0.0 {
            let factor = target / width;
            mesh.scale_xy(factor);
            tracing::debug!(factor, "scaled contour footprint to target width");
        }
    }

    tracing::info!(
        loops_found,
        polygons = parts.len(),
        triangles = mesh.triangle_count(),
        "contours extruded"
    );
    Ok(ContourOutput {
        mesh,
        loops_found,
        polygons_created: parts.len(),
    })
}

/// Simplifies every loop and groups outers with their direct holes.
///
/// Only parentless loops start a polygon unless `include_islands` is set,
/// in which case every even-depth loop does.
pub fn build_polygons(contours: &ContourSet, params: &ContourParams) -> Vec<PolygonWithHoles> {
    let simplified: Vec<Option<Ring>> = contours
        .loops
        .iter()
        .map(|l| {
            let ring = simplify_ring(&l.points, params.simplify_tolerance);
            (ring.len() >= 3).then_some(ring)
        })
        .collect();

    contours
        .loops
        .iter()
        .enumerate()
        .filter(|(_, l)| l.parent.is_none() || (params.include_islands && !l.is_hole()))
        .filter_map(|(i, _)| {
            let outer = simplified[i].clone()?;
            let holes = contours
                .children_of(Some(i))
                .filter_map(|h| simplified[h].clone())
                .collect();
            Some(PolygonWithHoles::with_holes(outer, holes))
        })
        .collect()
}
