//! # Heightmap Extruder
//!
//! Maps brightness to height: `base_height + intensity / 255 * max_height`,
//! built through the grid mesh builder, mirrored so the relief reads like
//! the source image, then centered on X = Y = 0 and grounded at Z = 0.

use config::constants::{DEFAULT_HEIGHTMAP_BASE_MM, DEFAULT_MAX_HEIGHT_MM, DEFAULT_PIXELS_PER_MM};
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, MeshResult};
use crate::grid::{build_grid_solid, HeightGrid};
use crate::mesh::Mesh;
use crate::raster::{Raster, MAX_INTENSITY};

/// Parameters for heightmap extrusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapParams {
    /// Relief height added for a full-intensity pixel (mm)
    pub max_height: f64,
    /// Solid thickness under the darkest pixel (mm)
    pub base_height: f64,
    /// Multiplier applied to the grid spacing
    pub xy_scale: f64,
    /// Raster density; spacing is `xy_scale / pixels_per_mm`
    pub pixels_per_mm: f64,
    /// Dark pixels become high instead of low
    pub invert: bool,
    /// Gaussian blur radius in pixels, 0 disables smoothing
    pub smooth: u32,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_MAX_HEIGHT_MM,
            base_height: DEFAULT_HEIGHTMAP_BASE_MM,
            xy_scale: 1.0,
            pixels_per_mm: DEFAULT_PIXELS_PER_MM,
            invert: false,
            smooth: 0,
        }
    }
}

impl HeightmapParams {
    /// Checks every numeric field.
    pub fn validate(&self) -> MeshResult<()> {
        require_non_negative("max_height", self.max_height)?;
        require_non_negative("base_height", self.base_height)?;
        require_positive("xy_scale", self.xy_scale)?;
        require_positive("pixels_per_mm", self.pixels_per_mm)
    }

    /// Distance between neighbouring grid vertices (mm).
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.xy_scale / self.pixels_per_mm
    }
}

/// Converts a raster into a relief solid.
///
/// # Errors
///
/// Propagates parameter validation and grid builder errors; a raster
/// smaller than 2x2 yields [`crate::MeshError::InsufficientResolution`].
///
/// # Example
///
/// ```rust
/// use forgemesh::heightmap::{extrude_heightmap, HeightmapParams};
/// use forgemesh::Raster;
///
/// let raster = Raster::from_fn(4, 4, |row, _| row as f64 * 85.0);
/// let params = HeightmapParams { max_height: 6.0, base_height: 1.0, ..Default::default() };
/// let mesh = extrude_heightmap(&raster, &params).unwrap();
/// assert_eq!(mesh.dimensions().z, 7.0);
/// ```
pub fn extrude_heightmap(raster: &Raster, params: &HeightmapParams) -> MeshResult<Mesh> {
    params.validate()?;

    let mut source = raster.blurred(params.smooth)?;
    if params.invert {
        source = source.inverted();
    }

    let grid = HeightGrid::from_raster(&source, |v| v / MAX_INTENSITY * params.max_height);
    let mut mesh = build_grid_solid(&grid, params.spacing(), params.base_height)?;
    mesh.mirror_y();
    mesh.center_and_ground();

    tracing::info!(
        width = source.width(),
        height = source.height(),
        triangles = mesh.triangle_count(),
        "heightmap extruded"
    );
    Ok(mesh)
}
