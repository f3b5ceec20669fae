//! # Lithophane Generator
//!
//! Brightness becomes wall thickness so the printed panel reproduces the
//! image when backlit. Dark pixels must be thick, so intensities are
//! inverted unless a positive panel is requested.
//!
//! The raster is resampled to roughly 0.5 mm per cell, capped at 400
//! columns, and the optional frame is four boxes hugging the panel edges.

use config::constants::{
    lithophane_columns, LITHOPHANE_FRAME_MARGIN_MM, LITHOPHANE_FRAME_WIDTH_MM,
    LITHOPHANE_MAX_THICKNESS_MM, LITHOPHANE_MIN_THICKNESS_MM, LITHOPHANE_WIDTH_MM,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{require_positive, MeshError, MeshResult};
use crate::grid::{build_grid_solid, HeightGrid};
use crate::mesh::Mesh;
use crate::primitives::box_between;
use crate::raster::{Raster, MAX_INTENSITY};

/// Frame drawn around the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameStyle {
    #[default]
    None,
    /// Four rectangular bars around the perimeter.
    Simple,
}

/// Panel shape. Only flat panels are built; the other shapes are accepted
/// and produce a flat panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LithophaneStyle {
    #[default]
    Flat,
    Curved,
    Cylindrical,
    Heart,
}

/// Parameters for lithophane generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LithophaneParams {
    /// Physical panel width (mm)
    pub width_mm: f64,
    /// Thickness of the brightest area when backlit (mm)
    pub min_thickness: f64,
    /// Thickness of the darkest area when backlit (mm)
    pub max_thickness: f64,
    /// Light pixels become thick instead of thin
    pub positive: bool,
    pub style: LithophaneStyle,
    pub frame: FrameStyle,
    /// Width of each frame bar (mm)
    pub frame_width: f64,
}

impl Default for LithophaneParams {
    fn default() -> Self {
        Self {
            width_mm: LITHOPHANE_WIDTH_MM,
            min_thickness: LITHOPHANE_MIN_THICKNESS_MM,
            max_thickness: LITHOPHANE_MAX_THICKNESS_MM,
            positive: false,
            style: LithophaneStyle::Flat,
            frame: FrameStyle::None,
            frame_width: LITHOPHANE_FRAME_WIDTH_MM,
        }
    }
}

impl LithophaneParams {
    /// Checks every numeric field.
    pub fn validate(&self) -> MeshResult<()> {
        require_positive("width_mm", self.width_mm)?;
        require_positive("min_thickness", self.min_thickness)?;
        require_positive("max_thickness", self.max_thickness)?;
        if self.max_thickness < self.min_thickness {
            return Err(MeshError::invalid_parameter(
                "max_thickness",
                self.max_thickness,
                "must not be below min_thickness",
            ));
        }
        if self.frame == FrameStyle::Simple {
            require_positive("frame_width", self.frame_width)?;
        }
        Ok(())
    }
}

/// A generated lithophane and the resolution it was built at.
#[derive(Debug, Clone)]
pub struct LithophanePanel {
    pub mesh: Mesh,
    /// Grid columns after resampling.
    pub columns: usize,
    /// Grid rows after resampling.
    pub rows: usize,
    /// Physical size of one cell (mm).
    pub pixel_size: f64,
}

impl LithophanePanel {
    /// Physical height of the image area (mm).
    pub fn image_height_mm(&self) -> f64 {
        self.rows as f64 * self.pixel_size
    }
}

/// Builds a flat lithophane panel.
///
/// # Errors
///
/// Fails on invalid parameters, or when resampling leaves fewer than two
/// rows (very wide, very short images).
///
/// # Example
///
/// ```rust
/// use forgemesh::lithophane::{generate_lithophane, LithophaneParams};
/// use forgemesh::Raster;
///
/// let photo = Raster::from_fn(64, 48, |row, col| ((row + col) % 256) as f64);
/// let params = LithophaneParams { width_mm: 20.0, ..Default::default() };
/// let panel = generate_lithophane(&photo, &params).unwrap();
/// assert_eq!(panel.columns, 40);
/// assert_eq!(panel.rows, 30);
/// ```
pub fn generate_lithophane(raster: &Raster, params: &LithophaneParams) -> MeshResult<LithophanePanel> {
    params.validate()?;
    if params.style != LithophaneStyle::Flat {
        tracing::warn!(style = ?params.style, "lithophane style not supported, building a flat panel");
    }

    let columns = lithophane_columns(params.width_mm) as usize;
    let mut source = raster.resized_to_width(columns)?;
    if !params.positive {
        source = source.inverted();
    }

    let pixel_size = params.width_mm / columns as f64;
    let range = params.max_thickness - params.min_thickness;
    let grid = HeightGrid::from_raster(&source, |v| {
        params.min_thickness + v / MAX_INTENSITY * range
    });
    let mut mesh = build_grid_solid(&grid, pixel_size, 0.0)?;

    if params.frame == FrameStyle::Simple {
        let frame = build_frame(&mesh, params.frame_width)?;
        mesh = Mesh::concat([&mesh, &frame]);
    }

    mesh.mirror_y();
    mesh.center_and_ground();

    tracing::info!(
        columns,
        rows = source.height(),
        pixel_size,
        triangles = mesh.triangle_count(),
        "lithophane generated"
    );
    Ok(LithophanePanel {
        mesh,
        columns,
        rows: source.height(),
        pixel_size,
    })
}

/// Four bars around `panel`, standing a fixed margin above its thickest
/// point.
fn build_frame(panel: &Mesh, frame_width: f64) -> MeshResult<Mesh> {
    let (min, max) = panel.bounding_box();
    let fw = frame_width;
    let top = max.z + LITHOPHANE_FRAME_MARGIN_MM;
    let floor = min.z;

    let bars = [
        // Left and right bars span the full outer height
        (
            DVec3::new(min.x - fw, min.y - fw, floor),
            DVec3::new(min.x, max.y + fw, top),
        ),
        (
            DVec3::new(max.x, min.y - fw, floor),
            DVec3::new(max.x + fw, max.y + fw, top),
        ),
        (
            DVec3::new(min.x, min.y - fw, floor),
            DVec3::new(max.x, min.y, top),
        ),
        (
            DVec3::new(min.x, max.y, floor),
            DVec3::new(max.x, max.y + fw, top),
        ),
    ];

    let mut frame = Mesh::with_capacity(32, 48);
    for (lo, hi) in bars {
        frame.merge(&box_between(lo, hi)?);
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid_triangle_count;
    use crate::validate::is_watertight;
    use approx::assert_relative_eq;

    fn gradient(width: usize, height: usize) -> Raster {
        Raster::from_fn(width, height, |_, col| col as f64 * 255.0 / (width - 1) as f64)
    }

    #[test]
    fn test_resolution_capped() {
        let params = LithophaneParams {
            width_mm: 500.0,
            ..Default::default()
        };
        let panel = generate_lithophane(&gradient(800, 400), &params).unwrap();
        assert_eq!(panel.columns, 400);
        assert_eq!(panel.rows, 200);
        assert_relative_eq!(panel.pixel_size, 1.25);
    }

    #[test]
    fn test_thickness_range() {
        let params = LithophaneParams {
            width_mm: 30.0,
            min_thickness: 0.8,
            max_thickness: 3.0,
            ..Default::default()
        };
        let panel = generate_lithophane(&gradient(60, 30), &params).unwrap();
        let (min, max) = panel.mesh.bounding_box();
        assert_relative_eq!(min.z, 0.0);
        assert!(max.z <= 3.0 + 1e-6);
        assert!(max.z > 2.5);
        assert!(is_watertight(&panel.mesh));
    }

    #[test]
    fn test_negative_panel_is_thin_where_bright() {
        let params = LithophaneParams {
            width_mm: 10.0,
            ..Default::default()
        };
        let bright = Raster::from_fn(20, 20, |_, _| 255.0);
        let panel = generate_lithophane(&bright, &params).unwrap();
        assert_relative_eq!(panel.mesh.dimensions().z, 0.8, epsilon = 1e-3);

        let positive = LithophaneParams {
            positive: true,
            ..params
        };
        let panel = generate_lithophane(&bright, &positive).unwrap();
        assert_relative_eq!(panel.mesh.dimensions().z, 3.0, epsilon = 1e-3);
    }

    #[test]
    fn test_shaped_styles_fall_back_to_flat() {
        let flat = LithophaneParams {
            width_mm: 10.0,
            ..Default::default()
        };
        let curved = LithophaneParams {
            style: LithophaneStyle::Curved,
            ..flat.clone()
        };
        let source = gradient(20, 10);
        let a = generate_lithophane(&source, &flat).unwrap();
        let b = generate_lithophane(&source, &curved).unwrap();
        assert_eq!(a.mesh, b.mesh);
    }

    #[test]
    fn test_style_names() {
        let style: LithophaneStyle = serde_json::from_str("\"cylindrical\"").unwrap();
        assert_eq!(style, LithophaneStyle::Cylindrical);
    }

    #[test]
    fn test_simple_frame() {
        let params = LithophaneParams {
            width_mm: 20.0,
            frame: FrameStyle::Simple,
            ..Default::default()
        };
        let bright = Raster::from_fn(40, 20, |_, _| 0.0);
        let panel = generate_lithophane(&bright, &params).unwrap();

        assert_eq!(
            panel.mesh.triangle_count(),
            grid_triangle_count(40, 20) + 4 * 12
        );
        let dims = panel.mesh.dimensions();
        let inner_width = 39.0 * panel.pixel_size;
        assert_relative_eq!(dims.x, inner_width + 10.0, epsilon = 1e-9);
        assert_relative_eq!(dims.z, 3.0 + 1.0, epsilon = 1e-3);
        assert!(is_watertight(&panel.mesh));
    }

    #[test]
    fn test_rejects_inverted_thickness_range() {
        let params = LithophaneParams {
            min_thickness: 2.0,
            max_thickness: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            generate_lithophane(&gradient(10, 10), &params),
            Err(MeshError::InvalidParameter { name: "max_thickness", .. })
        ));
    }

    #[test]
    fn test_image_height() {
        let params = LithophaneParams {
            width_mm: 50.0,
            ..Default::default()
        };
        let panel = generate_lithophane(&gradient(200, 100), &params).unwrap();
        assert_eq!(panel.columns, 100);
        assert_relative_eq!(panel.image_height_mm(), 25.0);
    }
}
