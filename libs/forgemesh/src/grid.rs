//! # Grid Mesh Builder
//!
//! Turns a 2-D array of per-cell heights into a closed solid: a top surface
//! following the heights, a flat bottom at Z = 0, and ruled walls around
//! the perimeter.
//!
//! ## Layout
//!
//! ```text
//! top block     idx(i, j) = i * W + j           z = base + h[i][j]
//! bottom block  idx(i, j) + W * H               z = 0
//! ```
//!
//! Rows map to Y and columns to X, both multiplied by the spacing. Every
//! cell quad is split along its top-left to bottom-right diagonal.

use glam::DVec3;

use crate::error::{require_non_negative, require_positive, MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::raster::Raster;

/// Row-major grid of heights (row = Y, column = X).
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl HeightGrid {
    /// Creates a grid from row-major values.
    ///
    /// # Errors
    ///
    /// Fails when `values.len() != width * height`. Value checks happen in
    /// [`build_grid_solid`].
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> MeshResult<Self> {
        if values.len() != width * height {
            return Err(MeshError::invalid_parameter(
                "height grid",
                values.len() as f64,
                "value count must equal width * height",
            ));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Creates a grid by evaluating `f(row, column)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                values.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    /// Maps every raster intensity through `f`.
    pub fn from_raster(raster: &Raster, mut f: impl FnMut(f64) -> f64) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            values: raster.data().iter().map(|&v| f(v)).collect(),
        }
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Height at `(row, column)`.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.width + column]
    }

    /// Smallest and largest value.
    pub fn range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Number of triangles [`build_grid_solid`] emits for a `width` by `height`
/// grid.
///
/// # Example
///
/// ```rust
/// use forgemesh::grid::grid_triangle_count;
///
/// assert_eq!(grid_triangle_count(2, 2), 12);
/// ```
pub fn grid_triangle_count(width: usize, height: usize) -> usize {
    if width < 2 || height < 2 {
        return 0;
    }
    4 * (width - 1) * (height - 1) + 4 * ((width - 1) + (height - 1))
}

/// Builds a watertight solid from a height grid.
///
/// # Arguments
///
/// * `grid` - Per-cell heights, all finite and non-negative
/// * `spacing` - Distance between neighbouring cells along X and Y
/// * `base` - Elevation added to every height
///
/// # Errors
///
/// - [`MeshError::InsufficientResolution`] when either side is below 2
/// - [`MeshError::InvalidHeightValue`] for NaN, negative or infinite heights
/// - [`MeshError::InvalidParameter`] for a non-positive spacing or a
///   negative base
///
/// # Example
///
/// ```rust
/// use forgemesh::grid::{build_grid_solid, HeightGrid};
///
/// let grid = HeightGrid::from_fn(3, 3, |_, _| 1.0);
/// let mesh = build_grid_solid(&grid, 0.5, 0.0).unwrap();
/// assert_eq!(mesh.vertex_count(), 18);
/// assert_eq!(mesh.triangle_count(), 32);
/// ```
pub fn build_grid_solid(grid: &HeightGrid, spacing: f64, base: f64) -> MeshResult<Mesh> {
    let (w, h) = (grid.width, grid.height);
    if w < 2 || h < 2 {
        return Err(MeshError::InsufficientResolution {
            width: w,
            height: h,
        });
    }
    require_positive("spacing", spacing)?;
    require_non_negative("base", base)?;
    if let Some((index, &value)) = grid
        .values
        .iter()
        .enumerate()
        .find(|(_, v)| !(v.is_finite() && **v >= 0.0))
    {
        return Err(MeshError::InvalidHeightValue {
            row: index / w,
            column: index % w,
            value,
        });
    }

    let mut mesh = Mesh::with_capacity(2 * w * h, grid_triangle_count(w, h));

    for i in 0..h {
        for j in 0..w {
            mesh.add_vertex(DVec3::new(
                j as f64 * spacing,
                i as f64 * spacing,
                base + grid.get(i, j),
            ));
        }
    }
    for i in 0..h {
        for j in 0..w {
            mesh.add_vertex(DVec3::new(j as f64 * spacing, i as f64 * spacing, 0.0));
        }
    }

    let top = |i: usize, j: usize| (i * w + j) as u32;
    let bot = |i: usize, j: usize| (w * h + i * w + j) as u32;

    // Surfaces
    for i in 0..h - 1 {
        for j in 0..w - 1 {
            let (tl, tr, bl, br) = (top(i, j), top(i, j + 1), top(i + 1, j), top(i + 1, j + 1));
            mesh.add_triangle(tl, tr, br);
            mesh.add_triangle(tl, br, bl);

            let (tl, tr, bl, br) = (bot(i, j), bot(i, j + 1), bot(i + 1, j), bot(i + 1, j + 1));
            mesh.add_triangle(tl, br, tr);
            mesh.add_triangle(tl, bl, br);
        }
    }

    // Walls along the first and last rows
    let last_row = h - 1;
    for j in 0..w - 1 {
        mesh.add_triangle(bot(0, j), bot(0, j + 1), top(0, j + 1));
        mesh.add_triangle(bot(0, j), top(0, j + 1), top(0, j));

        mesh.add_triangle(bot(last_row, j + 1), bot(last_row, j), top(last_row, j));
        mesh.add_triangle(bot(last_row, j + 1), top(last_row, j), top(last_row, j + 1));
    }

    // Walls along the first and last columns
    let last_col = w - 1;
    for i in 0..h - 1 {
        mesh.add_triangle(bot(i + 1, 0), bot(i, 0), top(i, 0));
        mesh.add_triangle(bot(i + 1, 0), top(i, 0), top(i + 1, 0));

        mesh.add_triangle(bot(i, last_col), bot(i + 1, last_col), top(i + 1, last_col));
        mesh.add_triangle(bot(i, last_col), top(i + 1, last_col), top(i, last_col));
    }

    Ok(mesh)
}
