//! # Forgemesh
//!
//! Turns 2D rasters into closed, printable triangle meshes and prepares
//! arbitrary meshes for printing.
//!
//! ## Architecture
//!
//! ```text
//! Raster ─┬─ grid ─────┬─ heightmap
//!         │            └─ lithophane
//!         └─ threshold ── contour (trace → simplify → repair/union → extrude)
//!
//! Mesh ── repair (orient → bodies → scale → center → base → fit) ── validate
//! ```
//!
//! ## Conventions
//!
//! - Triangles are counter-clockwise seen from outside.
//! - Every synthesis output is centered on X = Y = 0 and grounded at Z = 0.
//! - Everything is synchronous and allocation-bounded by the input size;
//!   there is no file I/O in this crate.
//!
//! ## Usage
//!
//! ```rust
//! use config::BuildVolume;
//! use forgemesh::heightmap::{extrude_heightmap, HeightmapParams};
//! use forgemesh::validate::validate_mesh;
//! use forgemesh::Raster;
//!
//! let raster = Raster::from_fn(32, 32, |row, col| ((row * col) % 256) as f64);
//! let mesh = extrude_heightmap(&raster, &HeightmapParams::default()).unwrap();
//! let report = validate_mesh(&mesh, &BuildVolume::default());
//! assert!(report.is_watertight);
//! ```

pub mod contour;
pub mod error;
pub mod grid;
pub mod heightmap;
pub mod lithophane;
pub mod mesh;
pub mod primitives;
pub mod raster;
pub mod repair;
pub mod validate;

pub use contour::{extrude_contours, ContourOutput, ContourParams};
pub use error::{MeshError, MeshResult};
pub use grid::{build_grid_solid, HeightGrid};
pub use heightmap::{extrude_heightmap, HeightmapParams};
pub use lithophane::{
    generate_lithophane, FrameStyle, LithophanePanel, LithophaneParams, LithophaneStyle,
};
pub use mesh::Mesh;
pub use raster::{BinaryMask, Raster};
pub use repair::{repair_mesh, RepairParams, RepairReport};
pub use validate::{is_watertight, validate_mesh, ValidationReport};
