//! # Forgemesh I/O
//!
//! The file boundary around the `forgemesh` core: image decoding, mesh
//! formats, and pipelines that run a whole conversion from one file to
//! another.
//!
//! ## Architecture
//!
//! ```text
//! raster (image crate) ──┐
//!                        ├──► forgemesh core ──► export (STL / OBJ)
//! model (STL, OBJ) ──────┘
//!                 pipeline: convert_* / fix_model / convert_batch
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use forgemesh::HeightmapParams;
//! use forgemesh_io::pipeline::{convert_heightmap, PipelineOptions};
//!
//! let report = convert_heightmap(
//!     Path::new("photo.png"),
//!     Path::new("out/relief.stl"),
//!     &HeightmapParams::default(),
//!     &PipelineOptions::default(),
//! )?;
//! println!("{} triangles, watertight: {}", report.triangles, report.validation.is_watertight);
//! # Ok::<(), forgemesh_io::IoError>(())
//! ```

pub mod error;
pub mod export;
pub mod model;
pub mod obj;
pub mod pipeline;
pub mod raster;
pub mod stl;

pub use error::{IoError, IoResult};
pub use export::{export_mesh, export_mesh_by_extension, ExportFormat};
pub use model::{load_model, LoadedModel};
pub use obj::ObjPart;
pub use pipeline::{
    convert_batch, convert_contour, convert_heightmap, convert_lithophane, fix_model,
    ConversionJob, ConversionMode, ConversionReport, PipelineOptions,
};
pub use raster::load_raster;
