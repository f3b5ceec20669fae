//! File-to-file conversion pipelines.
//!
//! Every pipeline ends the same way: fit to the bed (on by default),
//! validation, export chosen by the output extension, and a
//! [`ConversionReport`]. Contour conversions fit before their base plate
//! is added.
//! Validation problems are logged and reported but never block export.
//!
//! ```text
//! image ──► load_raster ──► heightmap | contour | lithophane ─┐
//!                                                            ├─► fit ─► validate ─► export
//! mesh  ──► load_model ──► flatten ──► repair_mesh ──────────┘
//! ```

use std::path::{Path, PathBuf};

use config::constants::CONTOUR_BASE_PADDING_MM;
use config::BuildVolume;
use forgemesh::repair::{add_base_plate, fit_to_build_volume};
use forgemesh::{
    extrude_contours, extrude_heightmap, generate_lithophane, repair_mesh, validate_mesh,
    ContourParams, HeightmapParams, LithophaneParams, Mesh, RepairParams, RepairReport,
    ValidationReport,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::IoResult;
use crate::export::export_mesh_by_extension;
use crate::model::{load_model, LoadedModel};
use crate::raster::load_raster;

/// Which pipeline produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    Heightmap,
    Contour,
    Lithophane,
    Fix,
}

/// Settings shared by every pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub build_volume: BuildVolume,
    /// Downscale meshes that overflow the build volume, on by default
    pub fit_to_bed: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            build_volume: BuildVolume::default(),
            fit_to_bed: true,
        }
    }
}

impl PipelineOptions {
    /// Same options with the final fit disabled, for pipelines that fit
    /// at an earlier stage.
    fn without_fit(&self) -> Self {
        Self {
            fit_to_bed: false,
            ..*self
        }
    }
}

/// Summary of one conversion, serializable for dispatchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: ConversionMode,
    /// `[width, height]` of the source raster, absent for mesh inputs.
    pub input_resolution: Option<[usize; 2]>,
    pub triangles: usize,
    pub bytes_written: u64,
    pub validation: ValidationReport,
    /// Downscale applied to fit the bed.
    pub fit_factor: Option<f64>,
    /// Contour loops traced and polygons extruded.
    pub contours: Option<[usize; 2]>,
    pub repair: Option<RepairReport>,
}

impl ConversionReport {
    /// Pretty-printed JSON for dispatchers and logs.
    pub fn to_json(&self) -> IoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Image to heightmap relief.
pub fn convert_heightmap(
    input: &Path,
    output: &Path,
    params: &HeightmapParams,
    options: &PipelineOptions,
) -> IoResult<ConversionReport> {
    let raster = load_raster(input)?;
    let mesh = extrude_heightmap(&raster, params)?;

    let mut report = finish(mesh, input, output, ConversionMode::Heightmap, options)?;
    report.input_resolution = Some([raster.width(), raster.height()]);
    Ok(report)
}

/// Image to extruded silhouette, with an optional padded base plate.
///
/// The fit runs before the plate is added, so the plate keeps exactly
/// `base_height` whatever the downscale.
pub fn convert_contour(
    input: &Path,
    output: &Path,
    params: &ContourParams,
    base_height: f64,
    options: &PipelineOptions,
) -> IoResult<ConversionReport> {
    let raster = load_raster(input)?;
    let contour = extrude_contours(&raster, params)?;

    let mut mesh = contour.mesh;
    let mut fit_factor = None;
    if options.fit_to_bed {
        (mesh, fit_factor) = fit_to_build_volume(mesh, &options.build_volume);
    }
    if base_height > 0.0 {
        mesh = add_base_plate(mesh, base_height, CONTOUR_BASE_PADDING_MM)?;
        mesh.center_and_ground();
    }

    let mut report = finish(mesh, input, output, ConversionMode::Contour, &options.without_fit())?;
    report.input_resolution = Some([raster.width(), raster.height()]);
    report.contours = Some([contour.loops_found, contour.polygons_created]);
    report.fit_factor = fit_factor;
    Ok(report)
}

/// Image to backlit lithophane panel.
pub fn convert_lithophane(
    input: &Path,
    output: &Path,
    params: &LithophaneParams,
    options: &PipelineOptions,
) -> IoResult<ConversionReport> {
    let raster = load_raster(input)?;
    let panel = generate_lithophane(&raster, params)?;
    tracing::debug!(
        columns = panel.columns,
        rows = panel.rows,
        pixel_size = panel.pixel_size,
        "lithophane resampled"
    );

    let mut report = finish(panel.mesh, input, output, ConversionMode::Lithophane, options)?;
    report.input_resolution = Some([raster.width(), raster.height()]);
    Ok(report)
}

/// Repairs a mesh file. Without an explicit output the result goes to
/// [`default_fixed_output_path`].
///
/// Scenes are flattened first. `options.fit_to_bed` turns on the repair
/// fit stage, so the fit is never applied twice.
pub fn fix_model(
    input: &Path,
    output: Option<&Path>,
    params: &RepairParams,
    options: &PipelineOptions,
) -> IoResult<ConversionReport> {
    let output = output.map_or_else(|| default_fixed_output_path(input), Path::to_path_buf);

    let model = load_model(input)?;
    if let LoadedModel::Scene(parts) = &model {
        tracing::info!(parts = parts.len(), "flattening scene before repair");
    }
    let mesh = model.flatten();

    let mut params = params.clone();
    params.fit_to_build_volume |= options.fit_to_bed;
    let (mesh, repair) = repair_mesh(mesh, &params, &options.build_volume)?;

    let mut report = finish(mesh, input, &output, ConversionMode::Fix, &options.without_fit())?;
    report.fit_factor = repair.fit_factor;
    report.repair = Some(repair);
    Ok(report)
}

/// `<stem>_fixed.stl` next to `input`.
pub fn default_fixed_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    input.with_file_name(format!("{stem}_fixed.stl"))
}

fn finish(
    mut mesh: Mesh,
    input: &Path,
    output: &Path,
    mode: ConversionMode,
    options: &PipelineOptions,
) -> IoResult<ConversionReport> {
    let mut fit_factor = None;
    if options.fit_to_bed {
        (mesh, fit_factor) = fit_to_build_volume(mesh, &options.build_volume);
    }

    let validation = validate_mesh(&mesh, &options.build_volume);
    for issue in &validation.issues {
        tracing::warn!(output = %output.display(), "{issue}");
    }

    let bytes_written = export_mesh_by_extension(&mesh, output)?;
    Ok(ConversionReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        mode,
        input_resolution: None,
        triangles: mesh.triangle_count(),
        bytes_written,
        validation,
        fit_factor,
        contours: None,
        repair: None,
    })
}

/// One unit of work for [`convert_batch`].
#[derive(Debug, Clone)]
pub enum ConversionJob {
    Heightmap {
        input: PathBuf,
        output: PathBuf,
        params: HeightmapParams,
    },
    Contour {
        input: PathBuf,
        output: PathBuf,
        params: ContourParams,
        base_height: f64,
    },
    Lithophane {
        input: PathBuf,
        output: PathBuf,
        params: LithophaneParams,
    },
    Fix {
        input: PathBuf,
        output: Option<PathBuf>,
        params: RepairParams,
    },
}

impl ConversionJob {
    pub fn input(&self) -> &Path {
        match self {
            Self::Heightmap { input, .. }
            | Self::Contour { input, .. }
            | Self::Lithophane { input, .. }
            | Self::Fix { input, .. } => input,
        }
    }

    /// Runs the job on the current thread.
    pub fn run(&self, options: &PipelineOptions) -> IoResult<ConversionReport> {
        match self {
            Self::Heightmap {
                input,
                output,
                params,
            } => convert_heightmap(input, output, params, options),
            Self::Contour {
                input,
                output,
                params,
                base_height,
            } => convert_contour(input, output, params, *base_height, options),
            Self::Lithophane {
                input,
                output,
                params,
            } => convert_lithophane(input, output, params, options),
            Self::Fix {
                input,
                output,
                params,
            } => fix_model(input, output.as_deref(), params, options),
        }
    }
}

/// Runs independent jobs on the rayon pool.
///
/// Results come back in job order; one failing job does not affect the
/// others.
pub fn convert_batch(jobs: &[ConversionJob], options: &PipelineOptions) -> Vec<IoResult<ConversionReport>> {
    let results: Vec<_> = jobs
        .par_iter()
        .map(|job| {
            let result = job.run(options);
            if let Err(e) = &result {
                tracing::warn!(input = %job.input().display(), error = %e, "conversion failed");
            }
            result
        })
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(jobs = jobs.len(), failed, "batch finished");
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fixed_output_path() {
        assert_eq!(
            default_fixed_output_path(Path::new("/models/bunny.obj")),
            PathBuf::from("/models/bunny_fixed.stl")
        );
        assert_eq!(
            default_fixed_output_path(Path::new("part.stl")),
            PathBuf::from("part_fixed.stl")
        );
    }

    #[test]
    fn test_report_serializes_mode() {
        let json = serde_json::to_string(&ConversionMode::Lithophane).unwrap();
        assert_eq!(json, "\"lithophane\"");
    }
}
