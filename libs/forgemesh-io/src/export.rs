//! Mesh export to STL or OBJ.

use std::path::Path;

use forgemesh::Mesh;
use serde::{Deserialize, Serialize};

use crate::error::{extension_of, IoError, IoResult};
use crate::obj::save_obj;
use crate::stl::save_stl;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    StlBinary,
    StlAscii,
    Obj,
}

impl ExportFormat {
    /// Picks the format from the extension; `.stl` is binary.
    pub fn from_path(path: &Path) -> IoResult<Self> {
        match extension_of(path).as_str() {
            "stl" => Ok(Self::StlBinary),
            "obj" => Ok(Self::Obj),
            _ => Err(IoError::unsupported(path)),
        }
    }
}

/// Writes `mesh` to `path`, creating missing parent directories.
///
/// Returns the number of bytes written.
pub fn export_mesh(mesh: &Mesh, path: impl AsRef<Path>, format: ExportFormat) -> IoResult<u64> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let written = match format {
        ExportFormat::StlBinary => save_stl(mesh, path, false)?,
        ExportFormat::StlAscii => save_stl(mesh, path, true)?,
        ExportFormat::Obj => save_obj(mesh, path)?,
    };

    tracing::info!(
        path = %path.display(),
        ?format,
        triangles = mesh.triangle_count(),
        bytes = written,
        "mesh exported"
    );
    Ok(written)
}

/// [`export_mesh`] with the format taken from the extension.
pub fn export_mesh_by_extension(mesh: &Mesh, path: impl AsRef<Path>) -> IoResult<u64> {
    let path = path.as_ref();
    export_mesh(mesh, path, ExportFormat::from_path(path)?)
}
