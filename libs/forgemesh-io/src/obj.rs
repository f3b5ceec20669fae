//! Wavefront OBJ reading and writing.
//!
//! Reading goes through `tobj`; every `o` or `g` block becomes one named
//! part. Polygons are fan-triangulated and positions keep their file
//! indices, so shared edges survive without welding. Materials, normals
//! and texture coordinates are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use forgemesh::Mesh;
use glam::DVec3;

use crate::error::{IoError, IoResult};
use crate::stl::CountingWriter;

/// One named part of an OBJ file.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjPart {
    pub name: String,
    pub mesh: Mesh,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Loads every part of an OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> IoResult<Vec<ObjPart>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::opening(path, e))?;
    let parts = read_obj(&mut BufReader::new(file)).map_err(|e| match e {
        IoError::InvalidContent { message } => IoError::Decode {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })?;
    tracing::debug!(path = %path.display(), parts = parts.len(), "loaded OBJ");
    Ok(parts)
}

/// Parses OBJ text from any buffered reader.
pub fn read_obj<R: BufRead>(reader: &mut R) -> IoResult<Vec<ObjPart>> {
    let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .map_err(|e| IoError::invalid_content(format!("OBJ parse failed: {e}")))?;

    models
        .into_iter()
        .filter(|m| !m.mesh.indices.is_empty())
        .map(|model| {
            let vertices = model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| DVec3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2])))
                .collect();
            let triangles = model
                .mesh
                .indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect();
            let mesh = Mesh::from_parts(vertices, triangles)?;
            Ok(ObjPart {
                name: model.name,
                mesh,
            })
        })
        .collect()
}

/// Writes `mesh` as a single OBJ object and returns the bytes written.
pub fn write_obj<W: Write>(mesh: &Mesh, name: &str, writer: W) -> IoResult<u64> {
    let mut writer = CountingWriter::new(writer);
    writeln!(writer, "# written by forgemesh")?;
    writeln!(writer, "o {name}")?;
    for v in mesh.vertices() {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    writer.flush()?;
    Ok(writer.written)
}

/// Saves `mesh` to `path` as OBJ, naming the object after the file stem.
pub fn save_obj(mesh: &Mesh, path: impl AsRef<Path>) -> IoResult<u64> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh");
    write_obj(mesh, name, BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgemesh::is_watertight;
    use forgemesh::primitives::create_box;

    const TWO_PARTS: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
g second
v 5 5 5
v 6 5 5
v 6 6 5
v 5 6 5
f 4 5 6 7
";

    #[test]
    fn test_groups_become_parts() {
        let parts = read_obj(&mut TWO_PARTS.as_bytes()).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "first");
        assert_eq!(parts[0].mesh.triangle_count(), 1);
        assert_eq!(parts[1].name, "second");
        // Quad fan-triangulated
        assert_eq!(parts[1].mesh.triangle_count(), 2);
        assert_eq!(parts[1].mesh.vertex_count(), 4);
    }

    #[test]
    fn test_round_trip_keeps_topology() {
        let cube = create_box(DVec3::splat(3.0), true).unwrap();
        let mut bytes = Vec::new();
        let written = write_obj(&cube, "cube", &mut bytes).unwrap();
        assert_eq!(written as usize, bytes.len());

        let parts = read_obj(&mut bytes.as_slice()).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "cube");
        assert_eq!(parts[0].mesh.vertex_count(), 8);
        assert!(is_watertight(&parts[0].mesh));
    }

    #[test]
    fn test_save_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.obj");
        let cube = create_box(DVec3::ONE, false).unwrap();
        save_obj(&cube, &path).unwrap();
        let parts = load_obj(&path).unwrap();
        assert_eq!(parts[0].name, "widget");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_obj("/nope/missing.obj"),
            Err(IoError::FileNotFound { .. })
        ));
    }
}
