//! Mesh file loading.

use std::path::Path;

use forgemesh::Mesh;

use crate::error::{extension_of, IoError, IoResult};
use crate::obj::{load_obj, ObjPart};
use crate::stl::load_stl;

/// A loaded mesh file: one mesh, or a scene of named parts.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedModel {
    Mesh(Mesh),
    Scene(Vec<ObjPart>),
}

impl LoadedModel {
    /// Number of parts, 1 for a plain mesh.
    pub fn part_count(&self) -> usize {
        match self {
            LoadedModel::Mesh(_) => 1,
            LoadedModel::Scene(parts) => parts.len(),
        }
    }

    /// Merges every part into a single mesh. Parts are kept as separate
    /// bodies; nothing is welded.
    pub fn flatten(self) -> Mesh {
        match self {
            LoadedModel::Mesh(mesh) => mesh,
            LoadedModel::Scene(parts) => Mesh::concat(parts.iter().map(|p| &p.mesh)),
        }
    }
}

/// Loads an STL or OBJ file, chosen by extension.
///
/// An OBJ with a single part loads as [`LoadedModel::Mesh`].
///
/// # Errors
///
/// [`IoError::UnsupportedFormat`] for any other extension, plus the
/// reader's own errors.
pub fn load_model(path: impl AsRef<Path>) -> IoResult<LoadedModel> {
    let path = path.as_ref();
    match extension_of(path).as_str() {
        "stl" => Ok(LoadedModel::Mesh(load_stl(path)?)),
        "obj" => {
            let mut parts = load_obj(path)?;
            if parts.len() == 1 {
                let part = parts.remove(0);
                Ok(LoadedModel::Mesh(part.mesh))
            } else if parts.is_empty() {
                Err(IoError::Decode {
                    path: path.to_path_buf(),
                    message: "no faces".to_string(),
                })
            } else {
                Ok(LoadedModel::Scene(parts))
            }
        }
        _ => Err(IoError::unsupported(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::save_obj;
    use crate::stl::save_stl;
    use forgemesh::primitives::{box_between, create_box};
    use glam::DVec3;

    #[test]
    fn test_stl_loads_as_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.STL");
        save_stl(&create_box(DVec3::ONE, false).unwrap(), &path, true).unwrap();

        let model = load_model(&path).unwrap();
        assert_eq!(model.part_count(), 1);
        assert_eq!(model.flatten().triangle_count(), 12);
    }

    #[test]
    fn test_single_part_obj_is_a_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.obj");
        save_obj(&create_box(DVec3::ONE, false).unwrap(), &path).unwrap();
        assert!(matches!(load_model(&path).unwrap(), LoadedModel::Mesh(_)));
    }

    #[test]
    fn test_scene_flattens_to_all_parts() {
        let a = box_between(DVec3::ZERO, DVec3::ONE).unwrap();
        let b = box_between(DVec3::splat(5.0), DVec3::splat(6.0)).unwrap();
        let scene = LoadedModel::Scene(vec![
            ObjPart { name: "a".into(), mesh: a },
            ObjPart { name: "b".into(), mesh: b },
        ]);
        assert_eq!(scene.part_count(), 2);

        let mesh = scene.flatten();
        assert_eq!(mesh.triangle_count(), 24);
        assert_eq!(mesh.vertex_count(), 16);
    }

    #[test]
    fn test_unknown_extension() {
        let err = load_model("model.3mf").unwrap_err();
        assert!(matches!(
            err,
            IoError::UnsupportedFormat { ref extension } if extension == "3mf"
        ));
    }
}
