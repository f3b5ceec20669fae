//! Body splitting and floating-piece removal.
//!
//! A body is a maximal set of triangles connected through shared edges.
//! Bodies are found with a union-find over an undirected edge map.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;
use crate::validate::is_watertight;

/// How a body's volume was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeSource {
    /// Enclosed volume of a watertight body.
    Exact,
    /// Bounding-box volume, used for open or flat bodies.
    BoundingBoxFallback,
}

/// Volume measurement for one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyVolume {
    pub volume: f64,
    pub source: VolumeSource,
    pub triangles: usize,
}

/// Result of [`remove_floating_bodies`].
#[derive(Debug, Clone)]
pub struct FloatingRemoval {
    pub mesh: Mesh,
    /// One entry per body found, in discovery order.
    pub bodies: Vec<BodyVolume>,
    /// Bodies dropped for falling below the ratio.
    pub removed: usize,
}

impl FloatingRemoval {
    /// Number of bodies measured with the bounding-box fallback.
    pub fn fallback_count(&self) -> usize {
        self.bodies
            .iter()
            .filter(|b| b.source == VolumeSource::BoundingBoxFallback)
            .count()
    }
}

/// Groups triangle indices by connected body, ordered by each body's
/// first triangle.
pub fn body_triangles(mesh: &Mesh) -> Vec<Vec<usize>> {
    let n = mesh.triangle_count();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut first_owner: HashMap<(u32, u32), usize> = HashMap::with_capacity(n * 3 / 2);
    for (t, tri) in mesh.triangles().iter().enumerate() {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            let edge = if a < b { (a, b) } else { (b, a) };
            let owner = *first_owner.entry(edge).or_insert(t);
            let (ra, rb) = (find(&mut parent, owner), find(&mut parent, t));
            if ra != rb {
                parent[rb.max(ra)] = ra.min(rb);
            }
        }
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for t in 0..n {
        let root = find(&mut parent, t);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(t);
    }
    groups
}

/// Splits `mesh` into one compacted mesh per body.
pub fn split_bodies(mesh: &Mesh) -> Vec<Mesh> {
    body_triangles(mesh)
        .iter()
        .map(|tris| mesh.submesh(tris))
        .collect()
}

/// Measures a single body.
///
/// Watertight bodies use the enclosed volume; anything else, or a
/// watertight body enclosing nothing, falls back to its bounding box.
pub fn body_volume(body: &Mesh) -> BodyVolume {
    let triangles = body.triangle_count();
    if is_watertight(body) {
        let volume = body.signed_volume().abs();
        if volume > 0.0 {
            return BodyVolume {
                volume,
                source: VolumeSource::Exact,
                triangles,
            };
        }
    }
    let dims = body.dimensions();
    BodyVolume {
        volume: dims.x * dims.y * dims.z,
        source: VolumeSource::BoundingBoxFallback,
        triangles,
    }
}

/// Drops bodies whose volume is below `min_ratio` of the largest body.
///
/// Applying the filter twice removes nothing the second time: survivors
/// keep their ratio to the largest body, which always survives.
pub fn remove_floating_bodies(mesh: Mesh, min_ratio: f64) -> FloatingRemoval {
    let groups = body_triangles(&mesh);
    let bodies: Vec<BodyVolume> = groups
        .iter()
        .map(|tris| body_volume(&mesh.submesh(tris)))
        .collect();

    let fallbacks = bodies
        .iter()
        .filter(|b| b.source == VolumeSource::BoundingBoxFallback)
        .count();
    if fallbacks > 0 {
        tracing::warn!(fallbacks, "measured open bodies by bounding-box volume");
    }

    let largest = bodies.iter().map(|b| b.volume).fold(0.0, f64::max);
    if groups.len() < 2 || largest <= 0.0 {
        return FloatingRemoval {
            mesh,
            bodies,
            removed: 0,
        };
    }

    let mut kept: Vec<usize> = Vec::with_capacity(mesh.triangle_count());
    let mut removed = 0;
    for (tris, body) in groups.iter().zip(&bodies) {
        if body.volume / largest >= min_ratio {
            kept.extend_from_slice(tris);
        } else {
            removed += 1;
        }
    }

    if removed == 0 {
        return FloatingRemoval {
            mesh,
            bodies,
            removed,
        };
    }

    kept.sort_unstable();
    tracing::info!(removed, kept_bodies = groups.len() - removed, "removed floating bodies");
    FloatingRemoval {
        mesh: mesh.submesh(&kept),
        bodies,
        removed,
    }
}
