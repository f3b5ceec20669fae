//! # Contour Tracing
//!
//! Extracts closed boundary loops from a binary mask together with their
//! nesting hierarchy.
//!
//! [`BoundaryTracer`] walks the cracks between foreground and background
//! pixels, so loop vertices sit on pixel corners and a filled `n x n` block
//! yields an `n x n` square. Foreground is 8-connected (diagonal neighbours
//! join into one region) and background is 4-connected. Straight runs are
//! compressed to their end points.

use glam::DVec2;
use hashbrown::HashMap;

use super::polygon::{point_in_ring, ring_bounds, signed_area, Ring};
use crate::raster::BinaryMask;

/// One closed boundary loop.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedLoop {
    /// Corner points in pixel coordinates (x = column, y = row).
    pub points: Ring,
    /// Index of the nearest enclosing loop.
    pub parent: Option<usize>,
    /// Nesting depth; even for outer boundaries, odd for holes.
    pub depth: usize,
}

impl TracedLoop {
    /// True for the inner boundary of a region.
    #[inline]
    pub fn is_hole(&self) -> bool {
        self.depth % 2 == 1
    }
}

/// Loops plus hierarchy produced by a [`ContourTracer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourSet {
    pub loops: Vec<TracedLoop>,
}

impl ContourSet {
    /// Number of loops.
    #[inline]
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// True when no loop was found.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Indices of loops whose parent is `parent`.
    pub fn children_of(&self, parent: Option<usize>) -> impl Iterator<Item = usize> + '_ {
        self.loops
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.parent == parent)
            .map(|(i, _)| i)
    }
}

/// Collaborator that turns a binary mask into loops and hierarchy.
pub trait ContourTracer {
    /// Traces every foreground boundary in `mask`.
    fn trace(&self, mask: &BinaryMask) -> ContourSet;
}

/// Pixel-crack boundary tracer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryTracer;

type Corner = (i64, i64);

#[derive(Debug, Clone, Copy)]
struct Crack {
    from: Corner,
    to: Corner,
}

impl Crack {
    fn direction(&self) -> Corner {
        (self.to.0 - self.from.0, self.to.1 - self.from.1)
    }
}

impl ContourTracer for BoundaryTracer {
    fn trace(&self, mask: &BinaryMask) -> ContourSet {
        let cracks = collect_cracks(mask);
        let rings = link_cracks(&cracks);
        let loops = build_hierarchy(rings);
        tracing::debug!(loops = loops.len(), "traced mask boundaries");
        ContourSet { loops }
    }
}

/// Emits one directed crack per foreground/background pixel edge, with the
/// foreground on the left in a Y-up frame. Outer boundaries therefore get a
/// positive signed area and holes a negative one.
fn collect_cracks(mask: &BinaryMask) -> Vec<Crack> {
    let mut cracks = Vec::new();
    for r in 0..mask.height() as i64 {
        for c in 0..mask.width() as i64 {
            if !mask.get_signed(r, c) {
                continue;
            }
            if !mask.get_signed(r - 1, c) {
                cracks.push(Crack { from: (c, r), to: (c + 1, r) });
            }
            if !mask.get_signed(r, c + 1) {
                cracks.push(Crack { from: (c + 1, r), to: (c + 1, r + 1) });
            }
            if !mask.get_signed(r + 1, c) {
                cracks.push(Crack { from: (c + 1, r + 1), to: (c, r + 1) });
            }
            if !mask.get_signed(r, c - 1) {
                cracks.push(Crack { from: (c, r + 1), to: (c, r) });
            }
        }
    }
    cracks
}

/// Chains cracks into closed rings.
///
/// At a saddle corner two cracks leave the same point; the right-hand turn
/// is taken, which joins diagonally touching foreground pixels.
fn link_cracks(cracks: &[Crack]) -> Vec<Ring> {
    let mut outgoing: HashMap<Corner, Vec<usize>> = HashMap::with_capacity(cracks.len());
    for (i, crack) in cracks.iter().enumerate() {
        outgoing.entry(crack.from).or_default().push(i);
    }

    let mut used = vec![false; cracks.len()];
    let mut rings = Vec::new();

    for start in 0..cracks.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut corners = vec![cracks[start].from];
        let mut current = start;

        loop {
            let here = cracks[current].to;
            let incoming = cracks[current].direction();
            let next = outgoing
                .get(&here)
                .into_iter()
                .flatten()
                .copied()
                .filter(|&e| !used[e] || e == start)
                .min_by_key(|&e| turn_rank(incoming, cracks[e].direction()));

            match next {
                Some(e) if e == start => break,
                Some(e) => {
                    used[e] = true;
                    corners.push(here);
                    current = e;
                }
                // Every corner has matching in and out degree, so an open
                // chain cannot happen; stop rather than loop forever.
                None => break,
            }
        }

        rings.push(compress_runs(&corners));
    }
    rings
}

/// Orders candidate exits: right turn, then straight, then left.
fn turn_rank(incoming: Corner, outgoing: Corner) -> u8 {
    let cross = incoming.0 * outgoing.1 - incoming.1 * outgoing.0;
    match cross.signum() {
        -1 => 0,
        0 => 1,
        _ => 2,
    }
}

/// Keeps only the corners where the direction changes.
fn compress_runs(corners: &[Corner]) -> Ring {
    let n = corners.len();
    let mut ring = Vec::with_capacity(n);
    for i in 0..n {
        let prev = corners[(i + n - 1) % n];
        let here = corners[i];
        let next = corners[(i + 1) % n];
        let d_in = (here.0 - prev.0, here.1 - prev.1);
        let d_out = (next.0 - here.0, next.1 - here.1);
        if d_in.0 * d_out.1 - d_in.1 * d_out.0 != 0 {
            ring.push(DVec2::new(here.0 as f64, here.1 as f64));
        }
    }
    ring
}

/// Assigns each ring the smallest ring that encloses it.
///
/// The probe point sits a quarter pixel off the middle of the ring's first
/// edge, on the foreground side. Probes never fall on a crack, and the
/// pixel they land in is enclosed by exactly the loops that enclose the
/// ring itself.
fn build_hierarchy(rings: Vec<Ring>) -> Vec<TracedLoop> {
    let areas: Vec<f64> = rings.iter().map(|r| signed_area(r).abs()).collect();
    let bounds: Vec<_> = rings.iter().map(|r| ring_bounds(r)).collect();

    let parents: Vec<Option<usize>> = rings
        .iter()
        .enumerate()
        .map(|(i, ring)| {
            let probe = probe_point(ring)?;
            (0..rings.len())
                .filter(|&k| k != i && areas[k] > areas[i])
                .filter(|&k| {
                    let (lo, hi) = bounds[k];
                    probe.cmpge(lo).all() && probe.cmple(hi).all()
                })
                .filter(|&k| point_in_ring(probe, &rings[k]))
                .min_by(|&a, &b| areas[a].total_cmp(&areas[b]))
        })
        .collect();

    let depth_of = |mut i: usize| {
        let mut depth = 0;
        while let Some(p) = parents[i] {
            depth += 1;
            i = p;
        }
        depth
    };
    let depths: Vec<usize> = (0..rings.len()).map(depth_of).collect();

    rings
        .into_iter()
        .zip(parents)
        .zip(depths)
        .map(|((points, parent), depth)| TracedLoop {
            points,
            parent,
            depth,
        })
        .collect()
}

fn probe_point(ring: &[DVec2]) -> Option<DVec2> {
    let a = *ring.first()?;
    let b = *ring.get(1)?;
    let dir = (b - a).normalize_or_zero();
    // Left of the edge in a Y-up frame
    let left = DVec2::new(-dir.y, dir.x);
    // Keep off the pixel grid: half a pixel along, a quarter pixel across
    Some(a + dir * 0.5 + left * 0.25)
}
