//! # Polygon Kernel
//!
//! The two polygon operations the contour pipeline needs: "make valid"
//! repair and union of overlapping polygons.
//!
//! [`ContourKernel`] splits self-intersecting rings into simple loops
//! itself and delegates boolean operations to `cavalier_contours`.

use cavalier_contours::polyline::*;
use config::constants::AREA_EPSILON;
use glam::DVec2;
use hashbrown::HashMap;

use super::polygon::{
    clean_ring, interior_point, point_in_ring, ring_bounds, signed_area, PolygonWithHoles, Ring,
};

/// Collaborator providing polygon repair and union.
pub trait PolygonKernel {
    /// Turns a possibly invalid polygon into zero or more valid ones.
    fn repair(&self, polygon: &PolygonWithHoles) -> Vec<PolygonWithHoles>;

    /// Merges overlapping polygons; disjoint polygons pass through.
    fn union(&self, polygons: Vec<PolygonWithHoles>) -> Vec<PolygonWithHoles>;
}

/// Default kernel for traced contours.
#[derive(Debug, Clone, Copy)]
pub struct ContourKernel {
    /// Pieces with a smaller absolute area are dropped during repair.
    pub min_area: f64,
}

impl Default for ContourKernel {
    fn default() -> Self {
        Self {
            min_area: AREA_EPSILON,
        }
    }
}

impl PolygonKernel for ContourKernel {
    fn repair(&self, polygon: &PolygonWithHoles) -> Vec<PolygonWithHoles> {
        let mut pieces: Vec<PolygonWithHoles> = split_ring(&polygon.outer)
            .into_iter()
            .filter(|r| signed_area(r).abs() >= self.min_area)
            .map(|r| PolygonWithHoles::new(oriented(r, true)))
            .collect();

        let holes = polygon
            .holes
            .iter()
            .flat_map(|h| split_ring(h))
            .filter(|r| signed_area(r).abs() >= self.min_area);

        for hole in holes {
            pieces = attach_hole(pieces, oriented(hole, false), self.min_area);
        }
        pieces
    }

    fn union(&self, polygons: Vec<PolygonWithHoles>) -> Vec<PolygonWithHoles> {
        let mut pending: Vec<PolygonWithHoles> =
            polygons.iter().map(PolygonWithHoles::normalized).collect();
        let mut settled: Vec<PolygonWithHoles> = Vec::with_capacity(pending.len());
        let mut merges = 0usize;

        while let Some(current) = pending.pop() {
            let partner = settled.iter().position(|other| overlaps(other, &current));
            match partner {
                Some(i) => {
                    let other = settled.swap_remove(i);
                    match merge_pair(&other, &current, self.min_area) {
                        Some(merged) => {
                            merges += 1;
                            pending.push(merged);
                        }
                        None => {
                            // Kernel could not merge; keep both untouched
                            tracing::warn!("polygon union failed, keeping overlapping parts");
                            settled.push(other);
                            settled.push(current);
                        }
                    }
                }
                None => settled.push(current),
            }
        }

        if merges > 0 {
            tracing::debug!(merges, remaining = settled.len(), "merged overlapping polygons");
        }
        settled
    }
}

// =============================================================================
// RING SPLITTING
// =============================================================================

/// Splits a ring at its self-intersections into simple loops.
pub fn split_ring(ring: &[DVec2]) -> Vec<Ring> {
    let ring = clean_ring(ring);
    if ring.len() < 3 {
        return Vec::new();
    }

    let walk = insert_crossings(&ring);

    let mut loops = Vec::new();
    let mut stack: Vec<DVec2> = Vec::with_capacity(walk.len());
    let mut seen: HashMap<(i64, i64), usize> = HashMap::new();

    for p in walk {
        let key = quantize(p);
        if let Some(&k) = seen.get(&key) {
            let piece: Ring = stack.drain(k..).collect();
            for q in &piece {
                seen.remove(&quantize(*q));
            }
            loops.push(piece);
        }
        seen.insert(key, stack.len());
        stack.push(p);
    }
    loops.push(stack);

    loops
        .into_iter()
        .map(|l| clean_ring(&l))
        .filter(|l| l.len() >= 3)
        .collect()
}

/// Returns the ring's vertices with every crossing point inserted into
/// the segments it lies on.
fn insert_crossings(ring: &[DVec2]) -> Vec<DVec2> {
    let n = ring.len();
    let mut extra: Vec<Vec<(f64, DVec2)>> = vec![Vec::new(); n];

    for i in 0..n {
        let (a0, a1) = (ring[i], ring[(i + 1) % n]);
        for j in i + 1..n {
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (b0, b1) = (ring[j], ring[(j + 1) % n]);
            if let Some((t, u, point)) = segment_intersection(a0, a1, b0, b1) {
                if t > PARAM_EPSILON && t < 1.0 - PARAM_EPSILON {
                    extra[i].push((t, point));
                }
                if u > PARAM_EPSILON && u < 1.0 - PARAM_EPSILON {
                    extra[j].push((u, point));
                }
            }
        }
    }

    let mut walk = Vec::with_capacity(n * 2);
    for (i, mut points) in extra.into_iter().enumerate() {
        walk.push(ring[i]);
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        walk.extend(points.into_iter().map(|(_, p)| p));
    }
    walk
}

const PARAM_EPSILON: f64 = 1e-9;

/// Intersection of two segments as `(t, u, point)` with `t` along the first
/// and `u` along the second. Parallel segments report nothing.
fn segment_intersection(a0: DVec2, a1: DVec2, b0: DVec2, b1: DVec2) -> Option<(f64, f64, DVec2)> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.perp_dot(s);
    if denom.abs() < AREA_EPSILON {
        return None;
    }
    let qp = b0 - a0;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    let range = -PARAM_EPSILON..=1.0 + PARAM_EPSILON;
    (range.contains(&t) && range.contains(&u)).then(|| (t, u, a0 + r * t))
}

fn quantize(p: DVec2) -> (i64, i64) {
    ((p.x * 1e6).round() as i64, (p.y * 1e6).round() as i64)
}

/// True when any edge of `a` touches any edge of `b`.
pub fn rings_intersect(a: &[DVec2], b: &[DVec2]) -> bool {
    let (a_lo, a_hi) = ring_bounds(a);
    let (b_lo, b_hi) = ring_bounds(b);
    if a_hi.cmplt(b_lo).any() || b_hi.cmplt(a_lo).any() {
        return false;
    }
    let (n, m) = (a.len(), b.len());
    (0..n).any(|i| {
        (0..m).any(|j| {
            segment_intersection(a[i], a[(i + 1) % n], b[j], b[(j + 1) % m]).is_some()
        })
    })
}

fn oriented(mut ring: Ring, counter_clockwise: bool) -> Ring {
    if (signed_area(&ring) > 0.0) != counter_clockwise {
        ring.reverse();
    }
    ring
}

// =============================================================================
// HOLE ASSIGNMENT
// =============================================================================

/// Places a clockwise hole into the piece that contains it, merging it with
/// holes it overlaps and cutting it out of outers it crosses.
fn attach_hole(pieces: Vec<PolygonWithHoles>, hole: Ring, min_area: f64) -> Vec<PolygonWithHoles> {
    let Some(probe) = interior_point(&hole) else {
        return pieces;
    };

    let mut result = Vec::with_capacity(pieces.len());
    let mut placed = false;

    for mut piece in pieces {
        if placed {
            result.push(piece);
            continue;
        }

        if rings_intersect(&piece.outer, &hole) {
            placed = true;
            result.extend(cut_piece(&piece, &hole, min_area));
            continue;
        }

        if !point_in_ring(probe, &piece.outer) {
            result.push(piece);
            continue;
        }

        placed = true;
        let mut merged_hole = hole.clone();
        let mut kept = Vec::with_capacity(piece.holes.len() + 1);
        for existing in piece.holes.drain(..) {
            let overlapping = rings_intersect(&existing, &merged_hole)
                || interior_point(&existing).is_some_and(|p| point_in_ring(p, &merged_hole));
            match overlapping.then(|| or_rings(&existing, &merged_hole)).flatten() {
                Some(joined) => merged_hole = oriented(joined, false),
                None => kept.push(existing),
            }
        }
        kept.push(merged_hole);
        piece.holes = kept;
        result.push(piece);
    }

    if !placed {
        tracing::warn!("dropping hole that lies outside every outer boundary");
    }
    result
}

/// Subtracts `hole` from `piece.outer`, re-attaching the piece's existing
/// holes to whichever fragment contains them.
fn cut_piece(piece: &PolygonWithHoles, hole: &[DVec2], min_area: f64) -> Vec<PolygonWithHoles> {
    let outer = to_pline(&piece.outer);
    let cutter = to_pline(hole);
    let result = outer.boolean(&cutter, BooleanOp::Not);

    let mut fragments: Vec<PolygonWithHoles> = result
        .pos_plines
        .iter()
        .map(|p| from_pline(&p.pline))
        .filter(|r| signed_area(r).abs() >= min_area)
        .map(|r| PolygonWithHoles::new(oriented(r, true)))
        .collect();

    for existing in &piece.holes {
        fragments = attach_hole(fragments, existing.clone(), min_area);
    }
    fragments
}

// =============================================================================
// UNION
// =============================================================================

/// True when the filled regions of `a` and `b` share area.
///
/// A polygon sitting entirely inside another's hole does not overlap it.
fn overlaps(a: &PolygonWithHoles, b: &PolygonWithHoles) -> bool {
    if rings_intersect(&a.outer, &b.outer) {
        return true;
    }
    // Without boundary crossings any vertex tells whether one outer sits in
    // the other's filled region or in one of its holes
    let inside = |container: &PolygonWithHoles, inner: &PolygonWithHoles| {
        inner.outer.first().is_some_and(|p| container.contains(*p))
            || container
                .holes
                .iter()
                .any(|h| rings_intersect(h, &inner.outer))
    };
    inside(a, b) || inside(b, a)
}

/// Unions two overlapping polygons, or `None` when the kernel does not
/// produce a single outer boundary.
fn merge_pair(a: &PolygonWithHoles, b: &PolygonWithHoles, min_area: f64) -> Option<PolygonWithHoles> {
    let pa = to_pline(&a.outer);
    let pb = to_pline(&b.outer);
    let joined = pa.boolean(&pb, BooleanOp::Or);
    if joined.pos_plines.len() != 1 {
        return None;
    }
    let outer = oriented(from_pline(&joined.pos_plines[0].pline), true);

    let mut holes: Vec<Ring> = joined
        .neg_plines
        .iter()
        .map(|p| from_pline(&p.pline))
        .collect();

    // Hole area survives where the other polygon does not cover it
    for (own, other) in [(a, b), (b, a)] {
        let other_outer = to_pline(&other.outer);
        for h in &own.holes {
            let cut = to_pline(h).boolean(&other_outer, BooleanOp::Not);
            holes.extend(cut.pos_plines.iter().map(|p| from_pline(&p.pline)));
        }
    }
    for ha in &a.holes {
        let pa = to_pline(ha);
        for hb in &b.holes {
            let common = pa.boolean(&to_pline(hb), BooleanOp::And);
            holes.extend(common.pos_plines.iter().map(|p| from_pline(&p.pline)));
        }
    }

    let holes = holes
        .into_iter()
        .filter(|h| signed_area(h).abs() >= min_area)
        .map(|h| oriented(h, false))
        .collect();
    Some(PolygonWithHoles::with_holes(outer, holes))
}

/// Union of two rings when they form a single boundary.
fn or_rings(a: &[DVec2], b: &[DVec2]) -> Option<Ring> {
    let result = to_pline(a).boolean(&to_pline(b), BooleanOp::Or);
    (result.pos_plines.len() == 1).then(|| from_pline(&result.pos_plines[0].pline))
}

// =============================================================================
// CAVALIER CONVERSION
// =============================================================================

/// Closed, counter-clockwise polyline.
fn to_pline(ring: &[DVec2]) -> Polyline {
    let mut pline = Polyline::new();
    let reverse = signed_area(ring) < 0.0;
    let mut push = |p: &DVec2| pline.add(p.x, p.y, 0.0);
    if reverse {
        ring.iter().rev().for_each(&mut push);
    } else {
        ring.iter().for_each(&mut push);
    }
    pline.set_is_closed(true);
    pline
}

fn from_pline(pline: &Polyline) -> Ring {
    pline
        .vertex_data
        .iter()
        .map(|v| DVec2::new(v.x, v.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Ring {
        PolygonWithHoles::rectangle(DVec2::new(x, y), DVec2::new(w, h)).outer
    }

    #[test]
    fn test_split_figure_eight() {
        // Bow tie crossing at (1, 1)
        let ring = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(0.0, 2.0),
        ];
        let loops = split_ring(&ring);
        assert_eq!(loops.len(), 2);
        for l in &loops {
            assert_eq!(l.len(), 3);
            assert_relative_eq!(signed_area(l).abs(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_simple_ring_passes_through() {
        let loops = split_ring(&rect(0.0, 0.0, 3.0, 2.0));
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
    }

    #[test]
    fn test_repair_normalizes_winding() {
        let mut outer = rect(0.0, 0.0, 10.0, 10.0);
        outer.reverse();
        let hole = rect(2.0, 2.0, 2.0, 2.0);
        let repaired = ContourKernel::default().repair(&PolygonWithHoles::with_holes(outer, vec![hole]));
        assert_eq!(repaired.len(), 1);
        assert!(signed_area(&repaired[0].outer) > 0.0);
        assert_eq!(repaired[0].holes.len(), 1);
        assert!(signed_area(&repaired[0].holes[0]) < 0.0);
    }

    #[test]
    fn test_repair_bow_tie_keeps_both_lobes() {
        let ring = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 4.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(0.0, 4.0),
        ];
        let repaired = ContourKernel::default().repair(&PolygonWithHoles::new(ring));
        assert_eq!(repaired.len(), 2);
        let total: f64 = repaired.iter().map(PolygonWithHoles::area).sum();
        assert_relative_eq!(total, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repair_drops_outside_hole() {
        let polygon = PolygonWithHoles::with_holes(rect(0.0, 0.0, 4.0, 4.0), vec![rect(10.0, 10.0, 1.0, 1.0)]);
        let repaired = ContourKernel::default().repair(&polygon);
        assert_eq!(repaired.len(), 1);
        assert!(repaired[0].holes.is_empty());
    }

    #[test]
    fn test_union_disjoint_passes_through() {
        let polygons = vec![
            PolygonWithHoles::new(rect(0.0, 0.0, 1.0, 1.0)),
            PolygonWithHoles::new(rect(5.0, 5.0, 1.0, 1.0)),
        ];
        assert_eq!(ContourKernel::default().union(polygons).len(), 2);
    }

    #[test]
    fn test_union_overlapping_squares() {
        let polygons = vec![
            PolygonWithHoles::new(rect(0.0, 0.0, 4.0, 4.0)),
            PolygonWithHoles::new(rect(2.0, 2.0, 4.0, 4.0)),
        ];
        let merged = ContourKernel::default().union(polygons);
        assert_eq!(merged.len(), 1);
        assert_relative_eq!(merged[0].area(), 28.0, epsilon = 1e-6);
    }

    #[test]
    fn test_union_keeps_island_in_hole_separate() {
        let frame = PolygonWithHoles::with_holes(rect(0.0, 0.0, 10.0, 10.0), vec![rect(2.0, 2.0, 6.0, 6.0)]);
        let island = PolygonWithHoles::new(rect(4.0, 4.0, 2.0, 2.0));
        let merged = ContourKernel::default().union(vec![frame, island]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_rings_intersect() {
        assert!(rings_intersect(&rect(0.0, 0.0, 2.0, 2.0), &rect(1.0, 1.0, 2.0, 2.0)));
        assert!(!rings_intersect(&rect(0.0, 0.0, 2.0, 2.0), &rect(0.5, 0.5, 1.0, 1.0)));
        assert!(!rings_intersect(&rect(0.0, 0.0, 1.0, 1.0), &rect(3.0, 3.0, 1.0, 1.0)));
    }
}
