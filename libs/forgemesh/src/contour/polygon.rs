//! 2D polygon-with-holes and ring helpers.
//!
//! Rings are open point lists (the closing edge is implicit). A positive
//! signed area means counter-clockwise in a Y-up frame.

use config::constants::AREA_EPSILON;
use earcutr::earcut;
use glam::DVec2;

/// A closed loop of points with an implicit closing edge.
pub type Ring = Vec<DVec2>;

/// Outer boundary plus zero or more holes.
///
/// After [`PolygonWithHoles::normalized`] the outer ring is counter-clockwise
/// and every hole is clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonWithHoles {
    /// Outer boundary vertices.
    pub outer: Ring,
    /// Inner boundaries.
    pub holes: Vec<Ring>,
}

impl PolygonWithHoles {
    /// Creates a polygon from outer boundary vertices.
    pub fn new(outer: Ring) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Creates a polygon with holes.
    pub fn with_holes(outer: Ring, holes: Vec<Ring>) -> Self {
        Self { outer, holes }
    }

    /// Axis-aligned rectangle with one corner at `origin`.
    pub fn rectangle(origin: DVec2, size: DVec2) -> Self {
        Self::new(vec![
            origin,
            origin + DVec2::new(size.x, 0.0),
            origin + size,
            origin + DVec2::new(0.0, size.y),
        ])
    }

    /// Enclosed area: outer area minus hole areas.
    pub fn area(&self) -> f64 {
        signed_area(&self.outer).abs()
            - self
                .holes
                .iter()
                .map(|h| signed_area(h).abs())
                .sum::<f64>()
    }

    /// Copy with the outer ring counter-clockwise and holes clockwise.
    pub fn normalized(&self) -> Self {
        let mut outer = self.outer.clone();
        if signed_area(&outer) < 0.0 {
            outer.reverse();
        }
        let holes = self
            .holes
            .iter()
            .map(|h| {
                let mut h = h.clone();
                if signed_area(&h) > 0.0 {
                    h.reverse();
                }
                h
            })
            .collect();
        Self { outer, holes }
    }

    /// True when `point` is inside the outer ring and outside every hole.
    pub fn contains(&self, point: DVec2) -> bool {
        point_in_ring(point, &self.outer) && !self.holes.iter().any(|h| point_in_ring(point, h))
    }
}

/// Shoelace area, positive for counter-clockwise rings.
pub fn signed_area(ring: &[DVec2]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let n = ring.len();
    (0..n)
        .map(|i| ring[i].perp_dot(ring[(i + 1) % n]))
        .sum::<f64>()
        * 0.5
}

/// Length of the closed ring including its closing edge.
pub fn perimeter(ring: &[DVec2]) -> f64 {
    let n = ring.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| ring[i].distance(ring[(i + 1) % n])).sum()
}

/// Even-odd point-in-ring test.
pub fn point_in_ring(point: DVec2, ring: &[DVec2]) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Bounding box of a ring as (min, max).
pub fn ring_bounds(ring: &[DVec2]) -> (DVec2, DVec2) {
    let Some(first) = ring.first() else {
        return (DVec2::ZERO, DVec2::ZERO);
    };
    ring.iter()
        .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)))
}

/// Drops repeated consecutive points and points lying on a straight run.
pub fn clean_ring(ring: &[DVec2]) -> Ring {
    let mut out: Ring = Vec::with_capacity(ring.len());
    for &p in ring {
        if out.last().map_or(true, |last| last.distance_squared(p) > AREA_EPSILON) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].distance_squared(out[out.len() - 1]) <= AREA_EPSILON {
        out.pop();
    }

    // Remove collinear vertices until stable
    let mut changed = true;
    while changed && out.len() >= 3 {
        changed = false;
        let n = out.len();
        for i in 0..n {
            let prev = out[(i + n - 1) % n];
            let next = out[(i + 1) % n];
            if (out[i] - prev).perp_dot(next - out[i]).abs() <= AREA_EPSILON {
                out.remove(i);
                changed = true;
                break;
            }
        }
    }
    out
}

/// A point strictly inside a simple ring.
///
/// Uses the centroid of the largest ear from a triangulation, which is
/// inside even for concave rings.
pub fn interior_point(ring: &[DVec2]) -> Option<DVec2> {
    let flat: Vec<f64> = ring.iter().flat_map(|p| [p.x, p.y]).collect();
    let indices = earcut(&flat, &[], 2).ok()?;
    indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (ring[t[0]], ring[t[1]], ring[t[2]]);
            ((b - a).perp_dot(c - a).abs(), (a + b + c) / 3.0)
        })
        .max_by(|x, y| x.0.total_cmp(&y.0))
        .filter(|(area, _)| *area > AREA_EPSILON)
        .map(|(_, centroid)| centroid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Ring {
        PolygonWithHoles::rectangle(DVec2::ZERO, DVec2::splat(size)).outer
    }

    #[test]
    fn test_signed_area_orientation() {
        let mut ring = square(2.0);
        assert_relative_eq!(signed_area(&ring), 4.0);
        ring.reverse();
        assert_relative_eq!(signed_area(&ring), -4.0);
    }

    #[test]
    fn test_area_subtracts_holes() {
        let hole = PolygonWithHoles::rectangle(DVec2::splat(1.0), DVec2::splat(2.0)).outer;
        let polygon = PolygonWithHoles::with_holes(square(4.0), vec![hole]);
        assert_relative_eq!(polygon.area(), 12.0);
        assert!(polygon.contains(DVec2::new(0.5, 0.5)));
        assert!(!polygon.contains(DVec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_normalized_windings() {
        let hole = PolygonWithHoles::rectangle(DVec2::splat(1.0), DVec2::splat(1.0)).outer;
        let mut outer = square(4.0);
        outer.reverse();
        let polygon = PolygonWithHoles::with_holes(outer, vec![hole]).normalized();
        assert!(signed_area(&polygon.outer) > 0.0);
        assert!(signed_area(&polygon.holes[0]) < 0.0);
    }

    #[test]
    fn test_clean_ring_removes_collinear_and_duplicates() {
        let ring = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(0.0, 0.0),
        ];
        let cleaned = clean_ring(&ring);
        assert_eq!(cleaned.len(), 4);
        assert_relative_eq!(signed_area(&cleaned), 4.0);
    }

    #[test]
    fn test_interior_point_of_concave_ring() {
        // L-shape whose centroid of vertices falls outside
        let ring = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 10.0),
            DVec2::new(0.0, 10.0),
        ];
        let p = interior_point(&ring).unwrap();
        assert!(point_in_ring(p, &ring));
    }

    #[test]
    fn test_perimeter() {
        assert_relative_eq!(perimeter(&square(3.0)), 12.0);
    }
}
