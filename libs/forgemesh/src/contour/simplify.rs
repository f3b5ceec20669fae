//! Douglas–Peucker simplification for closed rings.

use glam::DVec2;

use super::polygon::{perimeter, Ring};

/// Simplifies a closed ring with a tolerance expressed as a percentage of
/// its perimeter.
///
/// # Example
///
/// ```rust
/// use forgemesh::contour::simplify::simplify_ring;
/// use glam::DVec2;
///
/// // A square with a tiny bump on one side
/// let ring = vec![
///     DVec2::new(0.0, 0.0),
///     DVec2::new(50.0, 0.0),
///     DVec2::new(51.0, 0.2),
///     DVec2::new(52.0, 0.0),
///     DVec2::new(100.0, 0.0),
///     DVec2::new(100.0, 100.0),
///     DVec2::new(0.0, 100.0),
/// ];
/// assert_eq!(simplify_ring(&ring, 0.5).len(), 4);
/// ```
pub fn simplify_ring(ring: &[DVec2], tolerance_percent: f64) -> Ring {
    let epsilon = tolerance_percent * perimeter(ring) / 100.0;
    douglas_peucker_closed(ring, epsilon)
}

/// Closed-ring Douglas–Peucker.
///
/// The ring is split at the vertex farthest from its first vertex and each
/// half is simplified as an open chain, so both anchors always survive.
pub fn douglas_peucker_closed(ring: &[DVec2], epsilon: f64) -> Ring {
    let n = ring.len();
    if n < 3 || !(epsilon > 0.0) {
        return ring.to_vec();
    }

    let anchor = ring[0];
    let split = (1..n)
        .max_by(|&a, &b| {
            ring[a]
                .distance_squared(anchor)
                .total_cmp(&ring[b].distance_squared(anchor))
        })
        .unwrap_or(n / 2);

    let mut first = ring[..=split].to_vec();
    let mut second = ring[split..].to_vec();
    second.push(anchor);

    first = douglas_peucker(&first, epsilon);
    second = douglas_peucker(&second, epsilon);

    // Drop the shared split point and the repeated anchor
    first.pop();
    second.pop();
    first.extend(second);
    first
}

/// Open-chain Douglas–Peucker keeping both end points.
pub fn douglas_peucker(points: &[DVec2], epsilon: f64) -> Vec<DVec2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (index, distance) = (start + 1..end)
            .map(|i| (i, segment_distance(points[i], points[start], points[end])))
            .fold((start, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if distance > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
