//! Planar polygon primitives on implicit-closed point rings.
//!
//! Every function takes a slice `[p0, p1, .., pn-1]` and treats the edge
//! `pn-1 -> p0` as part of the ring. Inside tests use the even-odd rule with a
//! half-open crossing condition, so a point on a horizontal edge's row is
//! classified identically by [`contains`] and [`inside_grid`].

use nalgebra::Point2;
use rayon::prelude::*;

/// Row count below which [`inside_grid`] stays on the calling thread.
const PARALLEL_ROW_THRESHOLD: usize = 64;

/// Signed area (positive for counter-clockwise rings).
#[must_use]
pub fn signed_area(ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        twice += a.x.mul_add(b.y, -(b.x * a.y));
    }
    twice * 0.5
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn contains(ring: &[Point2<f64>], p: &Point2<f64>) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Sorted x positions where the horizontal line `y` crosses the ring.
///
/// Uses the same half-open rule as [`contains`], so a point `(x, y)` is
/// inside exactly when an odd number of crossings lie strictly right of `x`.
#[must_use]
pub fn row_crossings(ring: &[Point2<f64>], y: f64) -> Vec<f64> {
    let n = ring.len();
    let mut xs = Vec::new();
    if n < 3 {
        return xs;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > y) != (pj.y > y) {
            xs.push((pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x);
        }
        j = i;
    }
    xs.sort_by(f64::total_cmp);
    xs
}

/// Inside mask for a regular grid, row-major over `ys` then `xs`.
///
/// Each row computes its edge crossings once and classifies every column by
/// binary search, so the cost is `O(rows * edges + cells * log edges)`
/// instead of `O(cells * edges)`.
#[must_use]
pub fn inside_grid(ring: &[Point2<f64>], xs: &[f64], ys: &[f64]) -> Vec<bool> {
    let classify_row = |&y: &f64| -> Vec<bool> {
        let crossings = row_crossings(ring, y);
        xs.iter()
            .map(|&x| {
                let right = crossings.len() - crossings.partition_point(|&c| c <= x);
                right % 2 == 1
            })
            .collect()
    };

    let rows: Vec<Vec<bool>> = if ys.len() >= PARALLEL_ROW_THRESHOLD {
        ys.par_iter().map(classify_row).collect()
    } else {
        ys.iter().map(classify_row).collect()
    };
    rows.into_iter().flatten().collect()
}

/// Inside test for an arbitrary batch of points, evaluated in parallel.
#[must_use]
pub fn contains_many(ring: &[Point2<f64>], points: &[Point2<f64>]) -> Vec<bool> {
    points.par_iter().map(|p| contains(ring, p)).collect()
}

/// Shortest distance from `p` to any edge of the ring (segment projection).
#[must_use]
pub fn distance_to_edges(ring: &[Point2<f64>], p: &Point2<f64>) -> f64 {
    let n = ring.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        let d = distance_to_segment(p, &ring[i], &ring[(i + 1) % n]);
        best = best.min(d);
    }
    best
}

/// Distance from `p` to the nearest ring vertex.
#[must_use]
pub fn distance_to_vertices(ring: &[Point2<f64>], p: &Point2<f64>) -> f64 {
    ring.iter()
        .map(|q| (q - p).norm_squared())
        .fold(f64::INFINITY, f64::min)
        .sqrt()
}

/// Distance from `p` to the segment `a..b`.
#[must_use]
pub fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < 1e-12 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm()
}

/// Proper intersection of segments `a..b` and `c..d`.
///
/// Returns the parameters `(t, u)` along each segment, both in `[0, 1]`.
/// Parallel or collinear segments return `None`.
#[must_use]
pub fn segment_intersection(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    d: &Point2<f64>,
) -> Option<(f64, f64)> {
    let r = b - a;
    let s = d - c;
    let denom = r.perp(&s);
    if denom.abs() < 1e-12 {
        return None;
    }
    let ac = c - a;
    let t = ac.perp(&s) / denom;
    let u = ac.perp(&r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

/// Y values where the vertical line `x` crosses the ring's edges.
///
/// An edge `(x1, y1) -> (x2, y2)` is crossed when `x1 <= x < x2` or
/// `x2 <= x < x1`; near-vertical edges (`|dx| <= 0.001`) are skipped.
#[must_use]
pub fn column_crossings(ring: &[Point2<f64>], x: f64) -> Vec<f64> {
    let n = ring.len();
    let mut ys = Vec::new();
    for i in 0..n {
        let (p1, p2) = (ring[i], ring[(i + 1) % n]);
        let crosses = (p1.x <= x && x < p2.x) || (p2.x <= x && x < p1.x);
        let dx = p2.x - p1.x;
        if crosses && dx.abs() > 0.001 {
            let t = (x - p1.x) / dx;
            ys.push(t.mul_add(p2.y - p1.y, p1.y));
        }
    }
    ys
}
