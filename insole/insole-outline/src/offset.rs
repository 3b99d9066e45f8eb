//! Inward polygon offset (buffer) with miter joins.
//!
//! The offset follows the slice-and-filter scheme: build the raw mitred ring,
//! slice it wherever it crosses or overlaps itself, discard slices that sit
//! closer than the offset distance to the original, and stitch the remaining
//! slices into closed loops. The largest counter-clockwise loop wins.

use nalgebra::{Point2, Vector2};
use tracing::{debug, warn};

use crate::outline::Outline;
use crate::polygon;
use crate::{OutlineError, OutlineResult};

/// Mitre length (in multiples of the distance) beyond which a corner is bevelled.
const MITER_LIMIT: f64 = 4.0;

/// Relative slack when checking a loop's clearance from the original ring.
const CLEARANCE_SLACK: f64 = 0.02;

/// An inset outline and what the offset discarded.
#[derive(Debug, Clone)]
pub struct Inset {
    /// The largest surviving loop.
    pub outline: Outline,
    /// Other loops of positive area the offset split off and dropped.
    pub dropped_loops: usize,
}

impl Outline {
    /// Shrink the outline by `distance` mm.
    ///
    /// The result keeps the input's orientation.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::OffsetCollapsed`] when the distance is negative
    /// or non-finite, or when nothing of positive area survives (the distance
    /// reaches the local half-width everywhere).
    pub fn inset(&self, distance: f64) -> OutlineResult<Self> {
        self.inset_loops(distance).map(|inset| inset.outline)
    }

    /// Shrink the outline by `distance` mm, reporting dropped loops.
    ///
    /// Where the outline pinches narrower than twice the distance the offset
    /// splits into several loops. Only the largest is kept.
    ///
    /// # Errors
    ///
    /// As [`Outline::inset`].
    pub fn inset_loops(&self, distance: f64) -> OutlineResult<Inset> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(OutlineError::offset_collapsed(
                distance,
                "distance must be finite and non-negative",
            ));
        }
        if distance == 0.0 {
            return Ok(Inset {
                outline: self.clone(),
                dropped_loops: 0,
            });
        }

        let was_ccw = self.signed_area() >= 0.0;
        let ccw = self.to_ccw();
        let ring = ccw.points();

        let raw = raw_offset(ring, distance);
        let min_clearance = distance * (1.0 - CLEARANCE_SLACK);
        let loops = slice_filter_stitch(&raw, ring, min_clearance);
        debug!(
            "Inset {:.3} mm: raw ring {} points, {} loops",
            distance,
            raw.len(),
            loops.len()
        );

        let mut candidates: Vec<(Vec<Point2<f64>>, f64)> = loops
            .into_iter()
            .map(|l| {
                let area = polygon::signed_area(&l);
                (l, area)
            })
            .filter(|(_, area)| *area > 1e-6)
            .collect();
        let dropped_loops = candidates.len().saturating_sub(1);
        let best = candidates
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.1.total_cmp(&b.1.1))
            .map(|(i, _)| i);

        let Some(best) = best else {
            return Err(OutlineError::offset_collapsed(
                distance,
                "no loop survives at the requested distance",
            ));
        };
        let (mut pts, area) = candidates.swap_remove(best);
        if dropped_loops > 0 {
            warn!(
                distance,
                dropped = dropped_loops,
                kept_area = area,
                "Inset split into separate loops; keeping the largest"
            );
        }
        if !was_ccw {
            pts.reverse();
        }
        let outline =
            Outline::new(pts).map_err(|e| OutlineError::offset_collapsed(distance, e.to_string()))?;
        Ok(Inset {
            outline,
            dropped_loops,
        })
    }
}

/// Mitred inward offset of a counter-clockwise ring, possibly self-intersecting.
fn raw_offset(ring: &[Point2<f64>], d: f64) -> Vec<Point2<f64>> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n + n / 4);
    for i in 0..n {
        let prev = ring[(i + n - 1) % n];
        let cur = ring[i];
        let next = ring[(i + 1) % n];

        let n0 = left_normal(cur - prev);
        let n1 = left_normal(next - cur);
        let sum = n0 + n1;
        let sum_len = sum.norm();

        // Cusp: the two edges fold back onto each other.
        if sum_len < 1e-9 {
            out.push(cur + n0 * d);
            out.push(cur + n1 * d);
            continue;
        }
        let bisector = sum / sum_len;
        let cos_half = bisector.dot(&n0);
        if cos_half * MITER_LIMIT < 1.0 {
            out.push(cur + n0 * d);
            out.push(cur + n1 * d);
        } else {
            out.push(cur + bisector * (d / cos_half));
        }
    }
    out
}

fn left_normal(edge: Vector2<f64>) -> Vector2<f64> {
    let len = edge.norm();
    if len < 1e-12 {
        return Vector2::zeros();
    }
    Vector2::new(-edge.y, edge.x) / len
}

/// A straight piece of the raw ring between two cut points.
#[derive(Clone, Copy)]
struct Slice {
    start: Point2<f64>,
    end: Point2<f64>,
}

/// Slice the raw ring at every crossing or overlap, drop slices that come
/// closer than the clearance to the original ring, and stitch the rest back
/// into closed loops.
fn slice_filter_stitch(
    raw: &[Point2<f64>],
    original: &[Point2<f64>],
    min_clearance: f64,
) -> Vec<Vec<Point2<f64>>> {
    let slices = slice_raw(raw);
    let kept: Vec<Slice> = slices
        .into_iter()
        .filter(|s| {
            [0.25, 0.5, 0.75].iter().all(|&t| {
                let p = s.start + (s.end - s.start) * t;
                polygon::contains(original, &p)
                    && polygon::distance_to_edges(original, &p) >= min_clearance
            })
        })
        .collect();
    stitch(&kept)
}

fn slice_raw(raw: &[Point2<f64>]) -> Vec<Slice> {
    let n = raw.len();
    let mut cuts: Vec<Vec<f64>> = vec![vec![0.0, 1.0]; n];
    for i in 0..n {
        let (a, b) = (raw[i], raw[(i + 1) % n]);
        for j in (i + 1)..n {
            let (c, d) = (raw[j], raw[(j + 1) % n]);
            if let Some((t, u)) = polygon::segment_intersection(&a, &b, &c, &d) {
                cuts[i].push(t);
                cuts[j].push(u);
            } else {
                // Collinear overlap: cut each segment at the other's ends.
                for (p, q, seg, other) in [(a, b, i, [c, d]), (c, d, j, [a, b])] {
                    for o in other {
                        if let Some(t) = collinear_param(&p, &q, &o) {
                            cuts[seg].push(t);
                        }
                    }
                }
            }
        }
    }

    let mut slices = Vec::new();
    for (i, seg_cuts) in cuts.iter_mut().enumerate() {
        let (a, b) = (raw[i], raw[(i + 1) % n]);
        seg_cuts.sort_by(f64::total_cmp);
        seg_cuts.dedup_by(|x, y| (*x - *y).abs() < 1e-9);
        for w in seg_cuts.windows(2) {
            let (start, end) = (a + (b - a) * w[0], a + (b - a) * w[1]);
            if (end - start).norm() > 1e-9 {
                slices.push(Slice { start, end });
            }
        }
    }
    slices
}

/// Parameter of `o` along `p..q` when `o` lies on that segment's interior.
fn collinear_param(p: &Point2<f64>, q: &Point2<f64>, o: &Point2<f64>) -> Option<f64> {
    let d = q - p;
    let len_sq = d.norm_squared();
    if len_sq < 1e-18 {
        return None;
    }
    let t = (o - p).dot(&d) / len_sq;
    let off_line = (o - (p + d * t)).norm();
    (off_line < 1e-9 && t > 0.0 && t < 1.0).then_some(t)
}

fn stitch(slices: &[Slice]) -> Vec<Vec<Point2<f64>>> {
    const JOIN_EPS: f64 = 1e-7;
    let m = slices.len();
    let mut used = vec![false; m];
    let mut loops = Vec::new();

    for first in 0..m {
        if used[first] {
            continue;
        }
        used[first] = true;
        let origin = slices[first].start;
        let mut chain = vec![origin];
        let mut current = first;
        let mut closed = false;

        loop {
            let end = slices[current].end;
            if (end - origin).norm() < JOIN_EPS {
                closed = true;
                break;
            }
            chain.push(end);
            // Prefer the ring successor, then any slice starting here.
            let successor = (current + 1) % m;
            let next = if !used[successor] && (slices[successor].start - end).norm() < JOIN_EPS {
                Some(successor)
            } else {
                (0..m).find(|&k| !used[k] && (slices[k].start - end).norm() < JOIN_EPS)
            };
            match next {
                Some(k) => {
                    used[k] = true;
                    current = k;
                }
                None => break,
            }
        }

        if closed && chain.len() >= 3 {
            loops.push(chain);
        }
    }
    loops
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(w: f64, h: f64) -> Outline {
        Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ])
        .unwrap()
    }

    #[test]
    fn test_inset_rectangle() {
        let inner = rect(50.0, 30.0).inset(0.8).unwrap();
        assert_eq!(inner.len(), 4);
        assert_relative_eq!(inner.min().x, 0.8, epsilon = 1e-9);
        assert_relative_eq!(inner.max().y, 29.2, epsilon = 1e-9);
        assert_relative_eq!(inner.signed_area(), 48.4 * 28.4, epsilon = 1e-6);
    }

    #[test]
    fn test_inset_keeps_clockwise_orientation() {
        let mut pts = rect(20.0, 10.0).points().to_vec();
        pts.reverse();
        let cw = Outline::new(pts).unwrap();
        let inner = cw.inset(1.0).unwrap();
        assert!(inner.signed_area() < 0.0);
    }

    #[test]
    fn test_pinched_inset_reports_dropped_loop() {
        // Two lobes joined by a 2 mm neck; a 1.5 mm inset cuts the neck.
        let dumbbell = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(20.0, 9.0),
            Point2::new(30.0, 9.0),
            Point2::new(30.0, 0.0),
            Point2::new(54.0, 0.0),
            Point2::new(54.0, 20.0),
            Point2::new(30.0, 20.0),
            Point2::new(30.0, 11.0),
            Point2::new(20.0, 11.0),
            Point2::new(20.0, 20.0),
            Point2::new(0.0, 20.0),
        ])
        .unwrap();
        let inset = dumbbell.inset_loops(1.5).unwrap();
        assert_eq!(inset.dropped_loops, 1);
        // The larger right lobe survives.
        assert!(inset.outline.min().x > 30.0);
        assert!(inset.outline.signed_area() > 300.0);

        assert_eq!(rect(50.0, 30.0).inset_loops(0.8).unwrap().dropped_loops, 0);
    }

    #[test]
    fn test_inset_too_far_collapses() {
        let err = rect(10.0, 4.0).inset(2.5);
        assert!(matches!(err, Err(OutlineError::OffsetCollapsed { .. })));
    }

    #[test]
    fn test_inset_negative_rejected() {
        assert!(rect(10.0, 10.0).inset(-1.0).is_err());
    }

    #[test]
    fn test_inset_dumbbell_keeps_largest_lobe() {
        // Two squares joined by a 1 mm neck; a 0.8 mm inset pinches the neck.
        let o = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 4.5),
            Point2::new(14.0, 4.5),
            Point2::new(14.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(20.0, 10.0),
            Point2::new(14.0, 10.0),
            Point2::new(14.0, 5.5),
            Point2::new(10.0, 5.5),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ])
        .unwrap();
        let inner = o.inset(0.8).unwrap();
        // The left lobe (10 x 10) is larger than the right one (6 x 10).
        assert!(inner.max().x < 10.0);
        assert_relative_eq!(inner.min().x, 0.8, epsilon = 1e-9);
    }
}
