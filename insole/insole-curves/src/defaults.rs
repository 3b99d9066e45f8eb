//! Default control points generated from arch spans and width rays.

use nalgebra::{Point2, Vector2};

use crate::frame::{ArchSide, ArchSpan, CurveFrame};

/// Fraction of the way from the edge to the ray for the shoulder points.
const SHOULDER_FRACTION: f64 = 0.6;

/// Amplitude kept when shrinking a solid curve toward its chord.
const FLAT_AMPLITUDE: f64 = 0.6;

/// Flat-curve endpoints move this fraction of the span inward.
const FLAT_END_SHIFT: f64 = 0.05;

/// Transverse corners sit this far from the tip midpoint toward the box corner.
const CORNER_FRACTION: f64 = 0.4;

/// Bridge control points bulge by this fraction of the bridge chord.
const BRIDGE_BULGE: f64 = 0.25;

/// Solid curve for a longitudinal arch.
///
/// Five points: endpoints on the outline edge at the span's start and end,
/// the peak on the reference ray, and two shoulders between them.
pub(crate) fn longitudinal_solid(frame: &CurveFrame, span: &ArchSpan, side: ArchSide) -> Vec<Point2<f64>> {
    let peak = span.clamped_peak();
    let edge_point = |pct: f64| {
        let x = frame.x_at(pct);
        Point2::new(x, frame.edge(side, x))
    };
    let shoulder = |pct: f64| {
        let x = frame.x_at(pct);
        let edge = frame.edge(side, x);
        let ray = frame.ray(side, x);
        Point2::new(x, edge + (ray - edge) * SHOULDER_FRACTION)
    };
    let xp = frame.x_at(peak);
    vec![
        edge_point(span.start),
        shoulder(0.5 * (span.start + peak)),
        Point2::new(xp, frame.ray(side, xp)),
        shoulder(0.5 * (peak + span.end)),
        edge_point(span.end),
    ]
}

/// Flat curve derived from a solid curve.
///
/// The endpoints move inward along x and snap to the edge. Interior points
/// come from `interior` when given, otherwise from the solid's interior
/// shrunk toward its chord.
pub(crate) fn flat_from_solid(
    frame: &CurveFrame,
    solid: &[Point2<f64>],
    side: ArchSide,
    interior: Option<&[Point2<f64>]>,
) -> Vec<Point2<f64>> {
    let (Some(&a), Some(&b)) = (solid.first(), solid.last()) else {
        return Vec::new();
    };
    let span_x = b.x - a.x;
    let snap = |x: f64| Point2::new(x, frame.edge(side, x));
    let start = snap(a.x + span_x * FLAT_END_SHIFT);
    let end = snap(b.x - span_x * FLAT_END_SHIFT);

    let mut out = vec![start];
    match interior {
        Some(pts) if pts.len() > 2 => out.extend_from_slice(&pts[1..pts.len() - 1]),
        Some(_) => {}
        None => {
            for p in solid.iter().skip(1).take(solid.len().saturating_sub(2)) {
                let t = if span_x.abs() > 1e-9 { (p.x - a.x) / span_x } else { 0.0 };
                let chord = a.y + (b.y - a.y) * t;
                out.push(Point2::new(p.x, chord + (p.y - chord) * FLAT_AMPLITUDE));
            }
        }
    }
    out.push(end);
    out
}

/// Eight-point rounded diamond for the transverse arch.
///
/// The four tips snap to the span's start and end on the mid-width line and
/// to the two rays at the peak. Order: heel tip, heel-medial corner, medial
/// tip, toe-medial corner, toe tip, toe-lateral corner, lateral tip,
/// heel-lateral corner.
pub(crate) fn transverse_polygon(frame: &CurveFrame, span: &ArchSpan) -> Vec<Point2<f64>> {
    let rays = frame.rays();
    let mid = 0.5 * (rays.ray5 + rays.ray1);
    let (xs, xp, xe) = (frame.x_at(span.start), frame.x_at(span.clamped_peak()), frame.x_at(span.end));
    let at = |x: f64, pct: f64| Point2::new(x, frame.y_at_width(x, pct));

    let heel = at(xs, mid);
    let medial = at(xp, rays.ray1);
    let toe = at(xe, mid);
    let lateral = at(xp, rays.ray5);

    let corner = |a: Point2<f64>, b: Point2<f64>, boxed: Point2<f64>| {
        let m = Point2::from((a.coords + b.coords) * 0.5);
        m + (boxed - m) * CORNER_FRACTION
    };
    vec![
        heel,
        corner(heel, medial, at(xs, rays.ray1)),
        medial,
        corner(medial, toe, at(xe, rays.ray1)),
        toe,
        corner(toe, lateral, at(xe, rays.ray5)),
        lateral,
        corner(lateral, heel, at(xs, rays.ray5)),
    ]
}

/// Interior control point of a bridge from `a` to `b`.
///
/// `a_out` and `b_out` are the outgoing tangents of the curves the bridge
/// continues at each end; the point bulges along their sum.
pub(crate) fn bridge_control(
    a: Point2<f64>,
    a_out: Vector2<f64>,
    b: Point2<f64>,
    b_out: Vector2<f64>,
) -> Point2<f64> {
    let mid = Point2::from((a.coords + b.coords) * 0.5);
    let dir = unit(a_out) + unit(b_out);
    let len = dir.norm();
    if len < 1e-9 {
        return mid;
    }
    mid + dir / len * (BRIDGE_BULGE * (b - a).norm())
}

fn unit(v: Vector2<f64>) -> Vector2<f64> {
    let n = v.norm();
    if n < 1e-12 { Vector2::zeros() } else { v / n }
}

/// Tangent leaving the start of an open curve, pointing away from it.
pub(crate) fn start_out(curve: &[Point2<f64>]) -> Vector2<f64> {
    match curve {
        [a, b, ..] => *a - *b,
        _ => Vector2::zeros(),
    }
}

/// Tangent leaving the end of an open curve, pointing away from it.
pub(crate) fn end_out(curve: &[Point2<f64>]) -> Vector2<f64> {
    match curve {
        [.., a, b] => *b - *a,
        _ => Vector2::zeros(),
    }
}

/// Walk of transverse vertices from the most lateral vertex to the toe tip.
///
/// The walk leaves the lateral vertex toward whichever ring neighbour lies
/// further toe-ward.
pub(crate) fn lateral_to_toe_walk(ring: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let n = ring.len();
    if n == 0 {
        return Vec::new();
    }
    let argmax = |key: fn(&Point2<f64>) -> f64| {
        (0..n)
            .max_by(|&i, &j| key(&ring[i]).total_cmp(&key(&ring[j])))
            .unwrap_or(0)
    };
    let lateral = argmax(|p| p.y);
    let toe = argmax(|p| p.x);

    let next = (lateral + 1) % n;
    let prev = (lateral + n - 1) % n;
    let forward = ring[next].x >= ring[prev].x;

    let mut walk = vec![ring[lateral]];
    let mut i = lateral;
    for _ in 0..n {
        if i == toe {
            break;
        }
        i = if forward { (i + 1) % n } else { (i + n - 1) % n };
        walk.push(ring[i]);
    }
    walk
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_outline::{Landmarks, Outline};

    fn frame() -> CurveFrame {
        let outline = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(200.0, 0.0),
            Point2::new(200.0, 80.0),
            Point2::new(0.0, 80.0),
        ])
        .unwrap();
        CurveFrame::new(&outline, Landmarks::default().width_rays())
    }

    #[test]
    fn test_medial_solid_shape() {
        let f = frame();
        let solid = longitudinal_solid(&f, &ArchSpan::new(15.0, 43.0, 70.0), ArchSide::Medial);
        assert_eq!(solid.len(), 5);
        assert_relative_eq!(solid[0].x, 30.0);
        assert_relative_eq!(solid[0].y, 0.0);
        assert_relative_eq!(solid[2].x, 86.0);
        assert_relative_eq!(solid[2].y, 28.0);
        assert_relative_eq!(solid[1].y, 0.6 * 28.0);
        assert_relative_eq!(solid[4].x, 140.0);
    }

    #[test]
    fn test_flat_lies_between_solid_and_edge() {
        let f = frame();
        let solid = longitudinal_solid(&f, &ArchSpan::new(20.0, 32.5, 45.0), ArchSide::Lateral);
        let flat = flat_from_solid(&f, &solid, ArchSide::Lateral, None);
        assert_eq!(flat.len(), solid.len());
        assert_relative_eq!(flat[0].x, 40.0 + 0.05 * 50.0);
        assert_relative_eq!(flat[0].y, 80.0);
        for (s, fl) in solid[1..4].iter().zip(&flat[1..4]) {
            // Lateral edge is high y: the solid is further inward than the flat.
            assert!(s.y < fl.y);
            assert!(fl.y <= 80.0);
        }
    }

    #[test]
    fn test_flat_keeps_supplied_interior() {
        let f = frame();
        let solid = longitudinal_solid(&f, &ArchSpan::new(15.0, 43.0, 70.0), ArchSide::Medial);
        let supplied = [Point2::new(0.0, 99.0), Point2::new(80.0, 10.0), Point2::new(0.0, 99.0)];
        let flat = flat_from_solid(&f, &solid, ArchSide::Medial, Some(&supplied));
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[1], Point2::new(80.0, 10.0));
        assert_relative_eq!(flat[0].y, 0.0);
    }

    #[test]
    fn test_transverse_polygon_tips() {
        let f = frame();
        let poly = transverse_polygon(&f, &ArchSpan::new(43.0, 59.0, 75.0));
        assert_eq!(poly.len(), 8);
        assert_relative_eq!(poly[0].x, 86.0);
        assert_relative_eq!(poly[4].x, 150.0);
        assert_relative_eq!(poly[2].y, 28.0);
        assert_relative_eq!(poly[6].y, 60.0);
        let walk = lateral_to_toe_walk(&poly);
        assert_eq!(walk.len(), 3);
        assert_eq!(walk[0], poly[6]);
        assert_eq!(walk[2], poly[4]);
    }

    #[test]
    fn test_bridge_control_bulges_along_tangents() {
        let c = bridge_control(
            Point2::new(0.0, 0.0),
            Vector2::new(-1.0, 0.0),
            Point2::new(0.0, 10.0),
            Vector2::new(-1.0, 0.0),
        );
        assert_relative_eq!(c.x, -2.5);
        assert_relative_eq!(c.y, 5.0);

        let straight = bridge_control(
            Point2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Point2::new(0.0, 10.0),
            Vector2::new(-1.0, 0.0),
        );
        assert_relative_eq!(straight.x, 0.0);
    }
}
