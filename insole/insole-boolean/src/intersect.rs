//! Ray-triangle and triangle-triangle intersection tests.

// Barycentric determinant terms look like mismatched groupings.
#![allow(clippy::suspicious_operation_groupings)]

use insole_types::{Point3, Vector3};
use smallvec::SmallVec;

/// Ray-triangle intersection using the Möller-Trumbore algorithm.
///
/// Returns the ray parameter `t > epsilon` of the hit, or `None`.
/// The intersection point is `origin + t * direction`.
#[must_use]
pub fn ray_triangle_intersect(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    tri: &[Point3<f64>; 3],
    epsilon: f64,
) -> Option<f64> {
    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];
    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Ray is parallel to triangle
    if a.abs() < f64::EPSILON * edge1.norm() * edge2.norm() * direction.norm() {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - tri[0];
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t > epsilon).then_some(t)
}

/// Where a point lies on a triangle.
///
/// `Edge(k)` runs from corner `k` to corner `(k + 1) % 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Feature {
    Vertex(usize),
    Edge(usize),
    Interior,
}

/// Snap a point lying on a triangle to a corner or edge within tolerance.
pub(crate) fn locate(
    point: &Point3<f64>,
    tri: &[Point3<f64>; 3],
    vertex_tolerance: f64,
    edge_tolerance: f64,
) -> Feature {
    if let Some(k) = (0..3).find(|&k| (point - tri[k]).norm() <= vertex_tolerance) {
        return Feature::Vertex(k);
    }
    (0..3)
        .find(|&k| segment_distance(point, &tri[k], &tri[(k + 1) % 3]) <= edge_tolerance)
        .map_or(Feature::Interior, Feature::Edge)
}

fn segment_distance(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Parameter of `p` along the edge `a -> b`.
pub(crate) fn edge_parameter(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        0.0
    } else {
        (p - a).dot(&ab) / len_sq
    }
}

/// How two triangles touch.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Contact {
    /// No crossing (or a single touching point).
    None,
    /// Both triangles lie in one plane.
    Coplanar,
    /// The triangles cross along this segment.
    Segment(Point3<f64>, Point3<f64>),
}

enum Section {
    Separate,
    Coplanar,
    Points(SmallVec<[Point3<f64>; 3]>),
}

/// Cut a triangle with the plane `normal · x = offset`.
fn plane_section(tri: &[Point3<f64>; 3], normal: &Vector3<f64>, offset: f64, tol: f64) -> Section {
    let d = tri.map(|p| {
        let s = normal.dot(&p.coords) - offset;
        if s.abs() <= tol { 0.0 } else { s }
    });
    if d.iter().all(|&s| s > 0.0) || d.iter().all(|&s| s < 0.0) {
        return Section::Separate;
    }
    if d.iter().all(|&s| s == 0.0) {
        return Section::Coplanar;
    }

    let mut points = SmallVec::new();
    for k in 0..3 {
        let j = (k + 1) % 3;
        if d[k] == 0.0 {
            points.push(tri[k]);
        } else if d[k] * d[j] < 0.0 {
            let t = d[k] / (d[k] - d[j]);
            points.push(tri[k] + (tri[j] - tri[k]) * t);
        }
    }
    Section::Points(points)
}

/// Intersection segment of two triangles.
///
/// Each triangle is cut by the other's plane; the overlap of the two cuts
/// along the planes' common line is the contact segment.
pub(crate) fn triangle_contact(
    a: &[Point3<f64>; 3],
    b: &[Point3<f64>; 3],
    plane_tolerance: f64,
    edge_tolerance: f64,
) -> Contact {
    let (Some(na), Some(nb)) = (unit_normal(a), unit_normal(b)) else {
        return Contact::None;
    };

    let cut_a = match plane_section(a, &nb, nb.dot(&b[0].coords), plane_tolerance) {
        Section::Separate => return Contact::None,
        Section::Coplanar => return Contact::Coplanar,
        Section::Points(p) => p,
    };
    let cut_b = match plane_section(b, &na, na.dot(&a[0].coords), plane_tolerance) {
        Section::Separate => return Contact::None,
        Section::Coplanar => return Contact::Coplanar,
        Section::Points(p) => p,
    };
    if cut_a.len() < 2 || cut_b.len() < 2 {
        return Contact::None;
    }

    let Some(line) = (na.cross(&nb)).try_normalize(f64::EPSILON) else {
        return Contact::Coplanar;
    };
    let span = |pts: &[Point3<f64>]| {
        let (p, q) = (pts[0], pts[1]);
        let (tp, tq) = (line.dot(&p.coords), line.dot(&q.coords));
        if tp <= tq { (tp, p, tq, q) } else { (tq, q, tp, p) }
    };
    let (a_lo, a_lo_p, a_hi, a_hi_p) = span(&cut_a);
    let (b_lo, b_lo_p, b_hi, b_hi_p) = span(&cut_b);

    let (lo, lo_p) = if a_lo >= b_lo { (a_lo, a_lo_p) } else { (b_lo, b_lo_p) };
    let (hi, hi_p) = if a_hi <= b_hi { (a_hi, a_hi_p) } else { (b_hi, b_hi_p) };
    if hi - lo <= edge_tolerance {
        return Contact::None;
    }
    Contact::Segment(lo_p, hi_p)
}

pub(crate) fn unit_normal(tri: &[Point3<f64>; 3]) -> Option<Vector3<f64>> {
    (tri[1] - tri[0]).cross(&(tri[2] - tri[0])).try_normalize(f64::EPSILON)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    #[test]
    fn test_ray_triangle_hit_and_miss() {
        let tri = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let up = Vector3::new(0.0, 0.0, 1.0);

        let t = ray_triangle_intersect(&p(0.2, 0.2, -1.0), &up, &tri, 1e-9).unwrap();
        assert_relative_eq!(t, 1.0);

        assert!(ray_triangle_intersect(&p(0.8, 0.8, -1.0), &up, &tri, 1e-9).is_none());
        assert!(ray_triangle_intersect(&p(0.2, 0.2, 1.0), &up, &tri, 1e-9).is_none());
        let flat = Vector3::new(1.0, 0.0, 0.0);
        assert!(ray_triangle_intersect(&p(-1.0, 0.2, 0.0), &flat, &tri, 1e-9).is_none());
    }

    #[test]
    fn test_triangles_crossing() {
        let a = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0)];
        let b = [p(0.5, 0.5, -1.0), p(0.5, 0.5, 1.0), p(0.5, -1.0, 0.0)];
        let Contact::Segment(s, e) = triangle_contact(&a, &b, 1e-9, 1e-9) else {
            panic!("expected a segment");
        };
        assert_relative_eq!(s.z, 0.0);
        assert_relative_eq!(e.z, 0.0);
        assert_relative_eq!(s.x, 0.5);
        let (lo, hi) = if s.y < e.y { (s.y, e.y) } else { (e.y, s.y) };
        assert_relative_eq!(lo, 0.0, epsilon = 1e-12);
        assert_relative_eq!(hi, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_triangles_separate_and_coplanar() {
        let a = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let lifted = a.map(|q| q + Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(triangle_contact(&a, &lifted, 1e-9, 1e-9), Contact::None);

        let shifted = a.map(|q| q + Vector3::new(0.2, 0.2, 0.0));
        assert_eq!(triangle_contact(&a, &shifted, 1e-9, 1e-9), Contact::Coplanar);

        // b crosses a's plane but misses the triangle itself.
        let far = [p(5.0, 5.0, -1.0), p(5.0, 5.0, 1.0), p(6.0, 5.0, 0.0)];
        assert_eq!(triangle_contact(&a, &far, 1e-9, 1e-9), Contact::None);
    }

    #[test]
    fn test_locate_features() {
        let tri = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        assert_eq!(locate(&p(1e-9, 0.0, 0.0), &tri, 1e-6, 1e-8), Feature::Vertex(0));
        assert_eq!(locate(&p(0.5, 1e-10, 0.0), &tri, 1e-6, 1e-8), Feature::Edge(0));
        assert_eq!(locate(&p(0.5, 0.5, 0.0), &tri, 1e-6, 1e-8), Feature::Edge(1));
        assert_eq!(locate(&p(0.0, 0.3, 0.0), &tri, 1e-6, 1e-8), Feature::Edge(2));
        assert_eq!(locate(&p(0.2, 0.2, 0.0), &tri, 1e-6, 1e-8), Feature::Interior);
        assert_relative_eq!(edge_parameter(&p(0.25, 0.0, 0.0), &tri[0], &tri[1]), 0.25);
    }
}
