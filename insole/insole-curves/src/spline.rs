//! Catmull-Rom densification and the 1-D profile spline.

use nalgebra::Point2;

/// Samples emitted per control-point segment.
pub const DEFAULT_SUBDIVISIONS: usize = 8;

/// Uniform Catmull-Rom segment between `p1` and `p2` at `t` in `[0, 1)`.
#[must_use]
pub fn catmull_rom(
    p0: &Point2<f64>,
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    p3: &Point2<f64>,
    t: f64,
) -> Point2<f64> {
    let t2 = t * t;
    let t3 = t2 * t;
    let eval = |a: f64, b: f64, c: f64, d: f64| {
        0.5 * ((2.0 * b)
            + (-a + c) * t
            + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
            + (-a + 3.0 * b - 3.0 * c + d) * t3)
    };
    Point2::new(eval(p0.x, p1.x, p2.x, p3.x), eval(p0.y, p1.y, p2.y, p3.y))
}

/// Densify an open curve; end tangents are clamped by repeating the ends.
///
/// Returns `(n - 1) * subdivisions + 1` points that start and end on the
/// first and last control point.
#[must_use]
pub fn densify_open(points: &[Point2<f64>], subdivisions: usize) -> Vec<Point2<f64>> {
    let n = points.len();
    if n < 2 || subdivisions == 0 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity((n - 1) * subdivisions + 1);
    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        for j in 0..subdivisions {
            #[allow(clippy::cast_precision_loss)]
            let t = j as f64 / subdivisions as f64;
            out.push(catmull_rom(&p0, &p1, &p2, &p3, t));
        }
    }
    out.push(points[n - 1]);
    out
}

/// Densify a closed polygon with wrap-around neighbors.
///
/// Returns `n * subdivisions` points; the ring stays implicitly closed.
#[must_use]
pub fn densify_closed(points: &[Point2<f64>], subdivisions: usize) -> Vec<Point2<f64>> {
    let n = points.len();
    if n < 3 || subdivisions == 0 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(n * subdivisions);
    for i in 0..n {
        let p0 = points[(i + n - 1) % n];
        let p1 = points[i];
        let p2 = points[(i + 1) % n];
        let p3 = points[(i + 2) % n];
        for j in 0..subdivisions {
            #[allow(clippy::cast_precision_loss)]
            let t = j as f64 / subdivisions as f64;
            out.push(catmull_rom(&p0, &p1, &p2, &p3, t));
        }
    }
    out
}

/// A 1-D cubic through `(x, value)` knots with clamped (zero-slope) ends.
///
/// Interior tangents use the Catmull-Rom finite difference over the two
/// neighboring knots, so the curve passes through every knot exactly and is
/// C1 across them. Outside the knot range the value is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
}

impl ProfileSpline {
    /// Build from knots; knots are sorted by x and exact x ties are dropped.
    ///
    /// Returns `None` with fewer than two distinct knots.
    #[must_use]
    pub fn new(mut knots: Vec<(f64, f64)>) -> Option<Self> {
        knots.sort_by(|a, b| a.0.total_cmp(&b.0));
        knots.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-12);
        let n = knots.len();
        if n < 2 {
            return None;
        }
        let xs: Vec<f64> = knots.iter().map(|k| k.0).collect();
        let ys: Vec<f64> = knots.iter().map(|k| k.1).collect();
        let mut slopes = vec![0.0; n];
        for i in 1..n - 1 {
            slopes[i] = (ys[i + 1] - ys[i - 1]) / (xs[i + 1] - xs[i - 1]);
        }
        Some(Self { xs, ys, slopes })
    }

    /// First knot x.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.xs[0]
    }

    /// Last knot x.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    /// Evaluate at `x`; zero outside the knot range.
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x < self.start() || x > self.end() {
            return 0.0;
        }
        let i = self.xs.partition_point(|&k| k <= x).clamp(1, n - 1) - 1;
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let h = x1 - x0;
        let t = (x - x0) / h;
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        h00 * self.ys[i] + h10 * h * self.slopes[i] + h01 * self.ys[i + 1] + h11 * h * self.slopes[i + 1]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_densify_open_hits_endpoints() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 0.0),
        ];
        let dense = densify_open(&pts, 8);
        assert_eq!(dense.len(), 17);
        assert_eq!(dense[0], pts[0]);
        assert_eq!(dense[8], pts[1]);
        assert_eq!(dense[16], pts[2]);
    }

    #[test]
    fn test_densify_closed_count() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let dense = densify_closed(&pts, 8);
        assert_eq!(dense.len(), 32);
        assert_eq!(dense[8], pts[1]);
    }

    #[test]
    fn test_straight_line_stays_straight() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ];
        for p in densify_open(&pts, 8) {
            assert_relative_eq!(p.x, p.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_profile_spline_passes_through_knots() {
        let spline = ProfileSpline::new(vec![(10.0, 0.0), (20.0, 1.5), (35.0, 0.7), (50.0, 0.0)]).unwrap();
        assert_relative_eq!(spline.eval(20.0), 1.5, epsilon = 1e-12);
        assert_relative_eq!(spline.eval(35.0), 0.7, epsilon = 1e-12);
        assert_relative_eq!(spline.eval(10.0), 0.0);
        assert_relative_eq!(spline.eval(50.0), 0.0);
        assert_relative_eq!(spline.eval(5.0), 0.0);
        assert_relative_eq!(spline.eval(60.0), 0.0);
    }

    #[test]
    fn test_profile_spline_needs_two_knots() {
        assert!(ProfileSpline::new(vec![(1.0, 1.0)]).is_none());
        assert!(ProfileSpline::new(vec![(1.0, 1.0), (1.0, 2.0)]).is_none());
    }
}
