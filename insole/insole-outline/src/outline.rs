//! The validated foot outline.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::polygon;
use crate::{OutlineError, OutlineResult};

/// Enclosed area below which an outline is rejected as degenerate (mm^2).
const MIN_AREA: f64 = 1e-6;

/// Number of x samples used for the outline's y-bounds.
const Y_BOUND_SAMPLES: usize = 200;

/// Which foot the insole is for.
///
/// Generation always runs in left-foot orientation; a right-foot result is
/// mirrored across the outline's mid-width line afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootSide {
    /// Left foot (native orientation).
    #[default]
    Left,
    /// Right foot (mirrored).
    Right,
}

impl FootSide {
    /// Whether the finished mesh must be mirrored.
    #[must_use]
    pub const fn is_mirrored(self) -> bool {
        matches!(self, Self::Right)
    }
}

/// A closed 2D boundary polygon in millimeters.
///
/// The closing edge is implicit. X runs heel to toe; the medial edge is the
/// low-y side of the outline.
///
/// # Example
///
/// ```
/// use insole_outline::{Outline, Point2};
///
/// let outline = Outline::new(vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(50.0, 0.0),
///     Point2::new(50.0, 30.0),
///     Point2::new(0.0, 30.0),
///     Point2::new(0.0, 0.0), // duplicated closing point is dropped
/// ])
/// .unwrap();
///
/// assert_eq!(outline.len(), 4);
/// assert!(outline.contains(&Point2::new(25.0, 15.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    points: Vec<Point2<f64>>,
    min: Point2<f64>,
    max: Point2<f64>,
}

impl Outline {
    /// Validate and wrap a point ring.
    ///
    /// # Errors
    ///
    /// - [`OutlineError::NonFinite`] for NaN or infinite coordinates
    /// - [`OutlineError::TooFewPoints`] for fewer than 3 points
    /// - [`OutlineError::Degenerate`] for a zero-area ring
    pub fn new(mut points: Vec<Point2<f64>>) -> OutlineResult<Self> {
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(OutlineError::NonFinite { index });
        }

        if points.len() >= 2 {
            let (first, last) = (points[0], points[points.len() - 1]);
            if (first - last).norm() < 1e-9 {
                points.pop();
            }
        }
        points.dedup_by(|a, b| (*a - *b).norm() < 1e-9);

        if points.len() < 3 {
            return Err(OutlineError::TooFewPoints {
                count: points.len(),
            });
        }

        let area = polygon::signed_area(&points).abs();
        if area < MIN_AREA {
            return Err(OutlineError::Degenerate { area });
        }

        Ok(Self::from_valid(points))
    }

    fn from_valid(points: Vec<Point2<f64>>) -> Self {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { points, min, max }
    }

    /// Shift so the bounding-box minimum sits at the origin.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let shift = -self.min.coords;
        self.translated(shift)
    }

    /// Translate every point.
    #[must_use]
    pub fn translated(&self, shift: Vector2<f64>) -> Self {
        Self::from_valid(self.points.iter().map(|p| p + shift).collect())
    }

    /// Mirror along the length axis (`x -> x_max - x`), reversing order to
    /// keep the orientation.
    #[must_use]
    pub fn flipped_x(&self) -> Self {
        let x_max = self.max.x;
        let mut pts: Vec<_> = self
            .points
            .iter()
            .map(|p| Point2::new(x_max - p.x, p.y))
            .collect();
        pts.reverse();
        Self::from_valid(pts)
    }

    /// The ring points.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Number of ring points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated outline.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Minimum corner of the bounding box.
    #[inline]
    #[must_use]
    pub const fn min(&self) -> Point2<f64> {
        self.min
    }

    /// Maximum corner of the bounding box.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> Point2<f64> {
        self.max
    }

    /// Heel-to-toe extent.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Overall width.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Signed area; positive when counter-clockwise.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        polygon::signed_area(&self.points)
    }

    /// Same ring, counter-clockwise.
    #[must_use]
    pub fn to_ccw(&self) -> Self {
        if self.signed_area() >= 0.0 {
            self.clone()
        } else {
            let mut pts = self.points.clone();
            pts.reverse();
            Self::from_valid(pts)
        }
    }

    /// Even-odd inside test.
    #[must_use]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        polygon::contains(&self.points, p)
    }

    /// Batched inside test over a regular grid, row-major (`ys` outer).
    #[must_use]
    pub fn inside_grid(&self, xs: &[f64], ys: &[f64]) -> Vec<bool> {
        polygon::inside_grid(&self.points, xs, ys)
    }

    /// Distance to the nearest outline vertex.
    #[must_use]
    pub fn distance_to_vertices(&self, p: &Point2<f64>) -> f64 {
        polygon::distance_to_vertices(&self.points, p)
    }

    /// Distance to the nearest outline edge.
    #[must_use]
    pub fn distance_to_edges(&self, p: &Point2<f64>) -> f64 {
        polygon::distance_to_edges(&self.points, p)
    }

    /// Mean of the points in the rearmost `threshold_ratio` of the length.
    #[must_use]
    pub fn heel_center(&self, threshold_ratio: f64) -> Point2<f64> {
        let threshold = self.length().mul_add(threshold_ratio, self.min.x);
        let (sum, count) = self
            .points
            .iter()
            .filter(|p| p.x <= threshold)
            .fold((Vector2::zeros(), 0_usize), |(s, c), p| (s + p.coords, c + 1));
        if count == 0 {
            // min.x is attained by some point, so this branch is unreachable
            // for a validated outline; keep a sane answer anyway.
            return Point2::new(self.min.x, (self.min.y + self.max.y) * 0.5);
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / count as f64;
        Point2::from(mean)
    }

    /// Per-x lower and upper edge of the outline.
    #[must_use]
    pub fn y_bounds(&self) -> YBounds {
        YBounds::from_outline(self)
    }

    /// Subdivide edges in the heel region to `spacing` mm.
    ///
    /// Edges whose midpoint lies within the first `heel_end_pct` percent of
    /// the length use `spacing`; the next `blend_pct` percent blend toward the
    /// native edge length.
    #[must_use]
    pub fn resample_heel_region(&self, spacing: f64, heel_end_pct: f64, blend_pct: f64) -> Self {
        let length = self.length();
        if length <= 0.0 || spacing <= 0.0 {
            return self.clone();
        }
        let n = self.points.len();
        let mut out = Vec::with_capacity(n * 2);
        for i in 0..n {
            let p0 = self.points[i];
            let p1 = self.points[(i + 1) % n];
            out.push(p0);

            let seg_len = (p1 - p0).norm();
            let x_pct = ((p0.x + p1.x) * 0.5 - self.min.x) / length * 100.0;
            let desired = if x_pct <= heel_end_pct {
                spacing
            } else if x_pct <= heel_end_pct + blend_pct {
                let t = (x_pct - heel_end_pct) / blend_pct;
                t.mul_add(seg_len - spacing, spacing).min(seg_len)
            } else {
                seg_len
            };

            if desired > 0.0 && desired < seg_len {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n_sub = (seg_len / desired).ceil() as usize;
                for j in 1..n_sub {
                    #[allow(clippy::cast_precision_loss)]
                    let frac = j as f64 / n_sub as f64;
                    out.push(p0 + (p1 - p0) * frac);
                }
            }
        }
        Self::from_valid(out)
    }
}

/// Lower (`y_min`) and upper (`y_max`) outline edge as functions of x.
///
/// Built from [`Y_BOUND_SAMPLES`] evenly spaced x samples; at each sample the
/// min/max y of outline points within one percent of the length is taken,
/// carrying the previous sample when no point is that close. Evaluation
/// interpolates linearly and extrapolates beyond the ends.
#[derive(Debug, Clone)]
pub struct YBounds {
    xs: Vec<f64>,
    lows: Vec<f64>,
    highs: Vec<f64>,
}

impl YBounds {
    fn from_outline(outline: &Outline) -> Self {
        let (x_min, x_max) = (outline.min.x, outline.max.x);
        let tol = (x_max - x_min) / 100.0;
        let mut xs = Vec::with_capacity(Y_BOUND_SAMPLES);
        let mut lows = Vec::with_capacity(Y_BOUND_SAMPLES);
        let mut highs = Vec::with_capacity(Y_BOUND_SAMPLES);

        for i in 0..Y_BOUND_SAMPLES {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / (Y_BOUND_SAMPLES - 1) as f64;
            let sx = t.mul_add(x_max - x_min, x_min);
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for p in outline.points.iter().filter(|p| (p.x - sx).abs() < tol) {
                lo = lo.min(p.y);
                hi = hi.max(p.y);
            }
            if lo > hi {
                lo = lows.last().copied().unwrap_or(outline.min.y);
                hi = highs.last().copied().unwrap_or(outline.max.y);
            }
            xs.push(sx);
            lows.push(lo);
            highs.push(hi);
        }
        Self { xs, lows, highs }
    }

    /// Lower edge (medial side) at `x`.
    #[must_use]
    pub fn y_min(&self, x: f64) -> f64 {
        interp_extrapolate(&self.xs, &self.lows, x)
    }

    /// Upper edge (lateral side) at `x`.
    #[must_use]
    pub fn y_max(&self, x: f64) -> f64 {
        interp_extrapolate(&self.xs, &self.highs, x)
    }

    /// Both edges at `x`.
    #[must_use]
    pub fn at(&self, x: f64) -> (f64, f64) {
        (self.y_min(x), self.y_max(x))
    }
}

/// Piecewise-linear interpolation over sorted `xs`, extrapolating linearly.
#[must_use]
pub fn interp_extrapolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    match n {
        0 => return 0.0,
        1 => return ys[0],
        _ => {}
    }
    let i = xs.partition_point(|&v| v <= x).clamp(1, n - 1);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    let dx = x1 - x0;
    if dx.abs() < f64::EPSILON {
        return y0;
    }
    let t = (x - x0) / dx;
    t.mul_add(y1 - y0, y0)
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
    fn test_rejects_too_few_points() {
        let err = Outline::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(matches!(err, Err(OutlineError::TooFewPoints { count: 2 })));
    }

    #[test]
    fn test_rejects_collinear() {
        let err = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ]);
        assert!(matches!(err, Err(OutlineError::Degenerate { .. })));
    }

    #[test]
    fn test_rejects_nan() {
        let err = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(f64::NAN, 0.0),
            Point2::new(2.0, 1.0),
        ]);
        assert!(matches!(err, Err(OutlineError::NonFinite { index: 1 })));
    }

    #[test]
    fn test_normalized_moves_to_origin() {
        let o = rect(10.0, 5.0).translated(Vector2::new(3.0, -2.0)).normalized();
        assert_relative_eq!(o.min().x, 0.0);
        assert_relative_eq!(o.min().y, 0.0);
        assert_relative_eq!(o.length(), 10.0);
        assert_relative_eq!(o.width(), 5.0);
    }

    #[test]
    fn test_y_bounds_on_rectangle() {
        let o = rect(50.0, 30.0).resample_heel_region(0.5, 100.0, 0.0);
        let yb = o.y_bounds();
        assert_relative_eq!(yb.y_min(25.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(yb.y_max(25.0), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_interp_extrapolate() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 2.0, 3.0];
        assert_relative_eq!(interp_extrapolate(&xs, &ys, 0.5), 1.0);
        assert_relative_eq!(interp_extrapolate(&xs, &ys, 3.0), 4.0);
        assert_relative_eq!(interp_extrapolate(&xs, &ys, -1.0), -2.0);
    }

    #[test]
    fn test_heel_resampling_spacing() {
        let o = rect(100.0, 30.0);
        let r = o.resample_heel_region(0.5, 30.0, 5.0);
        assert!(r.len() > o.len());
        // The heel edge (x = 0) is 30 mm long: 60 sub-segments.
        let heel_pts = r.points().iter().filter(|p| p.x.abs() < 1e-9).count();
        assert_eq!(heel_pts, 61);
        // Edges whose midpoint is past the heel region stay untouched.
        let top = r.points().iter().filter(|p| (p.y - 30.0).abs() < 1e-9).count();
        assert_eq!(top, 2);
    }

    #[test]
    fn test_heel_center() {
        let o = rect(100.0, 30.0);
        let c = o.heel_center(0.05);
        assert_relative_eq!(c.x, 0.0);
        assert_relative_eq!(c.y, 15.0);
    }

    #[test]
    fn test_flipped_x_keeps_orientation() {
        let o = rect(20.0, 10.0);
        let f = o.flipped_x();
        assert!(f.signed_area() > 0.0);
        assert_relative_eq!(f.max().x, 20.0);
    }

    #[test]
    fn test_foot_side_serde() {
        let side: FootSide = serde_json::from_str("\"right\"").unwrap();
        assert!(side.is_mirrored());
    }
}
