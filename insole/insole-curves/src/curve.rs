//! Curve input records and densified curve evaluation.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::spline::{DEFAULT_SUBDIVISIONS, densify_open};
use crate::{CurveError, CurveResult};

/// A single control point as supplied by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Heel-to-toe coordinate (mm).
    pub x: f64,
    /// Width coordinate (mm).
    pub y: f64,
}

impl CurvePoint {
    /// Create a control point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// As a nalgebra point.
    #[must_use]
    pub const fn to_point(self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

impl From<Point2<f64>> for CurvePoint {
    fn from(p: Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// The named curves of a curve set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CurveKey {
    /// Medial solid curve.
    Medial,
    /// Medial flat curve.
    MedialFlat,
    /// Lateral solid curve.
    Lateral,
    /// Lateral flat curve.
    LateralFlat,
    /// Transverse arch polygon.
    Transverse,
    /// Heel-side bridge from the medial to the lateral arch start.
    HeelBridge,
    /// Bridge from the lateral arch end to the transverse polygon.
    LateralBridge,
    /// Bridge from the transverse polygon to the medial arch end.
    MetatarsalBridge,
}

impl CurveKey {
    /// Every key, in serialization order.
    pub const ALL: [Self; 8] = [
        Self::Medial,
        Self::MedialFlat,
        Self::Lateral,
        Self::LateralFlat,
        Self::Transverse,
        Self::HeelBridge,
        Self::LateralBridge,
        Self::MetatarsalBridge,
    ];

    /// Wire name of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Medial => "medial",
            Self::MedialFlat => "medialFlat",
            Self::Lateral => "lateral",
            Self::LateralFlat => "lateralFlat",
            Self::Transverse => "transverse",
            Self::HeelBridge => "heelBridge",
            Self::LateralBridge => "lateralBridge",
            Self::MetatarsalBridge => "metatarsalBridge",
        }
    }

    /// Minimum number of control points a supplied curve needs to be used.
    #[must_use]
    pub const fn min_points(self) -> usize {
        match self {
            Self::Transverse | Self::HeelBridge | Self::LateralBridge | Self::MetatarsalBridge => 3,
            _ => 2,
        }
    }
}

impl std::fmt::Display for CurveKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An optional set of user-edited curves.
///
/// Any curve may be missing. Missing sources are generated from the landmarks
/// and derived curves are always recomputed; see
/// [`ArchCurveSet::resolve`](crate::ArchCurveSet::resolve).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchCurveSet {
    /// Medial solid curve.
    pub medial: Option<Vec<CurvePoint>>,
    /// Medial flat curve (interior shape only).
    pub medial_flat: Option<Vec<CurvePoint>>,
    /// Lateral solid curve.
    pub lateral: Option<Vec<CurvePoint>>,
    /// Lateral flat curve (interior shape only).
    pub lateral_flat: Option<Vec<CurvePoint>>,
    /// Transverse polygon.
    pub transverse: Option<Vec<CurvePoint>>,
    /// Heel bridge (interior shape only).
    pub heel_bridge: Option<Vec<CurvePoint>>,
    /// Lateral bridge (interior shape only).
    pub lateral_bridge: Option<Vec<CurvePoint>>,
    /// Metatarsal bridge (interior shape only).
    pub metatarsal_bridge: Option<Vec<CurvePoint>>,
}

impl ArchCurveSet {
    /// The supplied control points for `key`, if any.
    #[must_use]
    pub fn get(&self, key: CurveKey) -> Option<&[CurvePoint]> {
        let curve = match key {
            CurveKey::Medial => &self.medial,
            CurveKey::MedialFlat => &self.medial_flat,
            CurveKey::Lateral => &self.lateral,
            CurveKey::LateralFlat => &self.lateral_flat,
            CurveKey::Transverse => &self.transverse,
            CurveKey::HeelBridge => &self.heel_bridge,
            CurveKey::LateralBridge => &self.lateral_bridge,
            CurveKey::MetatarsalBridge => &self.metatarsal_bridge,
        };
        curve.as_deref()
    }

    /// Whether no curve is supplied at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        CurveKey::ALL.iter().all(|&k| self.get(k).is_none())
    }

    /// Mirror every supplied curve in x about `axis`, as for a flipped outline.
    #[must_use]
    pub fn flipped_x(&self, axis: f64) -> Self {
        let flip = |c: &Option<Vec<CurvePoint>>| {
            c.as_ref().map(|pts| {
                pts.iter()
                    .map(|p| CurvePoint::new(2.0 * axis - p.x, p.y))
                    .collect()
            })
        };
        Self {
            medial: flip(&self.medial),
            medial_flat: flip(&self.medial_flat),
            lateral: flip(&self.lateral),
            lateral_flat: flip(&self.lateral_flat),
            transverse: flip(&self.transverse),
            heel_bridge: flip(&self.heel_bridge),
            lateral_bridge: flip(&self.lateral_bridge),
            metatarsal_bridge: flip(&self.metatarsal_bridge),
        }
    }

    /// Shift every supplied curve by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let shift = |c: &Option<Vec<CurvePoint>>| {
            c.as_ref()
                .map(|pts| pts.iter().map(|p| CurvePoint::new(p.x + dx, p.y + dy)).collect())
        };
        Self {
            medial: shift(&self.medial),
            medial_flat: shift(&self.medial_flat),
            lateral: shift(&self.lateral),
            lateral_flat: shift(&self.lateral_flat),
            transverse: shift(&self.transverse),
            heel_bridge: shift(&self.heel_bridge),
            lateral_bridge: shift(&self.lateral_bridge),
            metatarsal_bridge: shift(&self.metatarsal_bridge),
        }
    }

    /// Supplied control points for `key` as points, when usable.
    ///
    /// Curves with too few points are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::NonFinite`] when a supplied coordinate is NaN or
    /// infinite.
    pub fn points(&self, key: CurveKey) -> CurveResult<Option<Vec<Point2<f64>>>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        if let Some(index) = raw.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(CurveError::NonFinite { key, index });
        }
        if raw.len() < key.min_points() {
            return Ok(None);
        }
        Ok(Some(raw.iter().map(|p| p.to_point()).collect()))
    }
}

/// A densified open curve evaluated as a function `y(x)`.
///
/// Samples are kept sorted by x; evaluation interpolates linearly between
/// neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseCurve {
    points: Vec<Point2<f64>>,
}

impl DenseCurve {
    /// Densify control points with Catmull-Rom and sort the samples by x.
    #[must_use]
    pub fn from_controls(controls: &[Point2<f64>]) -> Self {
        Self::from_samples(densify_open(controls, DEFAULT_SUBDIVISIONS))
    }

    /// Wrap already dense samples.
    #[must_use]
    pub fn from_samples(mut points: Vec<Point2<f64>>) -> Self {
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { points }
    }

    /// Sorted samples.
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Smallest sampled x.
    #[must_use]
    pub fn x_start(&self) -> Option<f64> {
        self.points.first().map(|p| p.x)
    }

    /// Largest sampled x.
    #[must_use]
    pub fn x_end(&self) -> Option<f64> {
        self.points.last().map(|p| p.x)
    }

    /// Whether `x` lies within the sampled range.
    #[must_use]
    pub fn covers(&self, x: f64) -> bool {
        match (self.x_start(), self.x_end()) {
            (Some(a), Some(b)) => x >= a && x <= b,
            _ => false,
        }
    }

    /// `y(x)` inside the sampled range, `None` outside.
    #[must_use]
    pub fn y_at(&self, x: f64) -> Option<f64> {
        if !self.covers(x) || self.points.len() < 2 {
            return None;
        }
        Some(self.interp(x))
    }

    /// `y(x)` with the end values held constant outside the sampled range.
    #[must_use]
    pub fn y_at_clamped(&self, x: f64) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if x <= first.x {
            return Some(first.y);
        }
        if x >= last.x {
            return Some(last.y);
        }
        Some(self.interp(x))
    }

    fn interp(&self, x: f64) -> f64 {
        let n = self.points.len();
        let i = self.points.partition_point(|p| p.x <= x).clamp(1, n - 1);
        let (a, b) = (self.points[i - 1], self.points[i]);
        let dx = b.x - a.x;
        if dx.abs() < 1e-12 {
            return 0.5 * (a.y + b.y);
        }
        let t = (x - a.x) / dx;
        t.mul_add(b.y - a.y, a.y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_curve_set_from_camel_case_json() {
        let json = r#"{
            "medial": [{"x": 10.0, "y": 0.0}, {"x": 20.0, "y": 5.0}],
            "medialFlat": [{"x": 11.0, "y": 0.0}, {"x": 19.0, "y": 0.0}],
            "heelBridge": null
        }"#;
        let set: ArchCurveSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.get(CurveKey::Medial).unwrap().len(), 2);
        assert_eq!(set.get(CurveKey::MedialFlat).unwrap()[0].x, 11.0);
        assert!(set.get(CurveKey::HeelBridge).is_none());
        assert!(set.get(CurveKey::Transverse).is_none());
        assert!(!set.is_empty());
        assert!(ArchCurveSet::default().is_empty());
    }

    #[test]
    fn test_points_rejects_non_finite_and_ignores_short() {
        let set = ArchCurveSet {
            medial: Some(vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(f64::NAN, 1.0)]),
            transverse: Some(vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)]),
            ..ArchCurveSet::default()
        };
        assert!(matches!(
            set.points(CurveKey::Medial),
            Err(CurveError::NonFinite { index: 1, .. })
        ));
        assert!(set.points(CurveKey::Transverse).unwrap().is_none());
    }

    #[test]
    fn test_dense_curve_sampling() {
        let curve = DenseCurve::from_samples(vec![
            Point2::new(10.0, 2.0),
            Point2::new(0.0, 0.0),
            Point2::new(20.0, 2.0),
        ]);
        assert_relative_eq!(curve.y_at(5.0).unwrap(), 1.0);
        assert_relative_eq!(curve.y_at(15.0).unwrap(), 2.0);
        assert!(curve.y_at(-1.0).is_none());
        assert!(curve.y_at(21.0).is_none());
        assert_relative_eq!(curve.y_at_clamped(-1.0).unwrap(), 0.0);
        assert_relative_eq!(curve.y_at_clamped(30.0).unwrap(), 2.0);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(CurveKey::MetatarsalBridge.as_str(), "metatarsalBridge");
        let json = serde_json::to_string(&CurveKey::LateralFlat).unwrap();
        assert_eq!(json, "\"lateralFlat\"");
    }

    #[test]
    fn test_flip_and_translate() {
        let set = ArchCurveSet {
            lateral: Some(vec![CurvePoint::new(10.0, 1.0), CurvePoint::new(30.0, 2.0)]),
            ..ArchCurveSet::default()
        };
        let flipped = set.flipped_x(50.0);
        assert_eq!(flipped.lateral.as_ref().unwrap()[0].x, 90.0);
        let moved = set.translated(-10.0, 1.0);
        assert_eq!(moved.lateral.as_ref().unwrap()[0], CurvePoint::new(0.0, 2.0));
    }
}
