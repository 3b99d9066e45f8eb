//! The height field: one pure function from a planar point to surface height.

use insole_curves::{ArchCurveSet, BandCurves, ResolvedCurves};
use insole_outline::{Landmarks, Outline, YBounds, polygon};
use nalgebra::Point2;
use rayon::prelude::*;
use tracing::debug;

use crate::FieldResult;
use crate::profile::{ArchProfiles, smoothstep};
use crate::settings::{ArchSettings, YBands};
use crate::wall::{WallParams, WallProfile};

/// Edge distance below which the surface stays at wall height.
const TRANSITION_OFFSET: f64 = 0.5;
/// Edge distance over which the wall blends into the arch surface.
const TRANSITION_DISTANCE: f64 = 10.0;
/// Fraction of the local width the transition is limited to at the heel.
const HEEL_WIDTH_FRACTION: f64 = 0.35;
/// Axis percent up to which the width limit applies.
const HEEL_LIMIT_END: f64 = 10.0;
/// Axis percent over which the width limit is released.
const HEEL_LIMIT_RELEASE: f64 = 5.0;
/// Half width (axis %) of the cross-fade between outline and side distance.
const HEEL_CROSSFADE: f64 = 8.0;
/// Axis percent over which the heel x-blend fades out before the heel-cup boundary.
const X_BLEND_FADE: f64 = 4.0;
/// Local widths at or below this are treated as a point (mm).
const MIN_LOCAL_WIDTH: f64 = 0.5;
/// Curve separations at or below this give no band height (mm).
const MIN_BAND_WIDTH: f64 = 0.01;
/// Exponent of the transverse radial falloff.
const TRANSVERSE_EXPONENT: f64 = 0.6;
/// Fraction of the strongest arch the pad floor rises to.
const MICRO_FRACTION: f64 = 0.4;
/// Distance from the pad boundary over which the floor fades in (mm).
const MICRO_FALLOFF: f64 = 3.0;
/// Heel-center threshold ratio for the uniform rim.
const HEEL_CENTER_RATIO: f64 = 0.05;
/// Fraction of the length over which the uniform rim fades back to the walls.
const RIM_TRANSITION: f64 = 0.10;

/// Every intermediate quantity of one height evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightSample {
    /// Axis position in percent (0 = heel).
    pub x_ratio: f64,
    /// Width position, 0 = lateral edge, 1 = medial edge.
    pub arch_y: f64,
    /// Blended wall height including the heel cup.
    pub wall: f64,
    /// Medial arch contribution.
    pub medial: f64,
    /// Lateral arch contribution.
    pub lateral: f64,
    /// Transverse arch contribution.
    pub transverse: f64,
    /// Arch-pad floor.
    pub micro: f64,
    /// Combined arch height.
    pub arch: f64,
    /// Wall-to-arch blend weight (0 = wall, 1 = arch).
    pub blend: f64,
    /// Final surface height.
    pub height: f64,
}

/// Heights sampled on a regular grid, row-major with `ys` outer.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    /// Column coordinates.
    pub xs: Vec<f64>,
    /// Row coordinates.
    pub ys: Vec<f64>,
    /// Height at every grid node.
    pub heights: Vec<f64>,
    /// Whether each node lies inside the outline.
    pub inside: Vec<bool>,
}

impl HeightGrid {
    /// Height at column `ix`, row `iy`.
    #[must_use]
    pub fn get(&self, ix: usize, iy: usize) -> Option<f64> {
        if ix >= self.xs.len() {
            return None;
        }
        self.heights.get(iy * self.xs.len() + ix).copied()
    }

    /// Largest height over nodes inside the outline.
    #[must_use]
    pub fn max_inside(&self) -> Option<f64> {
        self.heights
            .iter()
            .zip(&self.inside)
            .filter(|(_, inside)| **inside)
            .map(|(h, _)| *h)
            .reduce(f64::max)
    }
}

/// Surface height over one outline.
///
/// Built once per request from the outline, landmarks, arch settings, wall
/// parameters and arch curves, then evaluated at any point. Construction
/// resolves the curve set; evaluation is pure and shared by mesh generation
/// and preview sampling.
///
/// # Example
///
/// ```
/// use insole_curves::ArchCurveSet;
/// use insole_field::{ArchSettings, HeightField, WallParams};
/// use insole_outline::{Landmarks, Outline};
/// use nalgebra::Point2;
///
/// let outline = Outline::new(vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(240.0, 0.0),
///     Point2::new(240.0, 90.0),
///     Point2::new(0.0, 90.0),
/// ])
/// .unwrap();
/// let field = HeightField::new(
///     &outline,
///     &Landmarks::default(),
///     &ArchSettings::default(),
///     &WallParams::default(),
///     &ArchCurveSet::default(),
/// )
/// .unwrap();
/// assert!(field.height(120.0, 45.0) >= 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct HeightField {
    outline: Outline,
    bounds: YBounds,
    landmarks: Landmarks,
    walls: WallProfile,
    arches: ArchProfiles,
    bands: YBands,
    curves: Option<ResolvedCurves>,
    base: f64,
    medial_peak: f64,
    lateral_peak: f64,
    heel_center: Point2<f64>,
}

impl HeightField {
    /// Build a field, resolving `curves` against the outline.
    ///
    /// An empty curve set resolves to the default curves.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidParameter`](crate::FieldError::InvalidParameter)
    /// for out-of-range settings or wall parameters and
    /// [`FieldError::Curves`](crate::FieldError::Curves) when the curve set
    /// does not resolve.
    pub fn new(
        outline: &Outline,
        landmarks: &Landmarks,
        settings: &ArchSettings,
        wall: &WallParams,
        curves: &ArchCurveSet,
    ) -> FieldResult<Self> {
        settings.validate()?;
        wall.validate()?;
        let resolved = curves.resolve(outline, landmarks, &settings.spans())?;
        debug!(
            medial = resolved.medial.is_some(),
            lateral = resolved.lateral.is_some(),
            transverse = resolved.transverse.is_some(),
            arch_pad = resolved.arch_pad.is_some(),
            "Resolved arch curves"
        );
        Ok(Self::build(outline, landmarks, settings, wall, Some(resolved)))
    }

    /// Build a field that uses the percentage y-bands instead of curves.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidParameter`](crate::FieldError::InvalidParameter)
    /// for out-of-range settings or wall parameters.
    pub fn without_curves(
        outline: &Outline,
        landmarks: &Landmarks,
        settings: &ArchSettings,
        wall: &WallParams,
    ) -> FieldResult<Self> {
        settings.validate()?;
        wall.validate()?;
        Ok(Self::build(outline, landmarks, settings, wall, None))
    }

    fn build(
        outline: &Outline,
        landmarks: &Landmarks,
        settings: &ArchSettings,
        wall: &WallParams,
        curves: Option<ResolvedCurves>,
    ) -> Self {
        Self {
            outline: outline.clone(),
            bounds: outline.y_bounds(),
            landmarks: *landmarks,
            walls: WallProfile::new(landmarks, wall),
            arches: ArchProfiles::new(settings, landmarks, wall.arch_scale),
            bands: settings.y_bands(landmarks.width_rays()),
            curves,
            base: wall.base_thickness,
            medial_peak: settings.medial_height * wall.arch_scale,
            lateral_peak: settings.lateral_height * wall.arch_scale,
            heel_center: outline.heel_center(HEEL_CENTER_RATIO),
        }
    }

    /// The outline this field is defined over.
    #[must_use]
    pub const fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Base thickness under the whole surface.
    #[must_use]
    pub const fn base_thickness(&self) -> f64 {
        self.base
    }

    /// The resolved curves, when the field was built with them.
    #[must_use]
    pub const fn curves(&self) -> Option<&ResolvedCurves> {
        self.curves.as_ref()
    }

    /// Surface height at `(x, y)`.
    #[must_use]
    pub fn height(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y).height
    }

    /// Height of an outline (rim) vertex: base plus wall, with a uniform
    /// wall height around the heel cup.
    #[must_use]
    pub fn rim_height(&self, x: f64, y: f64) -> f64 {
        let (x_ratio, arch_y, _) = self.coordinates(x, y);
        let inner = self.walls.medial(x_ratio);
        let outer = self.walls.lateral(x_ratio);
        let cup = self.walls.heel_cup(x_ratio);
        let normal = outer * (1.0 - arch_y) + inner * arch_y;

        let length = self.outline.length();
        let radius = self.heel_cup_boundary(arch_y) / 100.0 * length;
        let dist = (Point2::new(x, y) - self.heel_center).norm();
        let wall = if dist <= radius {
            let uniform = 0.5 * (inner + outer);
            let fade_start = (radius - RIM_TRANSITION * length).max(0.0);
            let fade = radius - fade_start;
            let t = if dist <= fade_start || fade <= 0.0 {
                0.0
            } else {
                smoothstep((dist - fade_start) / fade)
            };
            uniform * (1.0 - t) + normal * t
        } else {
            normal
        };
        self.base + wall.max(cup)
    }

    /// All intermediate values of the height at `(x, y)`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> HeightSample {
        let p = Point2::new(x, y);
        let (x_ratio, arch_y, (lo, hi)) = self.coordinates(x, y);

        let inner = self.walls.medial(x_ratio);
        let outer = self.walls.lateral(x_ratio);
        let wall = (outer * (1.0 - arch_y) + inner * arch_y).max(self.walls.heel_cup(x_ratio));

        let arch_inner = self.arches.medial.eval(x_ratio);
        let arch_outer = self.arches.lateral.eval(x_ratio);
        let arch_trans = self.arches.transverse.eval(x_ratio);

        let curves = self.curves.as_ref();
        let medial = self.medial_height(curves.and_then(|c| c.medial.as_ref()), x, y, arch_y, arch_inner);
        let lateral =
            self.lateral_height(curves.and_then(|c| c.lateral.as_ref()), x, y, arch_y, arch_outer);
        let transverse = self.transverse_height(curves, &p, arch_y, arch_trans);
        let mut arch = medial.max(lateral).max(transverse);

        let micro = self.micro_floor(curves, &p, arch_inner.max(arch_outer).max(arch_trans));
        arch = arch.max(micro);

        let blend = self.blend(&p, x_ratio, arch_y, lo, hi);
        let height = self.base + (wall * (1.0 - blend) + arch * blend).max(0.0);

        HeightSample {
            x_ratio,
            arch_y,
            wall,
            medial,
            lateral,
            transverse,
            micro,
            arch,
            blend,
            height,
        }
    }

    /// Evaluate the field on a grid, rows in parallel.
    #[must_use]
    pub fn sample_grid(&self, xs: &[f64], ys: &[f64]) -> HeightGrid {
        let heights: Vec<f64> = ys
            .par_iter()
            .flat_map_iter(|&y| xs.iter().map(move |&x| self.height(x, y)))
            .collect();
        let inside = self.outline.inside_grid(xs, ys);
        debug!(nodes = heights.len(), "Sampled height grid");
        HeightGrid {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            heights,
            inside,
        }
    }

    /// Axis percent, width fraction and local y-bounds at a point.
    fn coordinates(&self, x: f64, y: f64) -> (f64, f64, (f64, f64)) {
        let length = self.outline.length();
        let x_ratio = if length > 0.0 {
            ((x - self.outline.min().x) / length * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let (lo, hi) = self.bounds.at(x);
        let width = hi - lo;
        let y_ratio = if width > MIN_LOCAL_WIDTH {
            ((y - lo) / width).clamp(0.0, 1.0)
        } else {
            0.5
        };
        (x_ratio, 1.0 - y_ratio, (lo, hi))
    }

    /// Axis percent of the heel-cup boundary at a width fraction.
    fn heel_cup_boundary(&self, arch_y: f64) -> f64 {
        self.landmarks.lateral_arch_start * (1.0 - arch_y) + self.landmarks.arch_start * arch_y
    }

    fn medial_height(&self, band: Option<&BandCurves>, x: f64, y: f64, arch_y: f64, h: f64) -> f64 {
        if let Some(v) = band.and_then(|b| band_height(b, x, y, h)) {
            return v;
        }
        let (start, end) = (self.bands.medial_start, self.bands.medial_end);
        if arch_y < start {
            0.0
        } else if end - start <= 0.0 {
            h
        } else {
            h * ((arch_y - start) / (end - start)).min(1.0)
        }
    }

    fn lateral_height(&self, band: Option<&BandCurves>, x: f64, y: f64, arch_y: f64, h: f64) -> f64 {
        if let Some(v) = band.and_then(|b| band_height(b, x, y, h)) {
            return v;
        }
        let (start, end) = (self.bands.lateral_start, self.bands.lateral_end);
        if arch_y > end {
            0.0
        } else if end - start <= 0.0 {
            h
        } else {
            h * (1.0 - (arch_y - start) / (end - start)).clamp(0.0, 1.0)
        }
    }

    fn transverse_height(
        &self,
        curves: Option<&ResolvedCurves>,
        p: &Point2<f64>,
        arch_y: f64,
        h: f64,
    ) -> f64 {
        if h <= 0.0 {
            return 0.0;
        }
        if let Some(ring) = curves.and_then(|c| c.transverse.as_deref()) {
            if !polygon::contains(ring, p) {
                return 0.0;
            }
            let crossings = polygon::column_crossings(ring, p.x);
            let f = match (
                crossings.iter().copied().reduce(f64::min),
                crossings.iter().copied().reduce(f64::max),
            ) {
                (Some(lo), Some(hi)) if crossings.len() >= 2 => {
                    radial_falloff(p.y, 0.5 * (lo + hi), 0.5 * (hi - lo))
                }
                _ => 1.0,
            };
            return h * plateau(f);
        }
        let (start, end) = (self.bands.transverse_start, self.bands.transverse_end);
        if arch_y < start || arch_y > end {
            return 0.0;
        }
        h * plateau(radial_falloff(arch_y, 0.5 * (start + end), 0.5 * (end - start)))
    }

    fn micro_floor(&self, curves: Option<&ResolvedCurves>, p: &Point2<f64>, strongest: f64) -> f64 {
        let Some(pad) = curves.and_then(|c| c.arch_pad.as_deref()) else {
            return 0.0;
        };
        if strongest <= 0.0 || !polygon::contains(pad, p) {
            return 0.0;
        }
        let reference = self.medial_peak.max(self.lateral_peak).max(0.01);
        let floor = MICRO_FRACTION * (strongest / reference).min(1.0);
        let d = polygon::distance_to_edges(pad, p);
        if d < MICRO_FALLOFF {
            floor * smoothstep(d / MICRO_FALLOFF)
        } else {
            floor
        }
    }

    /// Wall-to-arch blend weight.
    fn blend(&self, p: &Point2<f64>, x_ratio: f64, arch_y: f64, lo: f64, hi: f64) -> f64 {
        let width = hi - lo;
        let heel_limit = TRANSITION_DISTANCE.min(HEEL_WIDTH_FRACTION * width);
        let transition = if x_ratio <= HEEL_LIMIT_END {
            heel_limit
        } else {
            let t = smoothstep((x_ratio - HEEL_LIMIT_END) / HEEL_LIMIT_RELEASE);
            heel_limit + (TRANSITION_DISTANCE - heel_limit) * t
        };

        let boundary = self.outline.distance_to_edges(p);
        let side = (p.y - lo).abs().min((p.y - hi).abs());
        let cup = self.heel_cup_boundary(arch_y);
        let distance = if x_ratio <= cup - HEEL_CROSSFADE {
            boundary
        } else if x_ratio < cup + HEEL_CROSSFADE {
            let t = smoothstep((x_ratio - (cup - HEEL_CROSSFADE)) / (2.0 * HEEL_CROSSFADE));
            boundary * (1.0 - t) + side * t
        } else {
            side
        };
        let y_blend = blend_curve(distance, transition);

        let x_blend = if x_ratio <= cup {
            let weight = 1.0 - smoothstep((x_ratio - (cup - X_BLEND_FADE)) / X_BLEND_FADE);
            1.0 - weight * (1.0 - blend_curve(boundary, TRANSITION_DISTANCE))
        } else {
            1.0
        };
        y_blend.min(x_blend)
    }
}

/// Height inside a solid/flat band, or `None` where the band is absent at `x`.
fn band_height(band: &BandCurves, x: f64, y: f64, h: f64) -> Option<f64> {
    let (y_solid, y_flat) = band.sample(x)?;
    let denom = y_flat - y_solid;
    if denom.abs() <= MIN_BAND_WIDTH {
        return Some(0.0);
    }
    let t = (y - y_solid) / denom;
    Some(if (0.0..=1.0).contains(&t) {
        h * smoothstep(t)
    } else if t > 1.0 {
        h
    } else {
        0.0
    })
}

/// Linear falloff from a center, 1 at `center` and 0 at `center ± half`.
fn radial_falloff(v: f64, center: f64, half: f64) -> f64 {
    if half > 0.01 {
        (1.0 - (v - center).abs() / half).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Exponent and double smoothstep widening the transverse plateau.
fn plateau(f: f64) -> f64 {
    smoothstep(smoothstep(f.powf(TRANSVERSE_EXPONENT)))
}

/// Wall-to-arch transition over an edge distance.
fn blend_curve(distance: f64, transition: f64) -> f64 {
    if distance < TRANSITION_OFFSET {
        0.0
    } else if distance < transition {
        smoothstep((distance - TRANSITION_OFFSET) / (transition - TRANSITION_OFFSET))
    } else {
        1.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::settings::Arch;
    use approx::assert_relative_eq;

    /// A rounded foot-like outline, 250 x 90 mm, counter-clockwise.
    fn foot() -> Outline {
        let n = 240;
        let pts = (0..n)
            .map(|i| {
                let a = f64::from(i) / f64::from(n) * std::f64::consts::TAU;
                let c = a.cos();
                let s = a.sin();
                // superellipse keeps the sides nearly straight
                let x = 125.0 + 125.0 * c.signum() * c.abs().powf(0.6);
                let y = 45.0 + 45.0 * s.signum() * s.abs().powf(0.6);
                Point2::new(x, y)
            })
            .collect();
        Outline::new(pts).unwrap()
    }

    fn field(settings: &ArchSettings, wall: &WallParams) -> HeightField {
        HeightField::new(
            &foot(),
            &Landmarks::default(),
            settings,
            wall,
            &ArchCurveSet::default(),
        )
        .unwrap()
    }

    fn inside_points(outline: &Outline) -> Vec<Point2<f64>> {
        let mut out = Vec::new();
        for i in 0..50 {
            for j in 0..18 {
                let p = Point2::new(2.5 + 5.0 * f64::from(i), 2.5 + 5.0 * f64::from(j));
                if outline.contains(&p) {
                    out.push(p);
                }
            }
        }
        out
    }

    #[test]
    fn test_height_never_below_base() {
        let wall = WallParams::default().with_wall_height_offset(-20.0);
        for f in [
            field(&ArchSettings::default(), &WallParams::default()),
            field(&ArchSettings::default(), &wall),
        ] {
            for p in inside_points(f.outline()) {
                assert!(f.height(p.x, p.y) >= f.base_thickness());
            }
        }
    }

    #[test]
    fn test_transverse_zero_outside_span() {
        let s = ArchSettings::default().with_transverse_height(2.0);
        let f = field(&s, &WallParams::default());
        for p in inside_points(f.outline()) {
            let sample = f.sample(p.x, p.y);
            if sample.x_ratio < s.transverse_start || sample.x_ratio > s.transverse_end {
                assert_eq!(sample.transverse, 0.0, "at {p:?}");
            }
        }
    }

    #[test]
    fn test_transverse_peaks_inside_polygon() {
        let s = ArchSettings::default().with_transverse_height(2.0);
        let f = field(&s, &WallParams::default());
        // transverse peak, halfway between the two width rays
        let x = 0.59 * 250.0;
        let (lo, hi) = f.bounds.at(x);
        let y = lo + 0.55 * (hi - lo);
        let sample = f.sample(x, y);
        assert!(sample.transverse > 1.5);
        assert!(sample.transverse <= 2.0 + 1e-9);
    }

    #[test]
    fn test_flat_arches_reduce_to_wall() {
        let f = field(&ArchSettings::flat(), &WallParams::default());
        for p in inside_points(f.outline()) {
            let s = f.sample(p.x, p.y);
            assert_eq!(s.arch, 0.0);
            assert_eq!(s.micro, 0.0);
            assert_relative_eq!(s.height, 3.0 + s.wall * (1.0 - s.blend), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_height_is_continuous_along_x() {
        let s = ArchSettings::default()
            .with_medial_height(1.5)
            .with_transverse_height(1.0)
            .with_grid_cell("medial_2", 1.2);
        let f = field(&s, &WallParams::default().with_wall_height_offset(1.0));
        for y in [30.0, 45.0, 60.0] {
            let mut prev: Option<f64> = None;
            for i in 0..24_000 {
                let x = f64::from(i).mul_add(0.01, 5.0);
                if f.outline().contains(&Point2::new(x, y)) {
                    let h = f.height(x, y);
                    if let Some(p) = prev {
                        // Steepest slope is about 1.
                        assert!((h - p).abs() < 0.05, "jump {} at x={x}, y={y}", h - p);
                    }
                    prev = Some(h);
                } else {
                    prev = None;
                }
            }
        }
    }

    #[test]
    fn test_edges_stay_at_wall_height() {
        let f = field(&ArchSettings::default(), &WallParams::default());
        let s = f.sample(120.0, 0.2);
        assert_eq!(s.blend, 0.0);
        assert_relative_eq!(s.height, 3.0 + s.wall);
    }

    #[test]
    fn test_detail_zero_offsets_match_bell() {
        let lm = Landmarks::default();
        let plain = ArchSettings::default().with_medial_height(1.5);
        let detailed = plain
            .clone()
            .with_detail(Arch::Medial, BTreeMap::new());
        let a = field(&plain, &WallParams::default());
        let b = field(&detailed, &WallParams::default());
        for name in Arch::Medial.detail_landmarks() {
            let x = lm.get(name).unwrap() / 100.0 * 250.0;
            for y in [20.0, 45.0, 70.0] {
                assert_relative_eq!(a.height(x, y), b.height(x, y), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_percentage_bands_without_curves() {
        let s = ArchSettings::default().with_medial_height(2.0);
        let f = HeightField::without_curves(&foot(), &Landmarks::default(), &s, &WallParams::default())
            .unwrap();
        // at the medial peak the band ramps from 60% of the width to the edge
        let x = 0.43 * 250.0;
        let (lo, hi) = f.bounds.at(x);
        let y = lo + 0.15 * (hi - lo);
        let sample = f.sample(x, y);
        assert_relative_eq!(sample.medial, 2.0 * 0.25 / 0.4, epsilon = 1e-9);
        // on the lateral side the medial arch is absent
        let y = lo + 0.9 * (hi - lo);
        assert_eq!(f.sample(x, y).medial, 0.0);
    }

    #[test]
    fn test_rim_height_uniform_at_heel() {
        let f = field(&ArchSettings::default(), &WallParams::default());
        let outline = f.outline().clone();
        let heel: Vec<_> = outline
            .points()
            .iter()
            .filter(|p| p.x < 3.0 && (p.y - 45.0).abs() < 10.0)
            .collect();
        assert!(!heel.is_empty());
        for p in heel {
            // medial 6.4 and lateral 5.9 average to 6.15
            assert_relative_eq!(f.rim_height(p.x, p.y), 3.0 + 6.15, epsilon = 1e-9);
        }
        // far forward, the rim follows the walls, which are zero at the toe
        assert_relative_eq!(f.rim_height(249.0, 45.0), 3.0);
    }

    #[test]
    fn test_sample_grid_matches_pointwise() {
        let f = field(&ArchSettings::default(), &WallParams::default());
        let xs: Vec<f64> = (0..25).map(|i| 5.0 + 10.0 * f64::from(i)).collect();
        let ys: Vec<f64> = (0..9).map(|j| 5.0 + 10.0 * f64::from(j)).collect();
        let grid = f.sample_grid(&xs, &ys);
        assert_eq!(grid.heights.len(), 225);
        assert_eq!(grid.get(3, 4), Some(f.height(35.0, 45.0)));
        assert_eq!(grid.get(25, 0), None);
        assert!(grid.max_inside().unwrap() >= 3.0);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let s = ArchSettings::default().with_medial_height(-1.0);
        let r = HeightField::new(
            &foot(),
            &Landmarks::default(),
            &s,
            &WallParams::default(),
            &ArchCurveSet::default(),
        );
        assert!(r.is_err());
    }
}
