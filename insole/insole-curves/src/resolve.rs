//! Declarative resolution of a curve set against an outline.
//!
//! Sources (solid curves, the transverse polygon) come from the request or
//! from defaults. Derived curves (flats, bridges) are recomputed from their
//! sources on every call, so endpoints can never drift apart.

use insole_outline::{Landmarks, Outline, polygon};
use nalgebra::{Point2, Vector2};
use tracing::debug;

use crate::curve::{ArchCurveSet, CurveKey, CurvePoint, DenseCurve};
use crate::defaults::{
    bridge_control, end_out, flat_from_solid, lateral_to_toe_walk, longitudinal_solid, start_out,
    transverse_polygon,
};
use crate::frame::{ArchSide, ArchSpans, CurveFrame};
use crate::spline::{DEFAULT_SUBDIVISIONS, densify_closed, densify_open};
use crate::{CurveError, CurveResult};

/// Outline-edge samples on each side of the arch-pad polygon.
const PAD_EDGE_SAMPLES: usize = 30;

/// The solid/flat pair of one longitudinal arch.
#[derive(Debug, Clone, PartialEq)]
pub struct BandCurves {
    /// Curve along the anatomical edge side of the falloff band.
    pub solid: DenseCurve,
    /// Inner curve of the band, between the solid curve and the outline.
    pub flat: DenseCurve,
}

impl BandCurves {
    /// `(y_solid, y_flat)` at `x`, or `None` outside the solid curve.
    ///
    /// The flat curve is held at its end values where it is shorter than the
    /// solid curve.
    #[must_use]
    pub fn sample(&self, x: f64) -> Option<(f64, f64)> {
        let solid = self.solid.y_at(x)?;
        let flat = self.flat.y_at_clamped(x)?;
        Some((solid, flat))
    }
}

/// A fully resolved curve set, ready for height evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCurves {
    /// Medial band, absent when the medial span is empty.
    pub medial: Option<BandCurves>,
    /// Lateral band, absent when the lateral span is empty.
    pub lateral: Option<BandCurves>,
    /// Densified transverse polygon ring.
    pub transverse: Option<Vec<Point2<f64>>>,
    /// Arch-pad polygon bounded by the bridges and the outline edges.
    pub arch_pad: Option<Vec<Point2<f64>>>,
    /// Control points actually used, sources and derived curves alike.
    pub controls: ArchCurveSet,
}

impl ArchCurveSet {
    /// Resolve the set against an outline.
    ///
    /// Missing sources are generated from `spans` and the landmark width
    /// rays. Supplied flats and bridges keep their interior points only;
    /// their endpoints are re-anchored to the sources.
    ///
    /// # Errors
    ///
    /// - [`CurveError::NonFinite`] for a NaN or infinite supplied point
    /// - [`CurveError::DegeneratePolygon`] for a zero-area supplied
    ///   transverse polygon
    pub fn resolve(
        &self,
        outline: &Outline,
        landmarks: &Landmarks,
        spans: &ArchSpans,
    ) -> CurveResult<ResolvedCurves> {
        let frame = CurveFrame::new(outline, landmarks.width_rays());
        let mut controls = Self::default();

        let medial = self.resolve_band(&frame, spans, ArchSide::Medial)?;
        let lateral = self.resolve_band(&frame, spans, ArchSide::Lateral)?;

        let transverse_controls = match self.points(CurveKey::Transverse)? {
            Some(pts) => {
                let area = polygon::signed_area(&pts).abs();
                if area < 1e-6 {
                    return Err(CurveError::DegeneratePolygon { area });
                }
                Some(pts)
            }
            None if spans.transverse.is_valid() => Some(transverse_polygon(&frame, &spans.transverse)),
            None => None,
        };

        let bridges = match (&medial, &lateral, &transverse_controls) {
            (Some((m, _)), Some((l, _)), Some(t)) => Some(self.resolve_bridges(m, l, t)?),
            _ => None,
        };

        let arch_pad = bridges
            .as_ref()
            .and_then(|b| arch_pad_polygon(&frame, b));

        if let Some((solid, flat)) = &medial {
            controls.medial = Some(to_curve_points(solid));
            controls.medial_flat = Some(to_curve_points(flat));
        }
        if let Some((solid, flat)) = &lateral {
            controls.lateral = Some(to_curve_points(solid));
            controls.lateral_flat = Some(to_curve_points(flat));
        }
        if let Some(t) = &transverse_controls {
            controls.transverse = Some(to_curve_points(t));
        }
        if let Some(b) = &bridges {
            controls.heel_bridge = Some(to_curve_points(&b.heel));
            controls.lateral_bridge = Some(to_curve_points(&b.lateral));
            controls.metatarsal_bridge = Some(to_curve_points(&b.metatarsal));
        }

        debug!(
            "Resolved curves: medial={}, lateral={}, transverse={}, arch pad={} points",
            medial.is_some(),
            lateral.is_some(),
            transverse_controls.is_some(),
            arch_pad.as_ref().map_or(0, Vec::len)
        );

        let band = |pair: Option<(Vec<Point2<f64>>, Vec<Point2<f64>>)>| {
            pair.map(|(solid, flat)| BandCurves {
                solid: DenseCurve::from_controls(&solid),
                flat: DenseCurve::from_controls(&flat),
            })
        };

        Ok(ResolvedCurves {
            medial: band(medial),
            lateral: band(lateral),
            transverse: transverse_controls.map(|t| densify_closed(&t, DEFAULT_SUBDIVISIONS)),
            arch_pad,
            controls,
        })
    }

    /// Solid and flat control points for one longitudinal arch.
    #[allow(clippy::type_complexity)]
    fn resolve_band(
        &self,
        frame: &CurveFrame,
        spans: &ArchSpans,
        side: ArchSide,
    ) -> CurveResult<Option<(Vec<Point2<f64>>, Vec<Point2<f64>>)>> {
        let (solid_key, flat_key, span) = match side {
            ArchSide::Medial => (CurveKey::Medial, CurveKey::MedialFlat, &spans.medial),
            ArchSide::Lateral => (CurveKey::Lateral, CurveKey::LateralFlat, &spans.lateral),
        };
        let solid = match self.points(solid_key)? {
            Some(pts) => pts,
            None if span.is_valid() => longitudinal_solid(frame, span, side),
            None => return Ok(None),
        };
        let supplied_flat = self.points(flat_key)?;
        let flat = flat_from_solid(frame, &solid, side, supplied_flat.as_deref());
        Ok(Some((solid, flat)))
    }

    fn resolve_bridges(
        &self,
        medial: &[Point2<f64>],
        lateral: &[Point2<f64>],
        transverse: &[Point2<f64>],
    ) -> CurveResult<Bridges> {
        let (Some(&m0), Some(&m_end), Some(&l0), Some(&l_end)) =
            (medial.first(), medial.last(), lateral.first(), lateral.last())
        else {
            return Ok(Bridges::default());
        };
        let walk = lateral_to_toe_walk(transverse);
        let (Some(&t_lat), Some(&t_toe)) = (walk.first(), walk.last()) else {
            return Ok(Bridges::default());
        };

        let heel = match self.points(CurveKey::HeelBridge)? {
            Some(pts) => reanchor(&pts, m0, l0),
            None => vec![m0, bridge_control(m0, start_out(medial), l0, start_out(lateral)), l0],
        };

        let t_lat_out = match walk.as_slice() {
            [a, b, ..] => *a - *b,
            _ => Vector2::zeros(),
        };
        let lateral_bridge = match self.points(CurveKey::LateralBridge)? {
            Some(pts) => reanchor(&pts, l_end, t_lat),
            None => vec![l_end, bridge_control(l_end, end_out(lateral), t_lat, t_lat_out), t_lat],
        };

        let metatarsal = match self.points(CurveKey::MetatarsalBridge)? {
            Some(pts) => reanchor(&pts, t_lat, m_end),
            None => {
                let mut pts = walk.clone();
                pts.push(bridge_control(t_toe, end_out(&walk), m_end, end_out(medial)));
                pts.push(m_end);
                pts
            }
        };

        Ok(Bridges {
            heel,
            lateral: lateral_bridge,
            metatarsal,
        })
    }
}

#[derive(Debug, Default)]
struct Bridges {
    heel: Vec<Point2<f64>>,
    lateral: Vec<Point2<f64>>,
    metatarsal: Vec<Point2<f64>>,
}

/// Replace the ends of a supplied curve with the source anchors.
fn reanchor(points: &[Point2<f64>], start: Point2<f64>, end: Point2<f64>) -> Vec<Point2<f64>> {
    let mut out = Vec::with_capacity(points.len().max(2));
    out.push(start);
    if points.len() > 2 {
        out.extend_from_slice(&points[1..points.len() - 1]);
    }
    out.push(end);
    out
}

fn to_curve_points(points: &[Point2<f64>]) -> Vec<CurvePoint> {
    points.iter().copied().map(CurvePoint::from).collect()
}

/// Heel bridge, lateral edge, lateral bridge, metatarsal bridge, medial edge.
fn arch_pad_polygon(frame: &CurveFrame, bridges: &Bridges) -> Option<Vec<Point2<f64>>> {
    if bridges.heel.len() < 2 || bridges.lateral.len() < 2 || bridges.metatarsal.len() < 2 {
        return None;
    }
    let heel = densify_open(&bridges.heel, DEFAULT_SUBDIVISIONS);
    let lateral = densify_open(&bridges.lateral, DEFAULT_SUBDIVISIONS);
    let metatarsal = densify_open(&bridges.metatarsal, DEFAULT_SUBDIVISIONS);

    let mut ring: Vec<Point2<f64>> = Vec::with_capacity(heel.len() + lateral.len() + metatarsal.len() + 2 * PAD_EDGE_SAMPLES);
    ring.extend_from_slice(&heel);
    push_edge_samples(&mut ring, frame, ArchSide::Lateral, heel.last()?.x, lateral.first()?.x);
    ring.extend_from_slice(&lateral);
    ring.extend_from_slice(&metatarsal);
    push_edge_samples(&mut ring, frame, ArchSide::Medial, metatarsal.last()?.x, heel.first()?.x);

    ring.dedup_by(|a, b| (*a - *b).norm() < 1e-9);
    if ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).norm() < 1e-9 {
        ring.pop();
    }
    (ring.len() >= 3 && polygon::signed_area(&ring).abs() > 1e-6).then_some(ring)
}

/// Interior samples of an outline edge strictly between `from` and `to`.
fn push_edge_samples(ring: &mut Vec<Point2<f64>>, frame: &CurveFrame, side: ArchSide, from: f64, to: f64) {
    if (to - from).abs() <= 0.1 {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let steps = (PAD_EDGE_SAMPLES + 1) as f64;
    for i in 1..=PAD_EDGE_SAMPLES {
        #[allow(clippy::cast_precision_loss)]
        let x = from + (to - from) * (i as f64 / steps);
        ring.push(Point2::new(x, frame.edge(side, x)));
    }
}
