//! One-dimensional arch profiles along the heel-to-toe axis.

use insole_curves::{ArchSpan, ProfileSpline};
use insole_outline::Landmarks;

use crate::settings::{Arch, ArchSettings};

/// Exponent flattening the transverse profile into a plateau.
const PLATEAU_EXPONENT: f64 = 0.6;
/// Axis percent over which a grid cell blends in at its edges.
const CELL_EDGE_BLEND: f64 = 2.0;
/// Axis percent the last transverse cell extends past the metatarsal heads.
const FOREFOOT_CELL: f64 = 5.0;

/// Cubic smoothstep, clamped to `[0, 1]`.
#[inline]
#[must_use]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Cosine falloff from 1 at `t = 0` to 0 at `t = 1`.
#[inline]
#[must_use]
pub fn cosine_falloff(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    0.5 * (1.0 + (t * std::f64::consts::PI).cos())
}

/// Position of `x` within `[a, b]` clamped to `[0, 1]`; one for an empty interval.
#[inline]
pub(crate) fn ratio(x: f64, a: f64, b: f64) -> f64 {
    let d = b - a;
    if d.abs() < 1e-12 { 1.0 } else { ((x - a) / d).clamp(0.0, 1.0) }
}

/// Smoothstep bell over `span` with peak height `height`.
#[must_use]
pub fn bell(span: &ArchSpan, height: f64, x: f64) -> f64 {
    if x <= span.start || x >= span.end {
        return 0.0;
    }
    let peak = span.clamped_peak();
    if x <= peak {
        height * smoothstep(ratio(x, span.start, peak))
    } else {
        height * (1.0 - smoothstep(ratio(x, peak, span.end)))
    }
}

/// A minimum-height interval on the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GridCell {
    start: f64,
    end: f64,
    height: f64,
}

impl GridCell {
    fn eval(&self, x: f64) -> f64 {
        if self.height <= 0.0 || x < self.start || x > self.end {
            return 0.0;
        }
        let edge = (x - self.start).min(self.end - x);
        if edge < CELL_EDGE_BLEND {
            self.height * smoothstep(edge / CELL_EDGE_BLEND)
        } else {
            self.height
        }
    }
}

/// Named cell intervals of one arch, placed on the medial and lateral spans.
fn cell_layout(settings: &ArchSettings, arch: Arch) -> Vec<(&'static str, f64, f64)> {
    let m = settings.span(Arch::Medial);
    let l = settings.span(Arch::Lateral);
    let subtalar = 0.5 * (m.start + m.peak);
    let cuneiform = 0.5 * (m.peak + m.end);
    match arch {
        Arch::Medial => vec![
            ("medial_1", m.start, subtalar),
            ("medial_2", subtalar, m.peak),
            ("medial_3", m.peak, cuneiform),
            ("medial_4", cuneiform, m.end),
        ],
        Arch::Lateral => vec![("lateral_1", l.start, l.end)],
        Arch::Transverse => vec![
            ("transverse_1", m.peak, cuneiform),
            ("transverse_2", cuneiform, m.end),
            ("transverse_3", m.end, m.end + FOREFOOT_CELL),
        ],
    }
}

/// The x-profile of one arch: bell or detail spline, raised by grid cells,
/// then scaled.
#[derive(Debug, Clone)]
pub(crate) struct ArchProfile {
    span: ArchSpan,
    height: f64,
    detail: Option<ProfileSpline>,
    cells: Vec<GridCell>,
    scale: f64,
    plateau: bool,
}

impl ArchProfile {
    fn new(settings: &ArchSettings, landmarks: &Landmarks, arch: Arch, scale: f64) -> Self {
        let span = settings.span(arch);
        let height = settings.height(arch);
        let detail = settings.detail(arch);
        let detail = if detail.enabled && span.is_valid() {
            let mut knots = vec![(span.start, 0.0), (span.end, 0.0)];
            for name in arch.detail_landmarks() {
                let Some(pos) = landmarks.get(name) else { continue };
                if pos > span.start && pos < span.end {
                    let value = (bell(&span, height, pos) + detail.offset(name)).max(0.0);
                    knots.push((pos, value));
                }
            }
            ProfileSpline::new(knots)
        } else {
            None
        };
        let cells = cell_layout(settings, arch)
            .into_iter()
            .filter_map(|(id, start, end)| {
                settings
                    .grid_cell(id)
                    .map(|height| GridCell { start, end, height })
            })
            .collect();
        Self {
            span,
            height,
            detail,
            cells,
            scale,
            plateau: arch == Arch::Transverse,
        }
    }

    /// Unscaled shape: bell or detail spline, without grid cells.
    fn shape(&self, x: f64) -> f64 {
        match &self.detail {
            Some(spline) => spline.eval(x).max(0.0),
            None => bell(&self.span, self.height, x),
        }
    }

    /// Scaled profile value at axis percent `x`.
    pub(crate) fn eval(&self, x: f64) -> f64 {
        if self.plateau && (x < self.span.start || x > self.span.end) {
            return 0.0;
        }
        let raw = self
            .cells
            .iter()
            .fold(self.shape(x), |acc, cell| acc.max(cell.eval(x)));
        let scaled = raw * self.scale;
        if self.plateau {
            let h = self.height * self.scale;
            if scaled > 0.0 && h > 0.0 {
                return h * (scaled / h).powf(PLATEAU_EXPONENT);
            }
        }
        scaled
    }
}

/// X-profiles of all three arches.
#[derive(Debug, Clone)]
pub(crate) struct ArchProfiles {
    pub(crate) medial: ArchProfile,
    pub(crate) lateral: ArchProfile,
    pub(crate) transverse: ArchProfile,
}

impl ArchProfiles {
    pub(crate) fn new(settings: &ArchSettings, landmarks: &Landmarks, scale: f64) -> Self {
        Self {
            medial: ArchProfile::new(settings, landmarks, Arch::Medial, scale),
            lateral: ArchProfile::new(settings, landmarks, Arch::Lateral, scale),
            transverse: ArchProfile::new(settings, landmarks, Arch::Transverse, scale),
        }
    }
}
