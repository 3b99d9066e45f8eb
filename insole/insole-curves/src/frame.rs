//! Outline-relative coordinate frame and arch spans.

use insole_outline::{Outline, WidthRays, YBounds};
use serde::{Deserialize, Serialize};

/// Start, peak and end of one arch, in percent of outline length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchSpan {
    /// Where the arch begins rising.
    pub start: f64,
    /// Where the arch is highest.
    pub peak: f64,
    /// Where the arch has fallen back to zero.
    pub end: f64,
}

impl ArchSpan {
    /// Create a span.
    #[must_use]
    pub const fn new(start: f64, peak: f64, end: f64) -> Self {
        Self { start, peak, end }
    }

    /// Whether the span is finite with a positive extent.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.peak.is_finite() && self.end.is_finite() && self.end - self.start > 1e-6
    }

    /// Peak clamped into `[start, end]`.
    #[must_use]
    pub fn clamped_peak(&self) -> f64 {
        self.peak.clamp(self.start, self.end.max(self.start))
    }

    /// Span length in percent.
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.end - self.start
    }
}

/// The three arch spans a curve set is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchSpans {
    /// Medial longitudinal arch.
    pub medial: ArchSpan,
    /// Lateral longitudinal arch.
    pub lateral: ArchSpan,
    /// Transverse arch.
    pub transverse: ArchSpan,
}

impl Default for ArchSpans {
    fn default() -> Self {
        Self {
            medial: ArchSpan::new(15.0, 43.0, 70.0),
            lateral: ArchSpan::new(20.0, 32.5, 45.0),
            transverse: ArchSpan::new(43.0, 59.0, 75.0),
        }
    }
}

/// Which longitudinal arch a curve belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchSide {
    /// Low-y side.
    Medial,
    /// High-y side.
    Lateral,
}

/// Maps axis and width percentages onto outline coordinates.
#[derive(Debug, Clone)]
pub struct CurveFrame {
    x_min: f64,
    length: f64,
    bounds: YBounds,
    rays: WidthRays,
}

impl CurveFrame {
    /// Build the frame for an outline and its width rays.
    #[must_use]
    pub fn new(outline: &Outline, rays: WidthRays) -> Self {
        Self {
            x_min: outline.min().x,
            length: outline.length(),
            bounds: outline.y_bounds(),
            rays,
        }
    }

    /// Outline length along x.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// The width rays.
    #[must_use]
    pub const fn rays(&self) -> WidthRays {
        self.rays
    }

    /// The outline's y-bounds.
    #[must_use]
    pub const fn bounds(&self) -> &YBounds {
        &self.bounds
    }

    /// X coordinate of an axis percentage.
    #[must_use]
    pub fn x_at(&self, pct: f64) -> f64 {
        self.x_min + pct / 100.0 * self.length
    }

    /// Outline edge on `side` at `x`.
    #[must_use]
    pub fn edge(&self, side: ArchSide, x: f64) -> f64 {
        match side {
            ArchSide::Medial => self.bounds.y_min(x),
            ArchSide::Lateral => self.bounds.y_max(x),
        }
    }

    /// Y at a width percentage (0 = lateral edge, 100 = medial edge).
    #[must_use]
    pub fn y_at_width(&self, x: f64, pct: f64) -> f64 {
        let (lo, hi) = self.bounds.at(x);
        lo + (1.0 - pct / 100.0) * (hi - lo)
    }

    /// Y of the reference ray for `side` at `x`.
    #[must_use]
    pub fn ray(&self, side: ArchSide, x: f64) -> f64 {
        let pct = match side {
            ArchSide::Medial => self.rays.ray1,
            ArchSide::Lateral => self.rays.ray5,
        };
        self.y_at_width(x, pct)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_outline::{Landmarks, Point2};

    #[test]
    fn test_frame_maps_percentages() {
        let outline = Outline::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(200.0, 0.0),
            Point2::new(200.0, 80.0),
            Point2::new(0.0, 80.0),
        ])
        .unwrap();
        let frame = CurveFrame::new(&outline, Landmarks::default().width_rays());
        assert_relative_eq!(frame.x_at(25.0), 50.0);
        // 0 % is the lateral (high-y) edge, 100 % the medial edge.
        assert_relative_eq!(frame.y_at_width(50.0, 0.0), 80.0);
        assert_relative_eq!(frame.y_at_width(50.0, 100.0), 0.0);
        assert_relative_eq!(frame.ray(ArchSide::Medial, 50.0), 0.35 * 80.0);
        assert_relative_eq!(frame.ray(ArchSide::Lateral, 50.0), 0.75 * 80.0);
        assert_relative_eq!(frame.edge(ArchSide::Lateral, 10.0), 80.0);
    }

    #[test]
    fn test_span_validity() {
        assert!(ArchSpan::new(10.0, 20.0, 30.0).is_valid());
        assert!(!ArchSpan::new(30.0, 30.0, 30.0).is_valid());
        assert!(!ArchSpan::new(f64::NAN, 20.0, 30.0).is_valid());
        assert_relative_eq!(ArchSpan::new(10.0, 50.0, 30.0).clamped_peak(), 30.0);
    }
}
