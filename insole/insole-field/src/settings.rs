//! Per-side arch settings.

use std::collections::BTreeMap;

use insole_curves::{ArchSpan, ArchSpans};
use insole_outline::WidthRays;
use serde::{Deserialize, Serialize};

use crate::error::{non_negative, percent};
use crate::{FieldError, FieldResult};

/// One of the three arches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// Medial longitudinal arch.
    Medial,
    /// Lateral longitudinal arch.
    Lateral,
    /// Transverse (metatarsal) arch.
    Transverse,
}

impl Arch {
    /// Landmarks that may carry a detail height for this arch.
    #[must_use]
    pub const fn detail_landmarks(self) -> &'static [&'static str] {
        match self {
            Self::Medial => &["subtalar", "navicular", "medial_cuneiform", "metatarsal_base_1"],
            Self::Lateral => &["subtalar", "navicular", "cuboid"],
            Self::Transverse => &["navicular", "medial_cuneiform", "metatarsal_base_1", "metatarsal"],
        }
    }
}

/// Detail-mode height offsets for one arch, keyed by landmark name.
///
/// Each offset is added to the bell-curve height at that landmark; the
/// arch's x-profile then follows a clamped spline through those knots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailHeights<'a> {
    /// Whether detail mode replaces the bell curve.
    pub enabled: bool,
    /// Offsets in mm by landmark name.
    pub heights: &'a BTreeMap<String, f64>,
}

impl DetailHeights<'_> {
    /// Offset for `landmark`, accepting the short editor aliases.
    #[must_use]
    pub fn offset(&self, landmark: &str) -> f64 {
        let alias = match landmark {
            "medial_cuneiform" => Some("cuneiform"),
            "metatarsal_base_1" => Some("m5"),
            _ => None,
        };
        self.heights
            .get(landmark)
            .or_else(|| alias.and_then(|a| self.heights.get(a)))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Arch shape parameters for one foot.
///
/// Positions are axis percentages, heights millimeters. The y-band limits
/// are width percentages used only where no arch curve covers a point; the
/// optional ones are derived from the width rays when left unset.
///
/// # Example
///
/// ```
/// use insole_field::ArchSettings;
///
/// let settings = ArchSettings::default().with_medial_height(1.4);
/// assert_eq!(settings.medial_height, 1.4);
/// assert_eq!(settings.spans().lateral.peak, 32.5);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchSettings {
    /// Medial arch start.
    pub medial_start: f64,
    /// Medial arch peak.
    pub medial_peak: f64,
    /// Medial arch end.
    pub medial_end: f64,
    /// Medial arch height.
    pub medial_height: f64,
    /// Lateral arch start.
    pub lateral_start: f64,
    /// Lateral arch peak.
    pub lateral_peak: f64,
    /// Lateral arch end.
    pub lateral_end: f64,
    /// Lateral arch height.
    pub lateral_height: f64,
    /// Transverse arch start.
    pub transverse_start: f64,
    /// Transverse arch peak.
    pub transverse_peak: f64,
    /// Transverse arch end.
    pub transverse_end: f64,
    /// Transverse arch height.
    pub transverse_height: f64,

    /// Inner limit of the medial band (defaults to `ray1 - 5`).
    pub medial_y_start: Option<f64>,
    /// Outer limit of the medial band.
    pub medial_y_end: f64,
    /// Outer limit of the lateral band.
    pub lateral_y_start: f64,
    /// Inner limit of the lateral band (defaults to `ray5 + 5`).
    pub lateral_y_end: Option<f64>,
    /// Lateral limit of the transverse band (defaults to `ray5 - 2.5`).
    pub transverse_y_start: Option<f64>,
    /// Medial limit of the transverse band (defaults to `ray1 + 2.5`).
    pub transverse_y_end: Option<f64>,

    /// Minimum heights per named grid cell (`medial_1` .. `transverse_3`).
    pub grid_cell_heights: Option<BTreeMap<String, f64>>,

    /// Whether the medial x-profile follows the detail spline.
    pub medial_detail_enabled: bool,
    /// Medial detail offsets by landmark.
    pub medial_detail_heights: BTreeMap<String, f64>,
    /// Whether the lateral x-profile follows the detail spline.
    pub lateral_detail_enabled: bool,
    /// Lateral detail offsets by landmark.
    pub lateral_detail_heights: BTreeMap<String, f64>,
    /// Whether the transverse x-profile follows the detail spline.
    pub transverse_detail_enabled: bool,
    /// Transverse detail offsets by landmark.
    pub transverse_detail_heights: BTreeMap<String, f64>,
}

impl Default for ArchSettings {
    fn default() -> Self {
        Self {
            medial_start: 15.0,
            medial_peak: 43.0,
            medial_end: 70.0,
            medial_height: 1.0,
            lateral_start: 20.0,
            lateral_peak: 32.5,
            lateral_end: 45.0,
            lateral_height: 0.5,
            transverse_start: 43.0,
            transverse_peak: 59.0,
            transverse_end: 75.0,
            transverse_height: 0.5,
            medial_y_start: None,
            medial_y_end: 100.0,
            lateral_y_start: 0.0,
            lateral_y_end: None,
            transverse_y_start: None,
            transverse_y_end: None,
            grid_cell_heights: None,
            medial_detail_enabled: false,
            medial_detail_heights: BTreeMap::new(),
            lateral_detail_enabled: false,
            lateral_detail_heights: BTreeMap::new(),
            transverse_detail_enabled: false,
            transverse_detail_heights: BTreeMap::new(),
        }
    }
}

/// Resolved width bands (fractions, 0 = lateral edge, 1 = medial edge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YBands {
    /// Medial band start.
    pub medial_start: f64,
    /// Medial band end.
    pub medial_end: f64,
    /// Lateral band start.
    pub lateral_start: f64,
    /// Lateral band end.
    pub lateral_end: f64,
    /// Transverse band start.
    pub transverse_start: f64,
    /// Transverse band end.
    pub transverse_end: f64,
}

impl ArchSettings {
    /// Settings with every arch flattened to zero height.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            medial_height: 0.0,
            lateral_height: 0.0,
            transverse_height: 0.0,
            ..Self::default()
        }
    }

    /// Set the medial arch height.
    #[must_use]
    pub fn with_medial_height(mut self, height: f64) -> Self {
        self.medial_height = height;
        self
    }

    /// Set the lateral arch height.
    #[must_use]
    pub fn with_lateral_height(mut self, height: f64) -> Self {
        self.lateral_height = height;
        self
    }

    /// Set the transverse arch height.
    #[must_use]
    pub fn with_transverse_height(mut self, height: f64) -> Self {
        self.transverse_height = height;
        self
    }

    /// Set the span of one arch.
    #[must_use]
    pub fn with_span(mut self, arch: Arch, span: ArchSpan) -> Self {
        match arch {
            Arch::Medial => {
                self.medial_start = span.start;
                self.medial_peak = span.peak;
                self.medial_end = span.end;
            }
            Arch::Lateral => {
                self.lateral_start = span.start;
                self.lateral_peak = span.peak;
                self.lateral_end = span.end;
            }
            Arch::Transverse => {
                self.transverse_start = span.start;
                self.transverse_peak = span.peak;
                self.transverse_end = span.end;
            }
        }
        self
    }

    /// Set a grid cell minimum height.
    #[must_use]
    pub fn with_grid_cell(mut self, id: impl Into<String>, height: f64) -> Self {
        self.grid_cell_heights
            .get_or_insert_with(BTreeMap::new)
            .insert(id.into(), height);
        self
    }

    /// Enable detail mode for `arch` with the given offsets.
    #[must_use]
    pub fn with_detail(mut self, arch: Arch, heights: BTreeMap<String, f64>) -> Self {
        match arch {
            Arch::Medial => {
                self.medial_detail_enabled = true;
                self.medial_detail_heights = heights;
            }
            Arch::Lateral => {
                self.lateral_detail_enabled = true;
                self.lateral_detail_heights = heights;
            }
            Arch::Transverse => {
                self.transverse_detail_enabled = true;
                self.transverse_detail_heights = heights;
            }
        }
        self
    }

    /// Span of one arch.
    #[must_use]
    pub const fn span(&self, arch: Arch) -> ArchSpan {
        match arch {
            Arch::Medial => ArchSpan::new(self.medial_start, self.medial_peak, self.medial_end),
            Arch::Lateral => ArchSpan::new(self.lateral_start, self.lateral_peak, self.lateral_end),
            Arch::Transverse => {
                ArchSpan::new(self.transverse_start, self.transverse_peak, self.transverse_end)
            }
        }
    }

    /// Target height of one arch.
    #[must_use]
    pub const fn height(&self, arch: Arch) -> f64 {
        match arch {
            Arch::Medial => self.medial_height,
            Arch::Lateral => self.lateral_height,
            Arch::Transverse => self.transverse_height,
        }
    }

    /// Detail settings of one arch.
    #[must_use]
    pub const fn detail(&self, arch: Arch) -> DetailHeights<'_> {
        match arch {
            Arch::Medial => DetailHeights {
                enabled: self.medial_detail_enabled,
                heights: &self.medial_detail_heights,
            },
            Arch::Lateral => DetailHeights {
                enabled: self.lateral_detail_enabled,
                heights: &self.lateral_detail_heights,
            },
            Arch::Transverse => DetailHeights {
                enabled: self.transverse_detail_enabled,
                heights: &self.transverse_detail_heights,
            },
        }
    }

    /// All three spans, as consumed by the curve model.
    #[must_use]
    pub const fn spans(&self) -> ArchSpans {
        ArchSpans {
            medial: self.span(Arch::Medial),
            lateral: self.span(Arch::Lateral),
            transverse: self.span(Arch::Transverse),
        }
    }

    /// Width bands, filling unset limits from the width rays.
    #[must_use]
    pub fn y_bands(&self, rays: WidthRays) -> YBands {
        YBands {
            medial_start: self.medial_y_start.unwrap_or(rays.ray1 - 5.0) / 100.0,
            medial_end: self.medial_y_end / 100.0,
            lateral_start: self.lateral_y_start / 100.0,
            lateral_end: self.lateral_y_end.unwrap_or(rays.ray5 + 5.0) / 100.0,
            transverse_start: self.transverse_y_start.unwrap_or(rays.ray5 - 2.5) / 100.0,
            transverse_end: self.transverse_y_end.unwrap_or(rays.ray1 + 2.5) / 100.0,
        }
    }

    /// Minimum height for a grid cell, if one is set.
    #[must_use]
    pub fn grid_cell(&self, id: &str) -> Option<f64> {
        self.grid_cell_heights.as_ref()?.get(id).copied()
    }

    /// Validate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidParameter`] for a position outside
    /// `0..=100`, a negative height or band limit, or a start after its end.
    pub fn validate(&self) -> FieldResult<()> {
        for (name, arch) in [
            ("medial", Arch::Medial),
            ("lateral", Arch::Lateral),
            ("transverse", Arch::Transverse),
        ] {
            let span = self.span(arch);
            percent(name, span.start)?;
            percent(name, span.peak)?;
            percent(name, span.end)?;
            if span.start > span.end {
                return Err(FieldError::invalid(name, span.start, "arch start lies after its end"));
            }
            non_negative(name, self.height(arch))?;
            for value in self.detail(arch).heights.values() {
                if !value.is_finite() {
                    return Err(FieldError::invalid(name, *value, "detail height must be finite"));
                }
            }
        }
        for (name, value) in [
            ("medial_y_end", Some(self.medial_y_end)),
            ("lateral_y_start", Some(self.lateral_y_start)),
            ("medial_y_start", self.medial_y_start),
            ("lateral_y_end", self.lateral_y_end),
            ("transverse_y_start", self.transverse_y_start),
            ("transverse_y_end", self.transverse_y_end),
        ] {
            if let Some(v) = value {
                non_negative(name, v)?;
            }
        }
        if let Some(cells) = &self.grid_cell_heights {
            for h in cells.values() {
                non_negative("grid_cell_heights", *h)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_outline::Landmarks;

    #[test]
    fn test_defaults_match_span_defaults() {
        assert_eq!(ArchSettings::default().spans(), ArchSpans::default());
        assert!(ArchSettings::default().validate().is_ok());
    }

    #[test]
    fn test_derived_bands_follow_rays() {
        let bands = ArchSettings::default().y_bands(Landmarks::default().width_rays());
        assert_relative_eq!(bands.medial_start, 0.60);
        assert_relative_eq!(bands.transverse_end, 0.675);
        assert_relative_eq!(bands.lateral_end, 0.30);
        assert_relative_eq!(bands.transverse_start, 0.225);
        assert_relative_eq!(bands.medial_end, 1.0);

        let explicit = ArchSettings {
            medial_y_start: Some(70.0),
            ..ArchSettings::default()
        };
        let bands = explicit.y_bands(Landmarks::default().width_rays());
        assert_relative_eq!(bands.medial_start, 0.70);
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "medial_height": 1.5,
            "grid_cell_heights": {"medial_2": 2.0},
            "medial_detail_enabled": true,
            "medial_detail_heights": {"cuneiform": 0.3}
        }"#;
        let s: ArchSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.medial_height, 1.5);
        assert_eq!(s.lateral_height, 0.5);
        assert_eq!(s.grid_cell("medial_2"), Some(2.0));
        assert_eq!(s.grid_cell("medial_1"), None);
        let detail = s.detail(Arch::Medial);
        assert!(detail.enabled);
        assert_eq!(detail.offset("medial_cuneiform"), 0.3);
        assert_eq!(detail.offset("navicular"), 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let s = ArchSettings::default().with_medial_height(-1.0);
        assert!(s.validate().is_err());

        let s = ArchSettings::default().with_span(Arch::Lateral, ArchSpan::new(50.0, 40.0, 30.0));
        assert!(s.validate().is_err());

        let s = ArchSettings::default().with_grid_cell("lateral_1", f64::INFINITY);
        assert!(s.validate().is_err());
    }
}
