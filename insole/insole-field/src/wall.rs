//! Wall and heel-cup parameters and their x-profiles.

use insole_outline::Landmarks;
use serde::{Deserialize, Serialize};

use crate::error::{non_negative, percent};
use crate::profile::{cosine_falloff, ratio, smoothstep};
use crate::{FieldError, FieldResult};

/// Reference medial wall peak the profile constants are expressed against.
const MEDIAL_REFERENCE: f64 = 8.0;
/// Medial wall height at the heel.
const MEDIAL_HEEL: f64 = 6.4;
/// Reference lateral wall peak.
const LATERAL_REFERENCE: f64 = 4.3;
/// Lateral wall height at the heel.
const LATERAL_HEEL: f64 = 5.9;
/// Heel-cup height at scale 1.
const HEEL_CUP_REFERENCE: f64 = 1.8;
/// Axis percent over which the heel cup decays.
const HEEL_CUP_DECAY: f64 = 15.0;
/// Wall height below which the offset is tapered in.
const OFFSET_TAPER: f64 = 1.0;

/// Wall, heel-cup and base parameters.
///
/// # Example
///
/// ```
/// use insole_field::WallParams;
///
/// let params = WallParams::default().with_base_thickness(2.5).with_medial_height(10.0);
/// assert_eq!(params.base_thickness, 2.5);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallParams {
    /// Flat base under the whole insole (mm).
    pub base_thickness: f64,
    /// Added to every nonzero wall height (mm, may be negative).
    pub wall_height_offset: f64,
    /// Heel-cup multiplier.
    pub heel_cup_scale: f64,
    /// Absolute heel-cup height; overrides `heel_cup_scale` when set.
    pub heel_cup_height: Option<f64>,
    /// Multiplier on all arch heights.
    pub arch_scale: f64,
    /// Medial wall peak height (mm).
    pub medial_height: f64,
    /// Medial wall peak position (axis %); the navicular when unset.
    pub medial_peak_x: Option<f64>,
    /// Lateral wall peak height (mm).
    pub lateral_height: f64,
    /// Lateral wall peak position (axis %).
    pub lateral_peak_x: f64,
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            base_thickness: 3.0,
            wall_height_offset: 0.0,
            heel_cup_scale: 1.0,
            heel_cup_height: None,
            arch_scale: 1.0,
            medial_height: MEDIAL_REFERENCE,
            medial_peak_x: None,
            lateral_height: LATERAL_REFERENCE,
            lateral_peak_x: 30.0,
        }
    }
}

impl WallParams {
    /// Set the base thickness.
    #[must_use]
    pub const fn with_base_thickness(mut self, mm: f64) -> Self {
        self.base_thickness = mm;
        self
    }

    /// Set the wall height offset.
    #[must_use]
    pub const fn with_wall_height_offset(mut self, mm: f64) -> Self {
        self.wall_height_offset = mm;
        self
    }

    /// Set the heel-cup scale.
    #[must_use]
    pub const fn with_heel_cup_scale(mut self, scale: f64) -> Self {
        self.heel_cup_scale = scale;
        self
    }

    /// Set an absolute heel-cup height.
    #[must_use]
    pub const fn with_heel_cup_height(mut self, mm: f64) -> Self {
        self.heel_cup_height = Some(mm);
        self
    }

    /// Set the arch scale.
    #[must_use]
    pub const fn with_arch_scale(mut self, scale: f64) -> Self {
        self.arch_scale = scale;
        self
    }

    /// Set the medial wall peak height.
    #[must_use]
    pub const fn with_medial_height(mut self, mm: f64) -> Self {
        self.medial_height = mm;
        self
    }

    /// Set the lateral wall peak height.
    #[must_use]
    pub const fn with_lateral_height(mut self, mm: f64) -> Self {
        self.lateral_height = mm;
        self
    }

    /// Set the medial wall peak position.
    #[must_use]
    pub const fn with_medial_peak_x(mut self, pct: f64) -> Self {
        self.medial_peak_x = Some(pct);
        self
    }

    /// Set the lateral wall peak position.
    #[must_use]
    pub const fn with_lateral_peak_x(mut self, pct: f64) -> Self {
        self.lateral_peak_x = pct;
        self
    }

    /// Effective heel-cup height in mm.
    #[must_use]
    pub fn heel_cup(&self) -> f64 {
        self.heel_cup_height
            .unwrap_or(HEEL_CUP_REFERENCE * self.heel_cup_scale)
    }

    /// Validate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidParameter`] for a non-positive base, a
    /// negative height or scale, or a peak outside `0..=100`.
    pub fn validate(&self) -> FieldResult<()> {
        if !self.base_thickness.is_finite() || self.base_thickness <= 0.0 {
            return Err(FieldError::invalid(
                "base_thickness",
                self.base_thickness,
                "must be positive",
            ));
        }
        if !self.wall_height_offset.is_finite() {
            return Err(FieldError::invalid(
                "wall_height_offset",
                self.wall_height_offset,
                "must be finite",
            ));
        }
        non_negative("heel_cup_scale", self.heel_cup_scale)?;
        if let Some(h) = self.heel_cup_height {
            non_negative("heel_cup_height", h)?;
        }
        non_negative("arch_scale", self.arch_scale)?;
        non_negative("medial_wall_height", self.medial_height)?;
        non_negative("lateral_wall_height", self.lateral_height)?;
        if let Some(x) = self.medial_peak_x {
            percent("medial_wall_peak_x", x)?;
        }
        percent("lateral_wall_peak_x", self.lateral_peak_x)?;
        Ok(())
    }
}

/// Wall heights along the axis, resolved against the landmarks.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WallProfile {
    medial_start: f64,
    medial_peak: f64,
    metatarsal: f64,
    medial_scale: f64,
    lateral_start: f64,
    lateral_peak: f64,
    cuboid: f64,
    lateral_scale: f64,
    lateral_target: f64,
    offset: f64,
    heel_end: f64,
    heel_cup: f64,
}

impl WallProfile {
    pub(crate) fn new(landmarks: &Landmarks, params: &WallParams) -> Self {
        Self {
            medial_start: landmarks.arch_start,
            medial_peak: params.medial_peak_x.unwrap_or(landmarks.navicular),
            metatarsal: landmarks.metatarsal,
            medial_scale: params.medial_height / MEDIAL_REFERENCE,
            lateral_start: landmarks.lateral_arch_start,
            lateral_peak: params.lateral_peak_x,
            cuboid: landmarks.cuboid,
            lateral_scale: params.lateral_height / LATERAL_REFERENCE,
            lateral_target: params.lateral_height,
            offset: params.wall_height_offset,
            heel_end: 0.5 * (landmarks.arch_start + landmarks.lateral_arch_start),
            heel_cup: params.heel_cup(),
        }
    }

    /// Medial (inner) wall at axis percent `x`, offset applied.
    pub(crate) fn medial(&self, x: f64) -> f64 {
        let s = self.medial_scale;
        let raw = if x <= self.medial_start {
            MEDIAL_HEEL * s
        } else if x <= self.medial_peak {
            let t = ratio(x, self.medial_start, self.medial_peak);
            (MEDIAL_HEEL + (MEDIAL_REFERENCE - MEDIAL_HEEL) * smoothstep(t)) * s
        } else if x <= self.metatarsal {
            let t = ratio(x, self.medial_peak, self.metatarsal);
            MEDIAL_REFERENCE * cosine_falloff(t) * s
        } else {
            0.0
        };
        self.apply_offset(raw)
    }

    /// Lateral (outer) wall at axis percent `x`, offset applied.
    pub(crate) fn lateral(&self, x: f64) -> f64 {
        let heel = LATERAL_HEEL * self.lateral_scale;
        let raw = if x <= self.lateral_start {
            heel
        } else if x <= self.lateral_peak {
            let t = ratio(x, self.lateral_start, self.lateral_peak);
            heel + (self.lateral_target - heel) * smoothstep(t)
        } else if x <= self.cuboid {
            let t = ratio(x, self.lateral_peak, self.cuboid);
            self.lateral_target * cosine_falloff(t)
        } else {
            0.0
        };
        self.apply_offset(raw)
    }

    /// Heel-cup height at axis percent `x`.
    pub(crate) fn heel_cup(&self, x: f64) -> f64 {
        if x <= self.heel_end {
            self.heel_cup
        } else if x <= self.heel_end + HEEL_CUP_DECAY {
            self.heel_cup * cosine_falloff((x - self.heel_end) / HEEL_CUP_DECAY)
        } else {
            0.0
        }
    }

    /// Offset added to a nonzero wall, tapered in over the last millimeter so
    /// the wall still ends continuously, then floored at zero.
    fn apply_offset(&self, wall: f64) -> f64 {
        if wall <= 0.0 {
            return 0.0;
        }
        let taper = smoothstep(wall / OFFSET_TAPER);
        (wall + self.offset * taper).max(0.0)
    }
}
