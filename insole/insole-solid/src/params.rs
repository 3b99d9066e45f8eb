//! Base mesh parameters.

use insole_outline::Point2;

use crate::{SolidError, SolidResult};

/// Parameters for the outline triangulation and the base mesh passes.
///
/// # Example
///
/// ```
/// use insole_solid::BaseMeshParams;
///
/// let params = BaseMeshParams::default().with_grid_spacing(2.0).with_relaxation(0.0);
/// assert_eq!(params.grid_spacing, 2.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMeshParams {
    /// Interior grid step (mm).
    pub grid_spacing: f64,

    /// Grid anchor; the outline's bounding-box minimum when unset.
    ///
    /// Grid lines sit at `origin + k * grid_spacing`, so two solids built
    /// with the same origin share their interior columns.
    pub grid_origin: Option<Point2<f64>>,

    /// Heel-region outline spacing (mm); `None` keeps the native outline.
    pub heel_spacing: Option<f64>,

    /// Average rim heights along the outline in the heel region.
    pub rim_smoothing: bool,

    /// Weight of the neighbour mean in the interior relaxation pass, 0 to skip.
    pub relaxation: f64,
}

impl Default for BaseMeshParams {
    fn default() -> Self {
        Self {
            grid_spacing: 1.0,
            grid_origin: None,
            heel_spacing: Some(0.5),
            rim_smoothing: true,
            relaxation: 0.3,
        }
    }
}

impl BaseMeshParams {
    /// Set the interior grid step.
    #[must_use]
    pub const fn with_grid_spacing(mut self, spacing: f64) -> Self {
        self.grid_spacing = spacing;
        self
    }

    /// Anchor the grid at `origin`.
    #[must_use]
    pub const fn with_grid_origin(mut self, origin: Point2<f64>) -> Self {
        self.grid_origin = Some(origin);
        self
    }

    /// Set or disable heel-region resampling.
    #[must_use]
    pub const fn with_heel_spacing(mut self, spacing: Option<f64>) -> Self {
        self.heel_spacing = spacing;
        self
    }

    /// Enable or disable rim smoothing.
    #[must_use]
    pub const fn with_rim_smoothing(mut self, enabled: bool) -> Self {
        self.rim_smoothing = enabled;
        self
    }

    /// Set the interior relaxation weight.
    #[must_use]
    pub const fn with_relaxation(mut self, weight: f64) -> Self {
        self.relaxation = weight;
        self
    }

    /// Check that all values are in range.
    ///
    /// # Errors
    ///
    /// Returns [`SolidError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> SolidResult<()> {
        if !self.grid_spacing.is_finite() || self.grid_spacing <= 0.0 {
            return Err(SolidError::invalid_parameter(
                "grid_spacing",
                format!("must be positive, got {}", self.grid_spacing),
            ));
        }
        if let Some(origin) = self.grid_origin {
            if !origin.x.is_finite() || !origin.y.is_finite() {
                return Err(SolidError::invalid_parameter("grid_origin", "must be finite"));
            }
        }
        if let Some(spacing) = self.heel_spacing {
            if !spacing.is_finite() || spacing <= 0.0 {
                return Err(SolidError::invalid_parameter(
                    "heel_spacing",
                    format!("must be positive, got {spacing}"),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.relaxation) {
            return Err(SolidError::invalid_parameter(
                "relaxation",
                format!("must be in 0..=1, got {}", self.relaxation),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = BaseMeshParams::default();
        assert_eq!(params.grid_spacing, 1.0);
        assert_eq!(params.heel_spacing, Some(0.5));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(BaseMeshParams::default().with_grid_spacing(0.0).validate().is_err());
        assert!(BaseMeshParams::default().with_grid_spacing(f64::NAN).validate().is_err());
        assert!(
            BaseMeshParams::default()
                .with_heel_spacing(Some(-1.0))
                .validate()
                .is_err()
        );
        assert!(BaseMeshParams::default().with_relaxation(1.5).validate().is_err());
        assert!(
            BaseMeshParams::default()
                .with_grid_origin(Point2::new(f64::INFINITY, 0.0))
                .validate()
                .is_err()
        );
    }
}
