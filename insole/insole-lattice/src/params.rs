//! Lattice generation parameters.

use std::time::Instant;

use insole_boolean::BooleanConfig;
use insole_repair::RepairParams;

use crate::{LatticeError, LatticeResult};

/// Configuration for lattice infill.
///
/// # Examples
///
/// ```
/// use insole_lattice::LatticeParams;
///
/// let params = LatticeParams::default().with_cell_size(4.0).with_strut_radius(0.25);
/// assert_eq!(params.cell_size, 4.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct LatticeParams {
    /// Unit cell pitch in mm.
    pub cell_size: f64,

    /// Strut radius in mm; also the joint sphere radius.
    pub strut_radius: f64,

    /// Whether to place a sphere at every cell corner. Default: `false`.
    pub corner_spheres: bool,

    /// Generate cells on the rayon pool. Default: `true`.
    pub parallel: bool,

    /// Abort with [`LatticeError::Timeout`] once this instant has passed.
    pub deadline: Option<Instant>,

    /// Engine settings for clipping.
    pub boolean: BooleanConfig,

    /// Cleanup thresholds.
    pub repair: RepairParams,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            cell_size: 3.0,
            strut_radius: 0.2,
            corner_spheres: false,
            parallel: true,
            deadline: None,
            boolean: BooleanConfig::default(),
            repair: RepairParams::default(),
        }
    }
}

impl LatticeParams {
    /// Set the cell pitch.
    #[must_use]
    pub const fn with_cell_size(mut self, size: f64) -> Self {
        self.cell_size = size;
        self
    }

    /// Set the strut and joint radius.
    #[must_use]
    pub const fn with_strut_radius(mut self, radius: f64) -> Self {
        self.strut_radius = radius;
        self
    }

    /// Enable or disable corner spheres.
    #[must_use]
    pub const fn with_corner_spheres(mut self, enabled: bool) -> Self {
        self.corner_spheres = enabled;
        self
    }

    /// Enable or disable parallel cell generation.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set a deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the clipping engine settings.
    #[must_use]
    pub fn with_boolean(mut self, boolean: BooleanConfig) -> Self {
        self.boolean = boolean;
        self
    }

    /// Check that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidParameter`] when the cell size is not
    /// positive or the strut radius is not in `(0, cell_size)`, and the
    /// boolean error for bad engine settings.
    pub fn validate(&self) -> LatticeResult<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(LatticeError::invalid_parameter(
                "cell_size",
                format!("must be positive, got {}", self.cell_size),
            ));
        }
        if !self.strut_radius.is_finite()
            || self.strut_radius <= 0.0
            || self.strut_radius >= self.cell_size
        {
            return Err(LatticeError::invalid_parameter(
                "strut_radius",
                format!(
                    "must be in (0, {}), got {}",
                    self.cell_size, self.strut_radius
                ),
            ));
        }
        self.boolean.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = LatticeParams::default();
        assert_eq!(params.cell_size, 3.0);
        assert_eq!(params.strut_radius, 0.2);
        assert!(!params.corner_spheres);
        assert!(params.deadline.is_none());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(LatticeParams::default().with_cell_size(0.0).validate().is_err());
        assert!(LatticeParams::default().with_strut_radius(-0.1).validate().is_err());
        let err = LatticeParams::default()
            .with_cell_size(1.0)
            .with_strut_radius(1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            LatticeError::InvalidParameter { name: "strut_radius", .. }
        ));
    }
}
