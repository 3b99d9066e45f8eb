//! Hollow shell parameters.

use insole_boolean::BooleanConfig;
use insole_solid::BaseMeshParams;

use crate::{ShellError, ShellResult};

/// Parameters for hollow shell construction.
///
/// # Example
///
/// ```
/// use insole_shell::ShellParams;
///
/// let params = ShellParams::default().with_wall_thickness(1.2).with_skins(0.6, 0.5);
/// assert_eq!(params.wall_thickness, 1.2);
/// assert_eq!(params.top_skin, 0.6);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ShellParams {
    /// Side wall thickness: the outline inset of the inner solid (mm).
    pub wall_thickness: f64,
    /// Material left above the cavity (mm).
    pub top_skin: f64,
    /// Material left below the cavity (mm).
    pub bottom_skin: f64,
    /// Smallest cavity height where the skins would meet (mm).
    pub min_gap: f64,
    /// Grid used for both solids.
    pub mesh: BaseMeshParams,
    /// Boolean engine settings.
    pub boolean: BooleanConfig,
}

impl Default for ShellParams {
    fn default() -> Self {
        Self {
            wall_thickness: 0.8,
            top_skin: 0.4,
            bottom_skin: 0.4,
            min_gap: 0.05,
            mesh: BaseMeshParams::default(),
            boolean: BooleanConfig::default(),
        }
    }
}

impl ShellParams {
    /// Set the side wall thickness.
    #[must_use]
    pub const fn with_wall_thickness(mut self, thickness: f64) -> Self {
        self.wall_thickness = thickness;
        self
    }

    /// Set the top and bottom skin thickness.
    #[must_use]
    pub const fn with_skins(mut self, top: f64, bottom: f64) -> Self {
        self.top_skin = top;
        self.bottom_skin = bottom;
        self
    }

    /// Set the minimum cavity height.
    #[must_use]
    pub const fn with_min_gap(mut self, gap: f64) -> Self {
        self.min_gap = gap;
        self
    }

    /// Set the grid parameters.
    #[must_use]
    pub fn with_mesh(mut self, mesh: BaseMeshParams) -> Self {
        self.mesh = mesh;
        self
    }

    /// Set the boolean engine settings.
    #[must_use]
    pub fn with_boolean(mut self, boolean: BooleanConfig) -> Self {
        self.boolean = boolean;
        self
    }

    /// Check that all values are in range.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::InvalidParameter`] naming the first bad field,
    /// or the nested grid or boolean error.
    pub fn validate(&self) -> ShellResult<()> {
        for (name, value) in [
            ("wall_thickness", self.wall_thickness),
            ("top_skin", self.top_skin),
            ("bottom_skin", self.bottom_skin),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ShellError::invalid_parameter(
                    name,
                    format!("must be positive, got {value}"),
                ));
            }
        }
        if !self.min_gap.is_finite() || self.min_gap < 0.0 {
            return Err(ShellError::invalid_parameter(
                "min_gap",
                format!("must be non-negative, got {}", self.min_gap),
            ));
        }
        self.mesh.validate()?;
        self.boolean.validate()?;
        Ok(())
    }
}
