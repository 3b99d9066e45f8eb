//! Error types for height field construction.

use insole_curves::CurveError;
use thiserror::Error;

/// Result type alias for height field operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors that can occur while building a height field.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A parameter is outside its valid range.
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The curve set could not be resolved.
    #[error("arch curves: {0}")]
    Curves(#[from] CurveError),
}

impl FieldError {
    /// Create an invalid parameter error.
    #[must_use]
    pub const fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter { name, value, reason }
    }
}

/// Check that `value` is finite and not negative.
pub(crate) fn non_negative(name: &'static str, value: f64) -> FieldResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FieldError::invalid(name, value, "must be finite and non-negative"))
    }
}

/// Check that `value` is a percentage in `0..=100`.
pub(crate) fn percent(name: &'static str, value: f64) -> FieldResult<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(FieldError::invalid(name, value, "must lie in 0..=100"))
    }
}
