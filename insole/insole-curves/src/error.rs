//! Error types for curve resolution.

use thiserror::Error;

use crate::CurveKey;

/// Result type alias for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors that can occur while resolving an arch curve set.
#[derive(Debug, Error)]
pub enum CurveError {
    /// A supplied control point is NaN or infinite.
    #[error("curve '{key}' point {index} is not finite")]
    NonFinite {
        /// Curve the point belongs to.
        key: CurveKey,
        /// Index of the offending point.
        index: usize,
    },

    /// A supplied transverse polygon encloses no area.
    #[error("transverse polygon is degenerate (area {area:.6} mm^2)")]
    DegeneratePolygon {
        /// Absolute enclosed area.
        area: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CurveError::NonFinite {
            key: CurveKey::LateralFlat,
            index: 3,
        };
        assert!(err.to_string().contains("lateralFlat"));

        let err = CurveError::DegeneratePolygon { area: 0.0 };
        assert!(err.to_string().contains("degenerate"));
    }
}
